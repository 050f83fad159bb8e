//! Client configuration, read from the environment (with `.env` support).

use std::env;
use std::time::Duration;

use studybuddy_core::constants::{DEFAULT_MAX_FILES, DEFAULT_MAX_FILE_SIZE_MB};

use crate::intake::IntakeLimits;
use crate::orchestrator::StageTimeouts;

const DEFAULT_API_URL: &str = "http://localhost:4000";
const EXTRACTION_TIMEOUT_SECS: u64 = 60;
const FORMATTING_TIMEOUT_SECS: u64 = 120;
const PERSISTENCE_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: String,
    pub max_files: usize,
    pub max_file_size_mb: usize,
    pub accepted_types: Vec<String>,
    /// Must match the server's EXTRACTION_BODY_LIMIT_MB
    pub extraction_body_limit_mb: usize,
    pub extraction_timeout: Duration,
    pub formatting_timeout: Duration,
    pub persistence_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            max_files: DEFAULT_MAX_FILES,
            max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
            accepted_types: vec!["application/pdf".to_string()],
            extraction_body_limit_mb: DEFAULT_MAX_FILE_SIZE_MB,
            extraction_timeout: Duration::from_secs(EXTRACTION_TIMEOUT_SECS),
            formatting_timeout: Duration::from_secs(FORMATTING_TIMEOUT_SECS),
            persistence_timeout: Duration::from_secs(PERSISTENCE_TIMEOUT_SECS),
        }
    }
}

fn secs_from_env(key: &str, default: u64) -> Duration {
    Duration::from_secs(
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse()
            .unwrap_or(default),
    )
}

impl ClientConfig {
    /// STUDYBUDDY_API_URL, MAX_FILES, MAX_FILE_SIZE_MB, EXTRACTION_BODY_LIMIT_MB, ACCEPTED_TYPES (comma separated)
    /// and the per-stage *_TIMEOUT_SECONDS variables.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let accepted_types: Vec<String> = env::var("ACCEPTED_TYPES")
            .unwrap_or_else(|_| "application/pdf".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let config = Self {
            api_url: env::var("STUDYBUDDY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            max_files: env::var("MAX_FILES")
                .unwrap_or_else(|_| DEFAULT_MAX_FILES.to_string())
                .parse()
                .unwrap_or(DEFAULT_MAX_FILES),
            max_file_size_mb: env::var("MAX_FILE_SIZE_MB")
                .unwrap_or_else(|_| DEFAULT_MAX_FILE_SIZE_MB.to_string())
                .parse()
                .unwrap_or(DEFAULT_MAX_FILE_SIZE_MB),
            accepted_types,
            extraction_body_limit_mb: env::var("EXTRACTION_BODY_LIMIT_MB")
                .unwrap_or_else(|_| DEFAULT_MAX_FILE_SIZE_MB.to_string())
                .parse()
                .unwrap_or(DEFAULT_MAX_FILE_SIZE_MB),
            extraction_timeout: secs_from_env("EXTRACTION_TIMEOUT_SECONDS", EXTRACTION_TIMEOUT_SECS),
            formatting_timeout: secs_from_env("FORMATTING_TIMEOUT_SECONDS", FORMATTING_TIMEOUT_SECS),
            persistence_timeout: secs_from_env(
                "PERSISTENCE_TIMEOUT_SECONDS",
                PERSISTENCE_TIMEOUT_SECS,
            ),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "STUDYBUDDY_API_URL must be an http(s) URL"
            ));
        }
        if self.max_files == 0 {
            return Err(anyhow::anyhow!("MAX_FILES must be greater than zero"));
        }
        if self.max_file_size_mb == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than zero"));
        }
        if self.extraction_body_limit_mb == 0 {
            return Err(anyhow::anyhow!(
                "EXTRACTION_BODY_LIMIT_MB must be greater than zero"
            ));
        }
        if self.accepted_types.is_empty() {
            return Err(anyhow::anyhow!("ACCEPTED_TYPES must list at least one type"));
        }
        Ok(())
    }

    pub fn intake_limits(&self) -> IntakeLimits {
        IntakeLimits {
            max_files: self.max_files,
            max_file_size_mb: self.max_file_size_mb,
            accepted_types: self.accepted_types.clone(),
            max_body_bytes: Some(self.extraction_body_limit_bytes() as u64),
        }
    }

    pub fn extraction_body_limit_bytes(&self) -> usize {
        self.extraction_body_limit_mb * 1024 * 1024
    }

    pub fn stage_timeouts(&self) -> StageTimeouts {
        StageTimeouts {
            extraction: self.extraction_timeout,
            formatting: self.formatting_timeout,
            persistence: self.persistence_timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        // 10 MB of body leaves room for 7.5 MB of raw PDF after base64
        assert_eq!(config.intake_limits().summary(), "Max 5 files, up to 7.5 MB each");
        assert_eq!(config.stage_timeouts().formatting, Duration::from_secs(120));
    }

    #[test]
    fn test_rejects_non_http_url() {
        let config = ClientConfig {
            api_url: "localhost:4000".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
