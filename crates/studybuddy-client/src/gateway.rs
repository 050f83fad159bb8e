//! The three service boundaries the upload pipeline talks to, and their HTTP implementation.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use studybuddy_core::constants::{paths, DEFAULT_MAX_FILE_SIZE_MB};
use studybuddy_core::models::{
    FormatScheduleRequest, FormatScheduleResponse, ParsePdfRequest, ParsePdfResponse,
    SaveScheduleRequest, SaveScheduleResponse, StoredScheduleResponse,
};
use studybuddy_core::{ExtractedDocument, Schedule};

use crate::config::ClientConfig;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("request body of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("service responded with {status}: {message}")]
    Service { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Service { status, .. } => Some(*status),
            GatewayError::PayloadTooLarge { .. } => Some(413),
            _ => None,
        }
    }
}

/// Turns an encoded document into text and metadata
#[async_trait]
pub trait ExtractionGateway: Send + Sync {
    async fn extract(&self, pdf_base64: String) -> Result<ExtractedDocument, GatewayError>;
}

/// Turns syllabus text into the formatter's raw output
#[async_trait]
pub trait FormattingGateway: Send + Sync {
    async fn format(&self, text: &str) -> Result<String, GatewayError>;
}

/// Saves a parsed schedule under a session user id
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn persist(&self, user_id: &str, schedule: &Schedule) -> Result<(), GatewayError>;
}

/// Error body the API answers with
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    details: Option<String>,
}

/// All three boundaries over the Study Buddy HTTP API
#[derive(Clone)]
pub struct HttpGateways {
    client: Client,
    base_url: String,
    max_body_bytes: usize,
}

impl HttpGateways {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Url::parse(&base_url).with_context(|| format!("Invalid API URL: {}", base_url))?;

        Ok(Self {
            client,
            base_url,
            max_body_bytes: DEFAULT_MAX_FILE_SIZE_MB * 1024 * 1024,
        })
    }

    pub fn from_config(config: &ClientConfig) -> anyhow::Result<Self> {
        Ok(Self::new(config.api_url.as_str())?
            .with_max_body_bytes(config.extraction_body_limit_bytes()))
    }

    /// Limit for the extraction request body, checked before sending
    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, GatewayError> {
        let response = request
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(service_error(status, &text));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GatewayError> {
        self.send_json(self.client.post(self.build_url(path)).json(body))
            .await
    }

    /// Read back the schedule saved for a session
    pub async fn fetch_schedule(&self, user_id: &str) -> Result<StoredScheduleResponse, GatewayError> {
        let mut url = Url::parse(&self.build_url(paths::SYLLABUS))
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::Transport("API URL cannot carry a path".to_string()))?
            .push(user_id);

        self.send_json(self.client.get(url)).await
    }
}

fn service_error(status: StatusCode, text: &str) -> GatewayError {
    let message = match serde_json::from_str::<ErrorBody>(text) {
        Ok(ErrorBody {
            error,
            details: Some(details),
        }) => format!("{}: {}", error, details),
        Ok(ErrorBody { error, .. }) => error,
        Err(_) if text.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string(),
        Err(_) => text.trim().to_string(),
    };

    GatewayError::Service {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl ExtractionGateway for HttpGateways {
    async fn extract(&self, pdf_base64: String) -> Result<ExtractedDocument, GatewayError> {
        let body = serde_json::to_vec(&ParsePdfRequest {
            pdf: Some(pdf_base64),
        })
        .map_err(|e| GatewayError::Decode(e.to_string()))?;

        if body.len() > self.max_body_bytes {
            return Err(GatewayError::PayloadTooLarge {
                size: body.len(),
                limit: self.max_body_bytes,
            });
        }

        let request = self
            .client
            .post(self.build_url(paths::PARSE_PDF))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        let response: ParsePdfResponse = self.send_json(request).await?;

        Ok(response.into())
    }
}

#[async_trait]
impl FormattingGateway for HttpGateways {
    async fn format(&self, text: &str) -> Result<String, GatewayError> {
        let response: FormatScheduleResponse = self
            .post_json(
                paths::PARSE_SYLLABUS,
                &FormatScheduleRequest {
                    parsed_text: Some(text.to_string()),
                },
            )
            .await?;

        Ok(response.formatted)
    }
}

#[async_trait]
impl PersistenceGateway for HttpGateways {
    async fn persist(&self, user_id: &str, schedule: &Schedule) -> Result<(), GatewayError> {
        let response: SaveScheduleResponse = self
            .post_json(
                paths::SAVE_SYLLABUS,
                &SaveScheduleRequest {
                    syllabus: schedule.entries().to_vec(),
                    user_id: user_id.to_string(),
                },
            )
            .await?;

        if !response.success {
            return Err(GatewayError::Decode(
                "save reported success = false".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_prefers_json_body() {
        let err = service_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error":"Failed to parse PDF","details":"Invalid file header","code":"EXTRACTION_ERROR"}"#,
        );
        assert_eq!(
            err.to_string(),
            "service responded with 500: Failed to parse PDF: Invalid file header"
        );
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_service_error_falls_back_to_text() {
        let err = service_error(StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded");
        assert!(matches!(
            err,
            GatewayError::Service { status: 413, ref message } if message == "length limit exceeded"
        ));

        let err = service_error(StatusCode::BAD_GATEWAY, "");
        assert!(err.to_string().contains("Bad Gateway"));
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let gateways = HttpGateways::new("http://localhost:4000/").unwrap();
        assert_eq!(gateways.base_url(), "http://localhost:4000");
        assert!(HttpGateways::new("not a url").is_err());
    }

    #[test]
    fn test_from_config_uses_configured_body_limit() {
        let config = ClientConfig {
            extraction_body_limit_mb: 4,
            ..Default::default()
        };
        let gateways = HttpGateways::from_config(&config).unwrap();
        assert_eq!(gateways.max_body_bytes, 4 * 1024 * 1024);
    }
}
