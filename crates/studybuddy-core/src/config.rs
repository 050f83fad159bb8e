//! Configuration module
//!
//! Server configuration is read once at startup from the process environment
//! (with `.env` support) and validated before anything else is initialised.

use std::env;

// Common constants
const SERVER_PORT: u16 = 4000;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const LLM_TIMEOUT_SECS: u64 = 120;
const EXTRACTION_BODY_LIMIT_MB: usize = 10;
const MAX_PDF_PAGES: usize = 500;
const HTTP_CONCURRENCY_LIMIT: usize = 1_000;

pub const DEFAULT_GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_GROQ_MODEL: &str = "llama3-70b-8192";

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub http_concurrency_limit: usize,
    // Structured store (managed Postgres, credentials embedded in the URL)
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Completion service
    pub groq_api_key: String,
    pub groq_api_base: String,
    pub groq_model: String,
    pub llm_timeout_seconds: u64,
    // Extraction boundary
    pub extraction_body_limit_bytes: usize,
    pub max_pdf_pages: usize,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<ServerConfig>);

impl Config {
    fn as_server(&self) -> &ServerConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.as_server().environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ServerConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_server().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_server().server_port
    }

    pub fn environment(&self) -> &str {
        &self.as_server().environment
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_server().cors_origins
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.as_server().http_concurrency_limit
    }

    pub fn database_url(&self) -> &str {
        &self.as_server().database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_server().db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_server().db_timeout_seconds
    }

    pub fn groq_api_key(&self) -> &str {
        &self.as_server().groq_api_key
    }

    pub fn groq_api_base(&self) -> &str {
        &self.as_server().groq_api_base
    }

    pub fn groq_model(&self) -> &str {
        &self.as_server().groq_model
    }

    pub fn llm_timeout_seconds(&self) -> u64 {
        self.as_server().llm_timeout_seconds
    }

    pub fn extraction_body_limit_bytes(&self) -> usize {
        self.as_server().extraction_body_limit_bytes
    }

    pub fn max_pdf_pages(&self) -> usize {
        self.as_server().max_pdf_pages
    }
}

fn is_production_name(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        if is_production_name(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let extraction_body_limit_mb = env::var("EXTRACTION_BODY_LIMIT_MB")
            .unwrap_or_else(|_| EXTRACTION_BODY_LIMIT_MB.to_string())
            .parse::<usize>()
            .unwrap_or(EXTRACTION_BODY_LIMIT_MB);

        let config = ServerConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            http_concurrency_limit: env::var("HTTP_CONCURRENCY_LIMIT")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(HTTP_CONCURRENCY_LIMIT)
                .max(1),
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            groq_api_key: env::var("GROQ_API_KEY")
                .map_err(|_| anyhow::anyhow!("GROQ_API_KEY must be set"))?,
            groq_api_base: env::var("GROQ_API_BASE")
                .unwrap_or_else(|_| DEFAULT_GROQ_API_BASE.to_string()),
            groq_model: env::var("GROQ_MODEL").unwrap_or_else(|_| DEFAULT_GROQ_MODEL.to_string()),
            llm_timeout_seconds: env::var("LLM_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| LLM_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(LLM_TIMEOUT_SECS),
            extraction_body_limit_bytes: extraction_body_limit_mb * 1024 * 1024,
            max_pdf_pages: env::var("MAX_PDF_PAGES")
                .unwrap_or_else(|_| MAX_PDF_PAGES.to_string())
                .parse()
                .unwrap_or(MAX_PDF_PAGES),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.groq_api_key.trim().is_empty() {
            return Err(anyhow::anyhow!("GROQ_API_KEY must not be empty"));
        }

        if self.extraction_body_limit_bytes == 0 {
            return Err(anyhow::anyhow!(
                "EXTRACTION_BODY_LIMIT_MB must be greater than zero"
            ));
        }

        if self.max_pdf_pages == 0 {
            return Err(anyhow::anyhow!("MAX_PDF_PAGES must be greater than zero"));
        }

        Ok(())
    }
}
