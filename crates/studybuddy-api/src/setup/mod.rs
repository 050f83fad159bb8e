//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use studybuddy_core::Config;
use studybuddy_db::ScheduleRepository;
use studybuddy_services::{GroqScheduleFormatter, PdfTextExtractor};

use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config
        .validate()
        .context("Configuration validation failed")?;

    crate::telemetry::init_telemetry()
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;

    let formatter = GroqScheduleFormatter::new(
        config.groq_api_base(),
        config.groq_api_key(),
        config.groq_model(),
        Duration::from_secs(config.llm_timeout_seconds()),
    )?;
    tracing::info!(model = %formatter.model(), "Completion service configured");

    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::new(PdfTextExtractor::new(config.max_pdf_pages())),
        Arc::new(formatter),
        Arc::new(ScheduleRepository::new(pool)),
    ));

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
