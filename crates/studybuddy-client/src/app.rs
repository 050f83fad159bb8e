//! Wires intake, pipeline and navigation into one client.

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::gateway::{ExtractionGateway, FormattingGateway, HttpGateways, PersistenceGateway};
use crate::intake::{FileIntake, IntakeError, UploadStatus};
use crate::navigation::NavigationStore;
use crate::orchestrator::UploadOrchestrator;

pub struct StudyBuddyApp {
    config: ClientConfig,
    navigation: NavigationStore,
    intake: FileIntake,
    orchestrator: Arc<UploadOrchestrator>,
}

impl StudyBuddyApp {
    /// Client talking to the API at `config.api_url`
    pub fn from_config(config: ClientConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let gateways = Arc::new(HttpGateways::from_config(&config)?);
        Ok(Self::with_gateways(
            config,
            gateways.clone(),
            gateways.clone(),
            gateways,
        ))
    }

    pub fn with_gateways(
        config: ClientConfig,
        extraction: Arc<dyn ExtractionGateway>,
        formatting: Arc<dyn FormattingGateway>,
        persistence: Arc<dyn PersistenceGateway>,
    ) -> Self {
        let orchestrator = Arc::new(UploadOrchestrator::new(
            extraction,
            formatting,
            persistence,
            config.stage_timeouts(),
        ));
        Self {
            navigation: NavigationStore::new(),
            intake: FileIntake::new(config.intake_limits()),
            orchestrator,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn navigation(&self) -> &NavigationStore {
        &self.navigation
    }

    pub fn intake(&self) -> &FileIntake {
        &self.intake
    }

    pub fn orchestrator(&self) -> &Arc<UploadOrchestrator> {
        &self.orchestrator
    }

    /// Submit the current selection through the upload pipeline
    pub async fn submit(&self) -> Result<UploadStatus, IntakeError> {
        self.intake.submit(self.orchestrator.as_ref()).await
    }
}
