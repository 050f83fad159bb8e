//! Application state shared by all handlers.

use std::sync::Arc;

use studybuddy_core::Config;
use studybuddy_db::ScheduleStore;
use studybuddy_services::{ScheduleFormatter, TextExtractor};

/// Configuration plus the three collaborators behind the HTTP boundaries
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub extractor: Arc<dyn TextExtractor>,
    pub formatter: Arc<dyn ScheduleFormatter>,
    pub store: Arc<dyn ScheduleStore>,
}

impl AppState {
    pub fn new(
        config: Config,
        extractor: Arc<dyn TextExtractor>,
        formatter: Arc<dyn ScheduleFormatter>,
        store: Arc<dyn ScheduleStore>,
    ) -> Self {
        Self {
            config,
            extractor,
            formatter,
            store,
        }
    }
}
