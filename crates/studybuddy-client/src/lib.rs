//! Study Buddy client library.
//!
//! Everything a front end needs to take a syllabus from the user to a saved
//! schedule: file intake and validation, the extract → format → persist pipeline
//! over the HTTP boundaries, and the navigation state of the sidebar.

pub mod app;
pub mod config;
pub mod gateway;
pub mod intake;
pub mod navigation;
pub mod orchestrator;

pub use app::StudyBuddyApp;
pub use config::ClientConfig;
pub use gateway::{
    ExtractionGateway, FormattingGateway, GatewayError, HttpGateways, PersistenceGateway,
};
pub use intake::{
    format_file_size, guess_content_type, CandidateFile, FileIntake, IntakeError, IntakeLimits,
    SelectedFile, SelectionReport, UploadHandler, UploadStatus,
};
pub use navigation::{NavigationStore, Panel, UnknownPanel};
pub use orchestrator::{
    PipelineStage, StageTimeouts, UploadError, UploadOrchestrator, UploadOutcome, UploadStage,
};
