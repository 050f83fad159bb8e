//! Study Buddy Core Library
//!
//! This crate provides the domain models, wire types, error types and configuration
//! shared by the server, the client pipeline and the CLI.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    parse_schedule, DueItem, ExtractedDocument, Schedule, ScheduleEntry, ScheduleParseError,
};
