//! Study Buddy API Library
//!
//! HTTP boundaries for syllabus extraction, schedule formatting and persistence,
//! plus health checks and OpenAPI docs.

mod api_doc;
mod handlers;
mod telemetry;

pub mod error;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
