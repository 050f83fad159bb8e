//! Data models for the application
//!
//! Schedule types are shared by every crate; wire DTOs describe the JSON bodies of
//! the extraction, formatting and persistence boundaries.

mod document;
mod schedule;
#[cfg(feature = "sqlx")]
mod topic;
mod wire;

pub use document::*;
pub use schedule::*;
#[cfg(feature = "sqlx")]
pub use topic::*;
pub use wire::*;
