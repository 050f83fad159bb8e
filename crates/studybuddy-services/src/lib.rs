//! Study Buddy Services Layer
//!
//! Clients for the two hosted collaborators the server relies on: PDF text
//! extraction and the chat-completion service that turns syllabus text into a
//! schedule. Handlers depend on the traits so tests can swap in fakes.

pub mod services;

pub use services::{
    extraction::{PdfTextExtractor, TextExtractor},
    formatting::{GroqScheduleFormatter, ScheduleFormatter},
};
