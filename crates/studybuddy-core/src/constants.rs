//! Shared constants

/// Instruction sent to the completion service ahead of the syllabus text.
///
/// The field names here are the wire contract parsed by [`crate::parse_schedule`].
pub const SCHEDULE_FORMAT_INSTRUCTION: &str = r#"You are a strict JSON formatter. Given a UF course syllabus, return **only** a JSON array in this shape:

[
  {
    "week": "Week 1",
    "topic": "Introduction",
    "due_items": [
      {
        "title": "HW1",
        "due_date": "2024-09-01"
      }
    ]
  }
]

No code fences, no extra text. If there are no due_items, omit the field or use an empty array."#;

/// Default upper bound for a syllabus upload, in megabytes.
pub const DEFAULT_MAX_FILE_SIZE_MB: usize = 10;

/// Default number of files the intake accepts at once.
pub const DEFAULT_MAX_FILES: usize = 5;

/// API paths shared by the server router and the HTTP client.
pub mod paths {
    pub const PARSE_PDF: &str = "/api/parse-pdf";
    pub const PARSE_SYLLABUS: &str = "/api/parse-syllabus";
    pub const SAVE_SYLLABUS: &str = "/api/save-syllabus";
    pub const SYLLABUS: &str = "/api/syllabus";
}
