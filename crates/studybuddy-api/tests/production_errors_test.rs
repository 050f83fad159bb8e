//! Error bodies with ENVIRONMENT=production.
//!
//! Kept in its own test binary because it sets a process-wide environment variable.
//! Run with: `cargo test -p studybuddy-api --test production_errors_test`

mod helpers;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::{json, Value};

use helpers::mocks::{MockExtractor, MockFormatter, RecordingStore};
use helpers::setup_test_app_with;

fn set_production() {
    std::env::set_var("ENVIRONMENT", "production");
}

#[tokio::test]
async fn test_extraction_failure_keeps_details_in_production() {
    set_production();
    let app = setup_test_app_with(
        MockExtractor::failing("Invalid file header: expected a PDF document"),
        MockFormatter::returning("[]"),
        RecordingStore::default(),
        10 * 1024 * 1024,
    );

    let response = app
        .client()
        .post("/api/parse-pdf")
        .json(&json!({ "pdf": BASE64.encode(b"hello") }))
        .await;
    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert_eq!(body["error"], "Failed to parse PDF");
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("Invalid file header"));
}

#[tokio::test]
async fn test_upstream_failure_keeps_details_in_production() {
    set_production();
    let app = setup_test_app_with(
        MockExtractor::returning("text", 1),
        MockFormatter::failing("Completion API request failed: 503 Service Unavailable"),
        RecordingStore::default(),
        10 * 1024 * 1024,
    );

    let response = app
        .client()
        .post("/api/parse-syllabus")
        .json(&json!({ "parsedText": "Week 1" }))
        .await;
    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert_eq!(body["error"], "Failed to call completion API");
    assert!(body["details"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn test_persistence_failure_hides_details_in_production() {
    set_production();
    let app = setup_test_app_with(
        MockExtractor::returning("text", 1),
        MockFormatter::returning("[]"),
        RecordingStore::failing_topic_insert(0),
        10 * 1024 * 1024,
    );

    let syllabus = json!([{ "week": "Week 1", "topic": "Intro", "due_items": [] }]);
    let response = app
        .client()
        .post("/api/save-syllabus")
        .json(&json!({ "syllabus": syllabus, "userId": "session-p" }))
        .await;
    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert_eq!(body["error"], "Failed to save syllabus");
    assert!(body.get("details").is_none());
}
