//! In-memory stand-ins for the extractor, formatter and schedule store.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use studybuddy_core::models::SaveSummary;
use studybuddy_core::{AppError, ExtractedDocument, Schedule};
use studybuddy_db::ScheduleStore;
use studybuddy_services::{ScheduleFormatter, TextExtractor};

pub const SCENARIO_A_SCHEDULE: &str =
    r#"[{"week":"Week 1","topic":"Intro","due_items":[{"title":"HW1","due_date":"2024-09-01"}]}]"#;

pub struct MockExtractor {
    result: Result<ExtractedDocument, String>,
    pub calls: AtomicUsize,
    pub last_size: AtomicUsize,
}

impl MockExtractor {
    pub fn returning(text: &str, page_count: usize) -> Self {
        Self {
            result: Ok(ExtractedDocument {
                text: text.to_string(),
                page_count,
                metadata: BTreeMap::from([("Title".to_string(), "Syllabus".to_string())]),
            }),
            calls: AtomicUsize::new(0),
            last_size: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            calls: AtomicUsize::new(0),
            last_size: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TextExtractor for MockExtractor {
    async fn extract(&self, data: Bytes) -> anyhow::Result<ExtractedDocument> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_size.store(data.len(), Ordering::SeqCst);
        self.result.clone().map_err(|m| anyhow::anyhow!(m))
    }
}

pub struct MockFormatter {
    result: Result<String, String>,
    pub received: Mutex<Vec<String>>,
}

impl MockFormatter {
    pub fn returning(output: &str) -> Self {
        Self {
            result: Ok(output.to_string()),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(message.to_string()),
            received: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ScheduleFormatter for MockFormatter {
    async fn format(&self, text: &str) -> anyhow::Result<String> {
        self.received.lock().unwrap().push(text.to_string());
        self.result.clone().map_err(|m| anyhow::anyhow!(m))
    }
}

/// Store that counts writes the way the Postgres repository issues them and
/// commits only when every write of a schedule succeeds.
#[derive(Default)]
pub struct RecordingStore {
    fail_topic_at: Option<usize>,
    pub topic_inserts: AtomicUsize,
    pub due_item_batches: AtomicUsize,
    pub committed: Mutex<HashMap<String, Schedule>>,
}

impl RecordingStore {
    pub fn failing_topic_insert(index: usize) -> Self {
        Self {
            fail_topic_at: Some(index),
            ..Default::default()
        }
    }
}

#[async_trait]
impl ScheduleStore for RecordingStore {
    async fn save_schedule(
        &self,
        user_id: &str,
        schedule: &Schedule,
    ) -> Result<SaveSummary, AppError> {
        let mut summary = SaveSummary::default();
        for (index, entry) in schedule.iter().enumerate() {
            if self.fail_topic_at == Some(index) {
                return Err(AppError::Persistence(format!(
                    "Failed to insert topic for entry {} ({})",
                    index, entry.week
                )));
            }
            self.topic_inserts.fetch_add(1, Ordering::SeqCst);
            summary.topics_written += 1;

            if !entry.due_items.is_empty() {
                self.due_item_batches.fetch_add(1, Ordering::SeqCst);
                summary.due_item_batches += 1;
                summary.due_items_written += entry.due_items.len();
            }
        }

        self.committed
            .lock()
            .unwrap()
            .insert(user_id.to_string(), schedule.clone());
        Ok(summary)
    }

    async fn load_schedule(&self, user_id: &str) -> Result<Schedule, AppError> {
        self.committed
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("No syllabus found for user {}", user_id)))
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
