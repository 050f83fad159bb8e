use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Topic row: one schedule entry scoped to an upload session
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Topic {
    pub id: Uuid,
    pub user_id: String,
    pub week: String,
    pub topic: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

/// Due item row referencing its parent topic
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DueItemRow {
    pub id: Uuid,
    pub topic_id: Uuid,
    pub title: String,
    pub due_date: String,
    pub position: i32,
}

/// What one successful save wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveSummary {
    pub topics_written: usize,
    pub due_item_batches: usize,
    pub due_items_written: usize,
}
