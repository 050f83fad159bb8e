use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use studybuddy_core::{
    models::{DueItemRow, SaveSummary, Topic},
    AppError, DueItem, Schedule, ScheduleEntry,
};
use uuid::Uuid;

use super::transaction::with_transaction;

/// Structured store for parsed schedules
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Persist every entry of `schedule` for `user_id`, all-or-nothing
    async fn save_schedule(&self, user_id: &str, schedule: &Schedule)
        -> Result<SaveSummary, AppError>;

    /// Load the schedule saved for `user_id`, in the order it was saved
    async fn load_schedule(&self, user_id: &str) -> Result<Schedule, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

/// Repository for topics and their due items
#[derive(Clone)]
pub struct ScheduleRepository {
    pool: PgPool,
}

impl ScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

async fn insert_schedule(
    tx: &mut Transaction<'static, Postgres>,
    user_id: &str,
    schedule: &Schedule,
) -> Result<SaveSummary, AppError> {
    let mut summary = SaveSummary::default();

    for (position, entry) in schedule.iter().enumerate() {
        let topic_id = sqlx::query_scalar::<Postgres, Uuid>(
            r#"
            INSERT INTO topics (user_id, week, topic, position)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(&entry.week)
        .bind(&entry.topic)
        .bind(position as i32)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            AppError::Persistence(format!(
                "Failed to insert topic for entry {} ({}): {}",
                position, entry.week, e
            ))
        })?;
        summary.topics_written += 1;

        if entry.due_items.is_empty() {
            continue;
        }

        let mut builder =
            QueryBuilder::<Postgres>::new("INSERT INTO due_items (topic_id, title, due_date, position) ");
        builder.push_values(
            entry.due_items.iter().enumerate(),
            |mut row, (item_position, item)| {
                row.push_bind(topic_id)
                    .push_bind(item.title.clone())
                    .push_bind(item.due_date.clone())
                    .push_bind(item_position as i32);
            },
        );
        builder.build().execute(&mut **tx).await.map_err(|e| {
            AppError::Persistence(format!(
                "Failed to insert due items for entry {} ({}): {}",
                position, entry.week, e
            ))
        })?;
        summary.due_item_batches += 1;
        summary.due_items_written += entry.due_items.len();
    }

    Ok(summary)
}

#[async_trait]
impl ScheduleStore for ScheduleRepository {
    #[tracing::instrument(skip(self, schedule), fields(db.table = "topics", db.operation = "insert", entries = schedule.len()))]
    async fn save_schedule(
        &self,
        user_id: &str,
        schedule: &Schedule,
    ) -> Result<SaveSummary, AppError> {
        let owned_user = user_id.to_string();
        let owned_schedule = schedule.clone();

        let summary = with_transaction(&self.pool, move |tx| {
            Box::pin(async move { insert_schedule(tx, &owned_user, &owned_schedule).await })
        })
        .await?;

        tracing::debug!(
            topics = summary.topics_written,
            due_items = summary.due_items_written,
            "Schedule persisted"
        );
        Ok(summary)
    }

    #[tracing::instrument(skip(self), fields(db.table = "topics", db.operation = "select"))]
    async fn load_schedule(&self, user_id: &str) -> Result<Schedule, AppError> {
        let topics = sqlx::query_as::<Postgres, Topic>(
            "SELECT id, user_id, week, topic, position, created_at FROM topics WHERE user_id = $1 ORDER BY position ASC, created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        if topics.is_empty() {
            return Err(AppError::NotFound(format!(
                "No syllabus found for user {}",
                user_id
            )));
        }

        let topic_ids: Vec<Uuid> = topics.iter().map(|t| t.id).collect();
        let due_rows = sqlx::query_as::<Postgres, DueItemRow>(
            "SELECT id, topic_id, title, due_date, position FROM due_items WHERE topic_id = ANY($1) ORDER BY position ASC",
        )
        .bind(&topic_ids)
        .fetch_all(&self.pool)
        .await?;

        let entries = topics
            .into_iter()
            .map(|topic| ScheduleEntry {
                due_items: due_rows
                    .iter()
                    .filter(|row| row.topic_id == topic.id)
                    .map(|row| DueItem {
                        title: row.title.clone(),
                        due_date: row.due_date.clone(),
                    })
                    .collect(),
                week: topic.week,
                topic: topic.topic,
            })
            .collect();

        Ok(Schedule::new(entries))
    }

    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
