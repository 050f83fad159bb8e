//! Upload pipeline: extract, format, parse, persist.
//!
//! One attempt runs at a time. Each stage is bounded by its own timeout and by the
//! attempt's cancellation token; the current stage is published on a watch channel.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use studybuddy_core::{parse_schedule, Schedule, ScheduleParseError};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::gateway::{ExtractionGateway, FormattingGateway, GatewayError, PersistenceGateway};
use crate::intake::{SelectedFile, UploadHandler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Extraction,
    Formatting,
    Persistence,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Extraction => "extraction",
            PipelineStage::Formatting => "formatting",
            PipelineStage::Persistence => "persistence",
        };
        f.write_str(name)
    }
}

/// Observable state of the pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UploadStage {
    #[default]
    Idle,
    Extracting,
    Formatting,
    Persisting,
    Done {
        user_id: String,
        entries: usize,
    },
    Error {
        stage: PipelineStage,
        message: String,
    },
}

impl UploadStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadStage::Done { .. } | UploadStage::Error { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTimeouts {
    pub extraction: Duration,
    pub formatting: Duration,
    pub persistence: Duration,
}

impl Default for StageTimeouts {
    fn default() -> Self {
        Self {
            extraction: Duration::from_secs(60),
            formatting: Duration::from_secs(120),
            persistence: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub file_name: String,
    /// Session identifier the schedule was saved under
    pub user_id: String,
    pub schedule: Schedule,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Another upload is already in progress")]
    Busy,

    #[error("{stage} failed: {source}")]
    Gateway {
        stage: PipelineStage,
        #[source]
        source: GatewayError,
    },

    #[error("No text could be extracted from the document")]
    EmptyText,

    #[error("Formatted schedule could not be read: {0}")]
    Parse(#[from] ScheduleParseError),

    #[error("{stage} timed out after {}s", .after.as_secs())]
    Timeout { stage: PipelineStage, after: Duration },

    #[error("{stage} was cancelled")]
    Cancelled { stage: PipelineStage },
}

impl UploadError {
    /// Stage the attempt stopped at; `None` when it never started
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            UploadError::Busy => None,
            UploadError::Gateway { stage, .. }
            | UploadError::Timeout { stage, .. }
            | UploadError::Cancelled { stage } => Some(*stage),
            UploadError::EmptyText => Some(PipelineStage::Extraction),
            UploadError::Parse(_) => Some(PipelineStage::Formatting),
        }
    }
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Drives selected files through the three service boundaries
pub struct UploadOrchestrator {
    extraction: Arc<dyn ExtractionGateway>,
    formatting: Arc<dyn FormattingGateway>,
    persistence: Arc<dyn PersistenceGateway>,
    timeouts: StageTimeouts,
    stage_tx: watch::Sender<UploadStage>,
    in_flight: AtomicBool,
    current: Mutex<Option<CancellationToken>>,
    completed: Mutex<Vec<UploadOutcome>>,
}

impl UploadOrchestrator {
    pub fn new(
        extraction: Arc<dyn ExtractionGateway>,
        formatting: Arc<dyn FormattingGateway>,
        persistence: Arc<dyn PersistenceGateway>,
        timeouts: StageTimeouts,
    ) -> Self {
        let (stage_tx, _) = watch::channel(UploadStage::Idle);
        Self {
            extraction,
            formatting,
            persistence,
            timeouts,
            stage_tx,
            in_flight: AtomicBool::new(false),
            current: Mutex::new(None),
            completed: Mutex::new(Vec::new()),
        }
    }

    pub fn stage(&self) -> UploadStage {
        self.stage_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UploadStage> {
        self.stage_tx.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Cancel the attempt in flight, if any
    pub fn cancel_current(&self) {
        if let Some(token) = lock(&self.current).as_ref() {
            token.cancel();
        }
    }

    /// Outcomes recorded by [`UploadHandler::upload`] since the last call
    pub fn take_completed(&self) -> Vec<UploadOutcome> {
        std::mem::take(&mut *lock(&self.completed))
    }

    fn set_stage(&self, stage: UploadStage) {
        self.stage_tx.send_replace(stage);
    }

    pub async fn run(&self, file: &SelectedFile) -> Result<UploadOutcome, UploadError> {
        self.run_with_cancel(file, CancellationToken::new()).await
    }

    pub async fn run_with_cancel(
        &self,
        file: &SelectedFile,
        cancel: CancellationToken,
    ) -> Result<UploadOutcome, UploadError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!(file = %file.name, "Upload rejected: another attempt in flight");
            return Err(UploadError::Busy);
        }
        let _guard = InFlightGuard(&self.in_flight);
        *lock(&self.current) = Some(cancel.clone());

        let result = self.execute(file, &cancel).await;
        *lock(&self.current) = None;

        match &result {
            Ok(outcome) => {
                tracing::info!(
                    file = %file.name,
                    user_id = %outcome.user_id,
                    entries = outcome.schedule.len(),
                    "Syllabus saved"
                );
                self.set_stage(UploadStage::Done {
                    user_id: outcome.user_id.clone(),
                    entries: outcome.schedule.len(),
                });
            }
            Err(e) => {
                let stage = e.stage().unwrap_or(PipelineStage::Extraction);
                tracing::warn!(file = %file.name, stage = %stage, error = %e, "Upload failed");
                self.set_stage(UploadStage::Error {
                    stage,
                    message: e.to_string(),
                });
            }
        }

        result
    }

    async fn execute(
        &self,
        file: &SelectedFile,
        cancel: &CancellationToken,
    ) -> Result<UploadOutcome, UploadError> {
        self.set_stage(UploadStage::Extracting);
        let encoded = BASE64.encode(&file.data);
        let document = bounded(
            PipelineStage::Extraction,
            self.timeouts.extraction,
            cancel,
            self.extraction.extract(encoded),
        )
        .await?;
        if document.is_blank() {
            return Err(UploadError::EmptyText);
        }
        tracing::debug!(
            pages = document.page_count,
            chars = document.text.len(),
            "Text extracted"
        );

        self.set_stage(UploadStage::Formatting);
        let raw = bounded(
            PipelineStage::Formatting,
            self.timeouts.formatting,
            cancel,
            self.formatting.format(&document.text),
        )
        .await?;
        let schedule = parse_schedule(&raw)?;

        self.set_stage(UploadStage::Persisting);
        let user_id = Uuid::new_v4().to_string();
        bounded(
            PipelineStage::Persistence,
            self.timeouts.persistence,
            cancel,
            self.persistence.persist(&user_id, &schedule),
        )
        .await?;

        Ok(UploadOutcome {
            file_name: file.name.clone(),
            user_id,
            schedule,
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn bounded<T, F>(
    stage: PipelineStage,
    limit: Duration,
    cancel: &CancellationToken,
    call: F,
) -> Result<T, UploadError>
where
    F: Future<Output = Result<T, GatewayError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(UploadError::Cancelled { stage }),
        result = tokio::time::timeout(limit, call) => match result {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(source)) => Err(UploadError::Gateway { stage, source }),
            Err(_) => Err(UploadError::Timeout { stage, after: limit }),
        },
    }
}

#[async_trait]
impl UploadHandler for UploadOrchestrator {
    /// Runs each file in order, stopping at the first failure
    async fn upload(&self, files: &[SelectedFile]) -> anyhow::Result<()> {
        for file in files {
            let outcome = self.run(file).await?;
            lock(&self.completed).push(outcome);
        }
        Ok(())
    }
}
