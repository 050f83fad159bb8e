//! File intake: selection, validation and submission of syllabus files.
//!
//! A selection batch is admitted whole or not at all. Rejected batches leave the
//! current selection untouched and replace the visible errors.

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

const UPLOAD_FAILED_MESSAGE: &str = "Upload failed. Please try again.";

/// Count, size and type limits applied to every selection batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeLimits {
    pub max_files: usize,
    pub max_file_size_mb: usize,
    /// MIME types (`application/pdf`), wildcards (`image/*`) or extensions (`.pdf`)
    pub accepted_types: Vec<String>,
    /// Request body limit of the extraction boundary; a file must still fit once base64-encoded
    pub max_body_bytes: Option<u64>,
}

impl Default for IntakeLimits {
    fn default() -> Self {
        Self {
            max_files: studybuddy_core::constants::DEFAULT_MAX_FILES,
            max_file_size_mb: studybuddy_core::constants::DEFAULT_MAX_FILE_SIZE_MB,
            accepted_types: vec!["application/pdf".to_string()],
            max_body_bytes: None,
        }
    }
}

/// Bytes of the extraction request around the encoded document
const EXTRACTION_ENVELOPE_BYTES: u64 = r#"{"pdf":""}"#.len() as u64;

/// Largest raw file whose base64 extraction request stays within `body_limit`
pub fn max_encodable_file_size(body_limit: u64) -> u64 {
    body_limit.saturating_sub(EXTRACTION_ENVELOPE_BYTES) / 4 * 3
}

impl IntakeLimits {
    fn configured_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb as u64 * 1024 * 1024
    }

    /// Effective per-file limit: the configured size, capped by the encoded body limit
    pub fn max_file_size_bytes(&self) -> u64 {
        let configured = self.configured_file_size_bytes();
        match self.max_body_bytes {
            Some(limit) => configured.min(max_encodable_file_size(limit)),
            None => configured,
        }
    }

    fn size_label(&self) -> String {
        let effective = self.max_file_size_bytes();
        if effective < self.configured_file_size_bytes() {
            format_file_size(effective)
        } else {
            format!("{}MB", self.max_file_size_mb)
        }
    }

    /// Human-readable limits line shown next to the picker
    pub fn summary(&self) -> String {
        format!(
            "Max {} files, up to {} each",
            self.max_files,
            self.size_label()
        )
    }

    pub fn accepts(&self, name: &str, content_type: &str) -> bool {
        self.accepted_types
            .iter()
            .any(|pattern| type_matches(pattern, name, content_type))
    }
}

fn type_matches(pattern: &str, name: &str, content_type: &str) -> bool {
    let pattern = pattern.trim().to_ascii_lowercase();
    let content_type = content_type.to_ascii_lowercase();

    if pattern.starts_with('.') {
        return name.to_ascii_lowercase().ends_with(&pattern);
    }
    if let Some(major) = pattern.strip_suffix("/*") {
        return content_type
            .split_once('/')
            .is_some_and(|(candidate, _)| candidate == major);
    }
    pattern == content_type
}

/// Best-effort MIME type from a file name's extension
pub fn guess_content_type(name: &str) -> &'static str {
    let extension = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("txt") => "text/plain",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

/// Format a byte count with binary units, trimming trailing zeros ("1.5 KB", "10 MB")
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

/// A file offered to the intake, not yet validated
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    /// Read a file from disk, guessing its content type from the extension
    pub async fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let content_type = guess_content_type(&name);

        Ok(Self::new(name, content_type, Bytes::from(data)))
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// An admitted file
#[derive(Debug, Clone)]
pub struct SelectedFile {
    /// Unique within the intake for its whole lifetime
    pub id: String,
    pub name: String,
    pub size: u64,
    pub content_type: String,
    pub data: Bytes,
    /// Preview reference, only for image files
    pub preview: Option<String>,
}

impl SelectedFile {
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

/// Outcome of one selection batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionReport {
    pub admitted: Vec<String>,
    pub errors: Vec<String>,
}

impl SelectionReport {
    pub fn is_accepted(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UploadStatus {
    #[default]
    Idle,
    Success,
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("A submission is already in progress")]
    SubmissionInFlight,
}

/// Receives the selected files when the user submits
#[async_trait]
pub trait UploadHandler: Send + Sync {
    async fn upload(&self, files: &[SelectedFile]) -> anyhow::Result<()>;
}

#[derive(Debug, Default)]
struct PreviewRegistry {
    live: AtomicUsize,
}

/// Preview resource for an image file, released on drop
#[derive(Debug)]
struct PreviewHandle {
    url: String,
    registry: Arc<PreviewRegistry>,
}

impl PreviewHandle {
    fn allocate(registry: &Arc<PreviewRegistry>) -> Self {
        registry.live.fetch_add(1, Ordering::SeqCst);
        Self {
            url: format!("preview://{}", Uuid::new_v4()),
            registry: Arc::clone(registry),
        }
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.live.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct IntakeState {
    files: Vec<SelectedFile>,
    previews: HashMap<String, PreviewHandle>,
    errors: Vec<String>,
    status: UploadStatus,
}

type ChangeObserver = Box<dyn Fn(&[SelectedFile]) + Send + Sync>;

struct SubmittingGuard<'a>(&'a AtomicBool);

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Holds the current selection, its validation errors and the submission status
pub struct FileIntake {
    limits: IntakeLimits,
    state: Mutex<IntakeState>,
    submitting: AtomicBool,
    previews: Arc<PreviewRegistry>,
    on_change: Option<ChangeObserver>,
}

impl FileIntake {
    pub fn new(limits: IntakeLimits) -> Self {
        Self {
            limits,
            state: Mutex::new(IntakeState::default()),
            submitting: AtomicBool::new(false),
            previews: Arc::new(PreviewRegistry::default()),
            on_change: None,
        }
    }

    /// Called with the full selection after every change
    pub fn with_on_change<F>(mut self, observer: F) -> Self
    where
        F: Fn(&[SelectedFile]) + Send + Sync + 'static,
    {
        self.on_change = Some(Box::new(observer));
        self
    }

    pub fn limits(&self) -> &IntakeLimits {
        &self.limits
    }

    fn lock(&self) -> MutexGuard<'_, IntakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, files: &[SelectedFile]) {
        if let Some(observer) = &self.on_change {
            observer(files);
        }
    }

    fn validate(&self, candidate: &CandidateFile) -> Option<String> {
        if candidate.size() > self.limits.max_file_size_bytes() {
            return Some(format!(
                "File \"{}\" exceeds {} limit",
                candidate.name,
                self.limits.size_label()
            ));
        }
        if !self.limits.accepts(&candidate.name, &candidate.content_type) {
            return Some(format!(
                "File \"{}\" is not an accepted file type",
                candidate.name
            ));
        }
        None
    }

    /// Validate a batch and append it to the selection if every file passes
    pub fn select_files(&self, candidates: Vec<CandidateFile>) -> SelectionReport {
        if candidates.is_empty() {
            return SelectionReport::default();
        }

        let mut state = self.lock();

        if state.files.len() + candidates.len() > self.limits.max_files {
            let errors = vec![format!(
                "Cannot upload more than {} files",
                self.limits.max_files
            )];
            state.errors = errors.clone();
            tracing::debug!(
                selected = state.files.len(),
                offered = candidates.len(),
                "Selection rejected: too many files"
            );
            return SelectionReport {
                admitted: Vec::new(),
                errors,
            };
        }

        let errors: Vec<String> = candidates
            .iter()
            .filter_map(|candidate| self.validate(candidate))
            .collect();
        if !errors.is_empty() {
            state.errors = errors.clone();
            tracing::debug!(rejected = errors.len(), "Selection rejected");
            return SelectionReport {
                admitted: Vec::new(),
                errors,
            };
        }

        let mut admitted = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let id = Uuid::new_v4().to_string();
            let size = candidate.size();
            let preview = if candidate.content_type.starts_with("image/") {
                let handle = PreviewHandle::allocate(&self.previews);
                let url = handle.url.clone();
                state.previews.insert(id.clone(), handle);
                Some(url)
            } else {
                None
            };

            admitted.push(id.clone());
            state.files.push(SelectedFile {
                id,
                name: candidate.name,
                size,
                content_type: candidate.content_type,
                data: candidate.data,
                preview,
            });
        }
        state.errors.clear();

        let snapshot = state.files.clone();
        drop(state);
        self.notify(&snapshot);

        SelectionReport {
            admitted,
            errors: Vec::new(),
        }
    }

    /// Remove one file, releasing its preview. Returns false for unknown ids.
    pub fn remove_file(&self, id: &str) -> bool {
        let mut state = self.lock();
        let before = state.files.len();
        state.files.retain(|file| file.id != id);
        if state.files.len() == before {
            return false;
        }
        state.previews.remove(id);

        let snapshot = state.files.clone();
        drop(state);
        self.notify(&snapshot);
        true
    }

    /// Drop the whole selection, its errors and status
    pub fn clear_files(&self) {
        let mut state = self.lock();
        state.files.clear();
        state.previews.clear();
        state.errors.clear();
        state.status = UploadStatus::Idle;
        drop(state);
        self.notify(&[]);
    }

    pub fn files(&self) -> Vec<SelectedFile> {
        self.lock().files.clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.lock().errors.clone()
    }

    pub fn status(&self) -> UploadStatus {
        self.lock().status
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    /// Number of image previews currently held
    pub fn live_previews(&self) -> usize {
        self.previews.live.load(Ordering::SeqCst)
    }

    /// Hand the current selection to `handler`.
    ///
    /// No-op with an empty selection. A second call while one is running is refused.
    pub async fn submit(&self, handler: &dyn UploadHandler) -> Result<UploadStatus, IntakeError> {
        let files = self.files();
        if files.is_empty() {
            return Ok(self.status());
        }

        if self
            .submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(IntakeError::SubmissionInFlight);
        }
        let _reset = SubmittingGuard(&self.submitting);

        self.lock().status = UploadStatus::Idle;

        let status = match handler.upload(&files).await {
            Ok(()) => {
                tracing::info!(files = files.len(), "Upload completed");
                UploadStatus::Success
            }
            Err(e) => {
                tracing::warn!(error = %format!("{:#}", e), files = files.len(), "Upload failed");
                self.lock().errors = vec![UPLOAD_FAILED_MESSAGE.to_string()];
                UploadStatus::Error
            }
        };
        self.lock().status = status;

        Ok(status)
    }
}
