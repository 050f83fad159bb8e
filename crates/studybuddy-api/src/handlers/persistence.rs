use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use studybuddy_core::{
    models::{SaveScheduleRequest, SaveScheduleResponse, StoredScheduleResponse},
    AppError, Schedule,
};

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/save-syllabus",
    tag = "syllabus",
    request_body = SaveScheduleRequest,
    responses(
        (status = 200, description = "Schedule saved", body = SaveScheduleResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 500, description = "Nothing was saved", body = ErrorResponse)
    )
)]
pub async fn save_syllabus(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<SaveScheduleRequest>,
) -> Result<Json<SaveScheduleResponse>, HttpAppError> {
    let user_id = request.user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::BadRequest("Missing userId".to_string()).into());
    }

    let schedule = Schedule::new(request.syllabus);
    let summary = state.store.save_schedule(user_id, &schedule).await?;

    tracing::info!(
        user_id = %user_id,
        topics = summary.topics_written,
        due_item_batches = summary.due_item_batches,
        due_items = summary.due_items_written,
        "Syllabus saved"
    );

    Ok(Json(SaveScheduleResponse { success: true }))
}

#[utoipa::path(
    get,
    path = "/api/syllabus/{user_id}",
    tag = "syllabus",
    params(
        ("user_id" = String, Path, description = "Upload session identifier")
    ),
    responses(
        (status = 200, description = "Saved schedule", body = StoredScheduleResponse),
        (status = 404, description = "No schedule for this session", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn get_syllabus(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<StoredScheduleResponse>, HttpAppError> {
    let schedule = state.store.load_schedule(&user_id).await?;

    Ok(Json(StoredScheduleResponse {
        user_id,
        syllabus: schedule.into_entries(),
    }))
}
