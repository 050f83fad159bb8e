use std::sync::Arc;

use axum::{extract::State, Json};
use studybuddy_core::{
    models::{FormatScheduleRequest, FormatScheduleResponse},
    AppError,
};

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

/// Forward syllabus text to the completion service. The output is returned as-is;
/// callers parse it into a schedule.
#[utoipa::path(
    post,
    path = "/api/parse-syllabus",
    tag = "syllabus",
    request_body = FormatScheduleRequest,
    responses(
        (status = 200, description = "Raw formatter output", body = FormatScheduleResponse),
        (status = 400, description = "Missing parsedText", body = ErrorResponse),
        (status = 500, description = "Completion service failure", body = ErrorResponse)
    )
)]
pub async fn parse_syllabus(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<FormatScheduleRequest>,
) -> Result<Json<FormatScheduleResponse>, HttpAppError> {
    let text = request
        .parsed_text
        .filter(|text| !text.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing parsedText".to_string()))?;

    let formatted = state
        .formatter
        .format(&text)
        .await
        .map_err(|e| AppError::Upstream(format!("{:#}", e)))?;

    tracing::info!(
        input_chars = text.len(),
        output_chars = formatted.len(),
        "Syllabus formatted"
    );

    Ok(Json(FormatScheduleResponse { formatted }))
}
