use std::sync::Arc;

use axum::{extract::State, Json};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use bytes::Bytes;
use studybuddy_core::{
    models::{ParsePdfRequest, ParsePdfResponse},
    AppError,
};

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/parse-pdf",
    tag = "syllabus",
    request_body = ParsePdfRequest,
    responses(
        (status = 200, description = "Text extracted", body = ParsePdfResponse),
        (status = 400, description = "Missing or undecodable PDF data", body = ErrorResponse),
        (status = 413, description = "Request body exceeds the extraction limit"),
        (status = 500, description = "Extraction failed", body = ErrorResponse)
    )
)]
pub async fn parse_pdf(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<ParsePdfRequest>,
) -> Result<Json<ParsePdfResponse>, HttpAppError> {
    let encoded = request
        .pdf
        .filter(|pdf| !pdf.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("No PDF data provided".to_string()))?;

    let data = BASE64
        .decode(encoded.trim())
        .map_err(|e| AppError::BadRequest(format!("PDF data is not valid base64: {}", e)))?;

    let size_bytes = data.len();
    let document = state
        .extractor
        .extract(Bytes::from(data))
        .await
        .map_err(|e| AppError::Extraction(format!("{:#}", e)))?;

    tracing::info!(
        size_bytes,
        pages = document.page_count,
        chars = document.text.len(),
        "Syllabus PDF parsed"
    );

    Ok(Json(ParsePdfResponse::from(document)))
}
