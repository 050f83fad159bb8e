//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use studybuddy_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Study Buddy API",
        version = "0.1.0",
        description = "Turns an uploaded course syllabus into a weekly schedule: PDF text extraction, schedule formatting through a completion service, and persistence of the parsed schedule."
    ),
    paths(
        handlers::extraction::parse_pdf,
        handlers::formatting::parse_syllabus,
        handlers::persistence::save_syllabus,
        handlers::persistence::get_syllabus,
    ),
    components(schemas(
        models::ParsePdfRequest,
        models::ParsePdfResponse,
        models::FormatScheduleRequest,
        models::FormatScheduleResponse,
        models::SaveScheduleRequest,
        models::SaveScheduleResponse,
        models::StoredScheduleResponse,
        models::ScheduleEntry,
        models::DueItem,
        error::ErrorResponse,
    )),
    tags(
        (name = "syllabus", description = "Syllabus upload pipeline")
    )
)]
pub struct ApiDoc;
