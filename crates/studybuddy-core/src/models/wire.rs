use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ExtractedDocument, ScheduleEntry};

/// Request body of the extraction boundary
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ParsePdfRequest {
    /// Base64-encoded PDF bytes
    #[serde(default)]
    pub pdf: Option<String>,
}

/// Successful extraction response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParsePdfResponse {
    pub success: bool,
    pub text: String,
    #[serde(rename = "numPages")]
    pub num_pages: usize,
    #[serde(default)]
    pub info: BTreeMap<String, String>,
}

impl From<ExtractedDocument> for ParsePdfResponse {
    fn from(doc: ExtractedDocument) -> Self {
        ParsePdfResponse {
            success: true,
            text: doc.text,
            num_pages: doc.page_count,
            info: doc.metadata,
        }
    }
}

impl From<ParsePdfResponse> for ExtractedDocument {
    fn from(resp: ParsePdfResponse) -> Self {
        ExtractedDocument {
            text: resp.text,
            page_count: resp.num_pages,
            metadata: resp.info,
        }
    }
}

/// Request body of the formatting boundary
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct FormatScheduleRequest {
    #[serde(rename = "parsedText", default)]
    pub parsed_text: Option<String>,
}

/// Raw completion text; expected to be a JSON schedule array
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FormatScheduleResponse {
    pub formatted: String,
}

/// Request body of the persistence boundary
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaveScheduleRequest {
    pub syllabus: Vec<ScheduleEntry>,
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaveScheduleResponse {
    pub success: bool,
}

/// Persisted schedule for one upload session
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoredScheduleResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub syllabus: Vec<ScheduleEntry>,
}
