use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// `prompt` is taken as-is so a non-string value can be reported as bad input.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct GenerateReq {
    #[serde(default)]
    #[schema(value_type = String, example = "Write a haiku about autumn")]
    pub prompt: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenerateResp {
    pub result: String,
}

/// Multipart form for document analysis; only the first part is read.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct PdfUploadForm {
    /// The PDF file.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}
