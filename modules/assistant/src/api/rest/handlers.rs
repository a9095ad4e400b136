use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        rejection::JsonRejection,
    },
    http::Uri,
    response::Response,
    Extension, Json,
};
use folio_kit::{api::problem::Problem, http::text_stream_response, BearerToken, ProblemResponse};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::api::rest::dto::{GenerateReq, GenerateResp, PdfUploadForm};
use crate::api::rest::error::{bad_request, map_domain_error, map_generate_error};
use crate::contract::model::PdfUpload;
use crate::domain::service::{Service, PROMPT_REQUIRED};

/// Generate text for a prompt
#[utoipa::path(
    post,
    path = "/api/generate",
    tag = "assistant",
    request_body = GenerateReq,
    responses(
        (status = 200, description = "Complete model output", body = GenerateResp),
        (status = 400, description = "Prompt missing or not a string", body = Problem),
        (status = 500, description = "Model call failed", body = Problem)
    )
)]
pub async fn generate(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    payload: Result<Json<GenerateReq>, JsonRejection>,
) -> Result<Json<GenerateResp>, ProblemResponse> {
    let Json(req) = payload.map_err(|e| {
        warn!(error = %e.body_text(), "Rejected generate body");
        bad_request(PROMPT_REQUIRED, uri.path())
    })?;

    match svc.generate(req.prompt.as_str()).await {
        Ok(result) => Ok(Json(GenerateResp { result })),
        Err(e) => {
            error!("Error in AI generation: {}", e);
            Err(map_generate_error(&e, uri.path()))
        }
    }
}

/// Upload a PDF and stream its summary
#[utoipa::path(
    post,
    path = "/api/analyze-pdf",
    tag = "assistant",
    request_body(content = PdfUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Summary text, streamed as generated", body = String, content_type = "text/plain"),
        (status = 400, description = "Missing file or not a PDF", body = Problem),
        (status = 401, description = "Not authenticated", body = Problem),
        (status = 500, description = "Upload or model failure", body = Problem)
    )
)]
pub async fn analyze_pdf(
    Extension(svc): Extension<Arc<Service>>,
    BearerToken(token): BearerToken,
    uri: Uri,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ProblemResponse> {
    let upload = match multipart {
        Ok(mut multipart) => first_part(&mut multipart)
            .await
            .map_err(|msg| bad_request(msg, uri.path()))?,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Request is not multipart");
            None
        }
    };
    if let Some(u) = &upload {
        info!(file_name = %u.file_name, size = u.data.len(), "Document received");
    }

    match svc.analyze_pdf(token.as_ref(), upload).await {
        Ok(stream) => Ok(text_stream_response(stream)),
        Err(e) => {
            error!("Failed to analyze document: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

async fn first_part(multipart: &mut Multipart) -> Result<Option<PdfUpload>, String> {
    let Some(field) = multipart.next_field().await.map_err(|e| e.body_text())? else {
        return Ok(None);
    };
    let file_name = field.file_name().unwrap_or_default().to_string();
    let data = field.bytes().await.map_err(|e| e.body_text())?;
    Ok(Some(PdfUpload { file_name, data }))
}
