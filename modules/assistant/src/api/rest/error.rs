use axum::http::StatusCode;
use folio_kit::api::problem::{Problem, ProblemResponse};

use crate::domain::error::DomainError;

/// Generic message for failed one-shot generation.
pub const GENERATION_FAILED: &str = "Failed to generate AI response";

/// Map domain error to a problem response
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    let problem = match e {
        DomainError::NotAuthenticated => Problem::from_parts(
            StatusCode::UNAUTHORIZED,
            "ASSISTANT_NOT_AUTHENTICATED",
            "Not authenticated",
            e.to_string(),
            instance,
        ),
        DomainError::BadInput(_) => Problem::from_parts(
            StatusCode::BAD_REQUEST,
            "ASSISTANT_BAD_INPUT",
            "Bad input",
            e.to_string(),
            instance,
        ),
        DomainError::Upload(_) => Problem::from_parts(
            StatusCode::INTERNAL_SERVER_ERROR,
            "ASSISTANT_UPLOAD_FAILED",
            "Upload failed",
            e.to_string(),
            instance,
        ),
        DomainError::Remote(_) => Problem::from_parts(
            StatusCode::INTERNAL_SERVER_ERROR,
            "ASSISTANT_REMOTE_ERROR",
            "Provider error",
            e.to_string(),
            instance,
        ),
        DomainError::Inference(_) => Problem::from_parts(
            StatusCode::INTERNAL_SERVER_ERROR,
            "ASSISTANT_INFERENCE_FAILED",
            "Inference failed",
            e.to_string(),
            instance,
        ),
    };
    ProblemResponse(problem)
}

/// Generation failures other than bad input hide the provider message.
pub fn map_generate_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::BadInput(_) => map_domain_error(e, instance),
        _ => ProblemResponse(Problem::from_parts(
            StatusCode::INTERNAL_SERVER_ERROR,
            "ASSISTANT_INFERENCE_FAILED",
            "Inference failed",
            GENERATION_FAILED,
            instance,
        )),
    }
}

pub fn bad_request(message: impl Into<String>, instance: &str) -> ProblemResponse {
    map_domain_error(&DomainError::bad_input(message), instance)
}
