use axum::http::StatusCode;
use folio_kit::api::problem::{Problem, ProblemResponse};

use crate::domain::error::DomainError;

/// Map domain error to a problem response
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    let problem = match e {
        DomainError::NotAuthenticated => Problem::from_parts(
            StatusCode::UNAUTHORIZED,
            "PROFILES_NOT_AUTHENTICATED",
            "Not authenticated",
            e.to_string(),
            instance,
        ),
        DomainError::BadInput(_) => Problem::from_parts(
            StatusCode::BAD_REQUEST,
            "PROFILES_BAD_INPUT",
            "Bad input",
            e.to_string(),
            instance,
        ),
        DomainError::Upload(_) => {
            tracing::error!(error = %e, "avatar upload failed");
            Problem::from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "PROFILES_UPLOAD_FAILED",
                "Upload failed",
                e.to_string(),
                instance,
            )
        }
        DomainError::Remote(_) => {
            tracing::error!(error = %e, "provider call failed");
            Problem::from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "PROFILES_REMOTE_ERROR",
                "Provider error",
                e.to_string(),
                instance,
            )
        }
    };
    ProblemResponse(problem)
}

pub fn bad_request(message: impl Into<String>, instance: &str) -> ProblemResponse {
    map_domain_error(&DomainError::bad_input(message), instance)
}
