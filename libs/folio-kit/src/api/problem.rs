use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Content type for Problem Details as per RFC 9457.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// RFC 9457-style problem body. The human-readable text lives in `message`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(title = "Problem", description = "Error body returned by every endpoint")]
pub struct Problem {
    /// A URI reference that identifies the problem type.
    #[serde(rename = "type")]
    pub type_url: String,
    /// A short summary of the problem type.
    pub title: String,
    /// The HTTP status code for this occurrence of the problem.
    pub status: u16,
    /// Explanation specific to this occurrence; provider messages are passed through verbatim.
    pub message: String,
    /// The request path that produced the problem.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub instance: String,
    /// Machine-readable error code.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl Problem {
    pub fn new(status: StatusCode, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_url: "about:blank".to_string(),
            title: title.into(),
            status: status.as_u16(),
            message: message.into(),
            instance: String::new(),
            code: String::new(),
            request_id: None,
        }
    }

    pub fn with_type(mut self, type_url: impl Into<String>) -> Self {
        self.type_url = type_url.into();
        self
    }

    pub fn with_instance(mut self, uri: impl Into<String>) -> Self {
        self.instance = uri.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Build a typed problem: `type` is derived from the machine-readable `code`.
    pub fn from_parts(
        status: StatusCode,
        code: &str,
        title: &str,
        message: impl Into<String>,
        instance: &str,
    ) -> Self {
        Problem::new(status, title, message)
            .with_code(code)
            .with_type(format!("https://errors.folio.app/{code}"))
            .with_instance(instance)
    }
}

/// Axum response wrapper that renders `Problem` with correct status & content type.
#[derive(Debug, Clone)]
pub struct ProblemResponse(pub Problem);

impl From<Problem> for ProblemResponse {
    fn from(p: Problem) -> Self {
        Self(p)
    }
}

impl IntoResponse for ProblemResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut resp = axum::Json(self.0).into_response();
        *resp.status_mut() = status;
        resp.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
        );
        resp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problem_into_response_sets_status_and_content_type() {
        let resp = ProblemResponse::from(Problem::new(
            StatusCode::BAD_REQUEST,
            "Bad Request",
            "Prompt is required",
        ))
        .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let ct = resp
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        assert_eq!(ct, APPLICATION_PROBLEM_JSON);
    }

    #[test]
    fn serialized_body_carries_message_and_skips_empty_fields() {
        let p = Problem::new(StatusCode::UNAUTHORIZED, "Unauthorized", "User not authenticated");
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["message"], "User not authenticated");
        assert_eq!(v["status"], 401);
        assert_eq!(v["type"], "about:blank");
        assert!(v.get("code").is_none());
        assert!(v.get("request_id").is_none());
    }

    #[test]
    fn from_parts_fills_code_type_and_instance() {
        let p = Problem::from_parts(
            StatusCode::INTERNAL_SERVER_ERROR,
            "UPLOAD_FAILED",
            "Upload Failed",
            "bucket not found",
            "/api/profile/avatar",
        );
        assert_eq!(p.status, 500);
        assert_eq!(p.code, "UPLOAD_FAILED");
        assert_eq!(p.type_url, "https://errors.folio.app/UPLOAD_FAILED");
        assert_eq!(p.instance, "/api/profile/avatar");
        assert_eq!(p.message, "bucket not found");
    }
}
