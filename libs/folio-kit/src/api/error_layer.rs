//! Response-side stamping of problem bodies with the request id.

use axum::{
    body::Body,
    extract::Request,
    http::header::{CONTENT_LENGTH, CONTENT_TYPE},
    middleware::Next,
    response::Response,
};

use crate::api::problem::{Problem, APPLICATION_PROBLEM_JSON};
use crate::http::request_id::XRequestId;

/// Fill `request_id` on every `application/problem+json` response.
///
/// Must run inside `push_req_id_to_extensions` so the id is available.
pub async fn stamp_request_id(request: Request, next: Next) -> Response {
    let rid = request.extensions().get::<XRequestId>().cloned();
    let response = next.run(request).await;

    match rid {
        Some(XRequestId(rid)) if is_problem_response(&response) => {
            with_request_id(response, rid).await
        }
        _ => response,
    }
}

fn is_problem_response(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with(APPLICATION_PROBLEM_JSON))
}

async fn with_request_id(response: Response, rid: String) -> Response {
    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(error = %e, "cannot read problem body");
            return Response::from_parts(parts, Body::empty());
        }
    };

    let stamped = serde_json::from_slice::<Problem>(&bytes)
        .ok()
        .filter(|p| p.request_id.is_none())
        .and_then(|p| serde_json::to_vec(&p.with_request_id(rid)).ok());

    match stamped {
        Some(body) => {
            parts.headers.remove(CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(body))
        }
        None => Response::from_parts(parts, Body::from(bytes)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::problem::ProblemResponse;
    use crate::http::request_id::push_req_id_to_extensions;
    use axum::{
        http::StatusCode,
        middleware::from_fn,
        response::IntoResponse,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    async fn fail() -> ProblemResponse {
        Problem::new(StatusCode::BAD_REQUEST, "Bad input", "nope").into()
    }

    async fn plain() -> impl IntoResponse {
        (StatusCode::BAD_REQUEST, "plain text")
    }

    fn app() -> Router {
        Router::new()
            .route("/fail", get(fail))
            .route("/plain", get(plain))
            .layer(from_fn(stamp_request_id))
            .layer(from_fn(push_req_id_to_extensions))
    }

    async fn call(path: &str) -> Response {
        app()
            .oneshot(
                axum::http::Request::get(path)
                    .header("x-request-id", "rid-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn problem_bodies_get_the_request_id() {
        let resp = call("/fail").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.headers()[CONTENT_TYPE], APPLICATION_PROBLEM_JSON);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let v: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(v["request_id"], "rid-42");
        assert_eq!(v["message"], "nope");
    }

    #[tokio::test]
    async fn other_error_bodies_pass_through() {
        let resp = call("/plain").await;
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"plain text");
    }
}
