use std::sync::Arc;

use assistant::api::rest::routes::register_routes;
use assistant::domain::service::{Service, ServiceConfig};
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use platform::memory::{MemoryAuth, MemoryObjectStore, ScriptedModel};
use platform::{AuthUser, Models, ProviderError};
use serde_json::{json, Map, Value};
use tower::ServiceExt;

const TOKEN: &str = "tok-rest";
const BOUNDARY: &str = "assistant-boundary";

fn app_with(text: ScriptedModel, vision: ScriptedModel) -> (Router, Arc<ScriptedModel>, Arc<MemoryObjectStore>) {
    let user = AuthUser {
        id: "u-rest".into(),
        email: None,
        user_metadata: Map::new(),
    };
    let auth = Arc::new(MemoryAuth::new().with_session(TOKEN, user));
    let store = Arc::new(MemoryObjectStore::default());
    let text = Arc::new(text);
    let svc = Service::new(
        auth,
        store.clone(),
        Models {
            text: text.clone(),
            vision: Arc::new(vision),
        },
        ServiceConfig::default(),
    );
    let router = register_routes(Router::new(), Arc::new(svc)).unwrap();
    (router, text, store)
}

fn app() -> (Router, Arc<ScriptedModel>, Arc<MemoryObjectStore>) {
    app_with(ScriptedModel::new("grok"), ScriptedModel::new("gemini"))
}

async fn body_bytes(resp: Response) -> Vec<u8> {
    to_bytes(resp.into_body(), usize::MAX).await.unwrap().to_vec()
}

async fn json_body(resp: Response) -> Value {
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
}

fn generate_request(body: &str) -> Request<Body> {
    Request::post("/api/generate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn pdf_request(file_name: &str, token: Option<&str>) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/pdf\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(b"%PDF-1.4 tiny");
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let mut req = Request::post("/api/analyze-pdf").header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
    );
    if let Some(t) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    req.body(Body::from(body)).unwrap()
}

#[tokio::test]
async fn generate_returns_result_json() {
    let (app, _, _) = app();
    let resp = app
        .oneshot(generate_request(r#"{"prompt":"hello"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!({ "result": "[grok] hello" }));
}

#[tokio::test]
async fn generate_rejects_bad_prompts_without_model_calls() {
    let (app, text, _) = app();
    for body in [r#"{"prompt":""}"#, r#"{"prompt":42}"#, "{}", "not json"] {
        let resp = app.clone().oneshot(generate_request(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(
            json_body(resp).await["message"],
            "Prompt is required and must be a string"
        );
    }
    assert_eq!(text.calls(), 0);
}

#[tokio::test]
async fn generate_failure_uses_generic_message() {
    let (app, _, _) = app_with(
        ScriptedModel::new("grok").failing_with(ProviderError::Transport("dns error".into())),
        ScriptedModel::new("gemini"),
    );
    let resp = app
        .oneshot(generate_request(r#"{"prompt":"hi"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(resp).await;
    assert_eq!(body["message"], "Failed to generate AI response");
    assert_eq!(body["instance"], "/api/generate");
}

#[tokio::test]
async fn analyze_streams_plain_text() {
    let (app, _, store) = app_with(
        ScriptedModel::new("grok"),
        ScriptedModel::new("gemini").with_chunks(&["## A\n", "text"]),
    );
    let resp = app
        .oneshot(pdf_request("paper.PDF", Some(TOKEN)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
    assert_eq!(body_bytes(resp).await, b"## A\ntext");
    assert_eq!(store.paths("pdfs").len(), 1);
}

#[tokio::test]
async fn analyze_status_codes_follow_the_failure_kind() {
    let (app, _, store) = app();

    let resp = app.clone().oneshot(pdf_request("paper.txt", Some(TOKEN))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(resp).await["message"],
        "Invalid file type. Please upload a PDF file."
    );

    let resp = app.clone().oneshot(pdf_request("paper.pdf", None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(resp).await["message"], "User not authenticated");

    let resp = app
        .oneshot(
            Request::post("/api/analyze-pdf")
                .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(resp).await["message"], "No file uploaded");

    assert_eq!(store.calls(), 0);
}

#[tokio::test]
async fn upload_failure_is_500_with_provider_message() {
    let (app, _, store) = app();
    store.fail_uploads_with(ProviderError::Api {
        status: 404,
        message: "Bucket not found".into(),
    });
    let resp = app.oneshot(pdf_request("a.pdf", Some(TOKEN))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(resp).await["message"],
        "Error uploading file: Bucket not found"
    );
}
