use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    response::{Html, Json},
    routing::get,
    Router,
};
use folio_kit::api::error_layer;
use folio_kit::http::request_id::{self, MakeReqId};
use runtime::ServerConfig;
use serde_json::{json, Value};
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};
use utoipa::openapi::{InfoBuilder, OpenApi, OpenApiBuilder};

/// Empty document the module fragments are merged into.
pub fn base_openapi() -> OpenApi {
    OpenApiBuilder::new()
        .info(
            InfoBuilder::new()
                .title("Folio API")
                .version(env!("CARGO_PKG_VERSION"))
                .description(Some("Profile management and AI document summaries"))
                .build(),
        )
        .build()
}

/// Wrap module routes with the operational endpoints and the global middleware.
///
/// Layers, outermost first: set request id, propagate request id, trace span,
/// record request id, stamp problem bodies, CORS (optional), timeout
/// (optional), body limit.
pub fn build_router(routes: Router, openapi: OpenApi, server: &ServerConfig) -> Router {
    let openapi = Arc::new(openapi);
    let mut router = routes.route("/health", get(health_check)).route(
        "/openapi.json",
        get(move || {
            let doc = openapi.clone();
            async move { Json((*doc).clone()) }
        }),
    );
    if server.enable_docs {
        router = router.route("/docs", get(serve_docs));
    }

    // Extractors defer to the body limit layer below.
    router = router
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(server.body_limit_mb * 1024 * 1024));

    if server.timeout_sec > 0 {
        router = router.layer(TimeoutLayer::new(Duration::from_secs(server.timeout_sec)));
    }
    if server.cors_enabled {
        router = router.layer(CorsLayer::permissive());
    }

    let x_request_id = request_id::header();
    router
        .layer(from_fn(error_layer::stamp_request_id))
        .layer(from_fn(request_id::push_req_id_to_extensions))
        .layer(request_id::create_trace_layer())
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(SetRequestIdLayer::new(x_request_id, MakeReqId))
}

/// Bind and serve until SIGINT/SIGTERM.
pub async fn serve(router: Router, server: &ServerConfig) -> Result<()> {
    let listener = tokio::net::TcpListener::bind((server.host.as_str(), server.port))
        .await
        .with_context(|| format!("cannot bind {}:{}", server.host, server.port))?;
    tracing::info!(addr = %listener.local_addr()?, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = folio_kit::shutdown::wait_for_shutdown().await {
                tracing::error!(error = %e, "signal handler failed; shutting down");
            }
        })
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn serve_docs() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8"/>
  <title>Folio API</title>
  <script src="https://unpkg.com/@stoplight/elements@latest/web-components.min.js"></script>
  <link rel="stylesheet" href="https://unpkg.com/@stoplight/elements@latest/styles.min.css">
</head>
<body>
  <elements-api apiDescriptionUrl="/openapi.json" router="hash" layout="sidebar"></elements-api>
</body>
</html>"#,
    )
}
