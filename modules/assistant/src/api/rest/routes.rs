use crate::api::rest::{dto, handlers};
use crate::domain::service::Service;
use axum::{routing::post, Extension, Router};
use folio_kit::api::problem::Problem;
use std::sync::Arc;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::generate, handlers::analyze_pdf),
    components(schemas(dto::GenerateReq, dto::GenerateResp, dto::PdfUploadForm, Problem)),
    tags((name = "assistant", description = "Text generation and document summaries"))
)]
pub struct AssistantApi;

pub fn register_routes(router: Router, service: Arc<Service>) -> anyhow::Result<Router> {
    let routes = Router::new()
        .route("/api/generate", post(handlers::generate))
        .route("/api/analyze-pdf", post(handlers::analyze_pdf))
        .layer(Extension(service));

    Ok(router.merge(routes))
}
