use async_trait::async_trait;
use axum::Router;

use crate::context::ModuleCtx;

/// A feature module: resolves its clients and config once at startup.
#[async_trait]
pub trait Module: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()>;
}

/// A module exposing HTTP routes. Runs after `init`.
pub trait RestfulModule: Module {
    fn register_rest(&self, ctx: &ModuleCtx, router: Router) -> anyhow::Result<Router>;

    /// OpenAPI fragment merged into the server document.
    fn openapi(&self) -> utoipa::openapi::OpenApi;
}
