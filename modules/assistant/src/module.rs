use std::sync::Arc;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use folio_kit::{Module, ModuleCtx, RestfulModule};
use platform::{AuthProvider, Models, ObjectStore};
use tracing::{debug, info};
use utoipa::OpenApi;

use crate::api::rest::routes::{self, AssistantApi};
use crate::config::AssistantConfig;
use crate::domain::service::{Service, ServiceConfig};

/// Text generation and PDF summaries.
#[derive(Default)]
pub struct Assistant {
    service: ArcSwapOption<Service>,
}

impl Assistant {
    pub const NAME: &'static str = "assistant";

    pub fn service(&self) -> Option<Arc<Service>> {
        self.service.load_full()
    }
}

#[async_trait]
impl Module for Assistant {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        info!("Initializing assistant module");

        let cfg: AssistantConfig = ctx.module_config()?;
        debug!(bucket = %cfg.pdf_bucket, "Loaded assistant config");

        let hub = ctx.client_hub();
        let models = hub.get::<Models>()?;
        let service = Service::new(
            hub.get::<dyn AuthProvider>()?,
            hub.get::<dyn ObjectStore>()?,
            Models::clone(&models),
            ServiceConfig {
                pdf_bucket: cfg.pdf_bucket,
                summary_instruction: cfg.summary_instruction,
            },
        );
        info!(
            text_model = %models.text.model_id(),
            vision_model = %models.vision.model_id(),
            "Assistant models resolved"
        );
        self.service.store(Some(Arc::new(service)));
        Ok(())
    }
}

impl RestfulModule for Assistant {
    fn register_rest(&self, _ctx: &ModuleCtx, router: axum::Router) -> anyhow::Result<axum::Router> {
        info!("Registering assistant REST routes");
        let service = self
            .service()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))?;
        routes::register_routes(router, service)
    }

    fn openapi(&self) -> utoipa::openapi::OpenApi {
        AssistantApi::openapi()
    }
}
