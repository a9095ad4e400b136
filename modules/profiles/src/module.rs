use std::sync::Arc;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use folio_kit::{Module, ModuleCtx, RestfulModule};
use platform::{AuthProvider, ObjectStore};
use tracing::{debug, info};
use utoipa::OpenApi;

use crate::api::rest::routes::{self, ProfilesApi};
use crate::config::ProfilesConfig;
use crate::domain::guard::GuardRules;
use crate::domain::service::{Service, ServiceConfig};

/// Profile workflow and navigation guard.
#[derive(Default)]
pub struct Profiles {
    service: ArcSwapOption<Service>,
}

impl Profiles {
    pub const NAME: &'static str = "profiles";

    pub fn service(&self) -> Option<Arc<Service>> {
        self.service.load_full()
    }
}

#[async_trait]
impl Module for Profiles {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn init(&self, ctx: &ModuleCtx) -> anyhow::Result<()> {
        info!("Initializing profiles module");

        let cfg: ProfilesConfig = ctx.module_config()?;
        debug!(
            bucket = %cfg.avatar_bucket,
            paths = ?cfg.avatar_paths,
            "Loaded profiles config"
        );

        let hub = ctx.client_hub();
        let auth = hub.get::<dyn AuthProvider>()?;
        let storage = hub.get::<dyn ObjectStore>()?;

        let service = Service::new(
            auth,
            storage,
            ServiceConfig {
                avatar_bucket: cfg.avatar_bucket,
                avatar_paths: cfg.avatar_paths,
                max_avatar_bytes: cfg.max_avatar_bytes,
                max_field_length: cfg.max_field_length,
                guard: GuardRules {
                    login_path: cfg.login_path,
                    profile_path: cfg.profile_path,
                    public_paths: cfg.public_paths,
                },
            },
        );
        self.service.store(Some(Arc::new(service)));
        Ok(())
    }
}

impl RestfulModule for Profiles {
    fn register_rest(&self, _ctx: &ModuleCtx, router: axum::Router) -> anyhow::Result<axum::Router> {
        info!("Registering profiles REST routes");
        let service = self
            .service()
            .ok_or_else(|| anyhow::anyhow!("Service not initialized"))?;
        routes::register_routes(router, service)
    }

    fn openapi(&self) -> utoipa::openapi::OpenApi {
        ProfilesApi::openapi()
    }
}
