use std::sync::Arc;

use anyhow::{Context, Result};
use assistant::Assistant;
use axum::Router;
use folio_kit::{http::TracedClient, AccessToken, ClientHub, ConfigProvider, ModuleCtx, RestfulModule};
use platform::{
    chat_completions::ChatCompletionsModel,
    memory::{MemoryAuth, MemoryObjectStore, ScriptedModel},
    supabase::SupabaseClient,
    AuthUser, Models, Platform,
};
use profiles::Profiles;
use runtime::{AppConfig, AppConfigProvider, ProvidersConfig};
use tracing::info;

use crate::ingress;

/// Exposes the per-module config bag to modules.
pub struct ModulesConfigAdapter(pub Arc<AppConfigProvider>);

impl ConfigProvider for ModulesConfigAdapter {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value> {
        self.0.get_module_config(module_name)
    }
}

/// Providers backed by the configured Supabase project and model endpoints.
/// Keys are read from the environment here, so a missing one fails startup.
pub fn live_platform(providers: &ProvidersConfig) -> Result<Platform> {
    let http = TracedClient::new(
        reqwest::Client::builder()
            .user_agent(concat!("folio-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?,
    );

    let supabase = Arc::new(SupabaseClient::new(
        http.clone(),
        &providers.supabase.url,
        providers.supabase.anon_key()?,
    ));
    let text = &providers.text_model;
    let vision = &providers.vision_model;

    info!(
        supabase = %providers.supabase.url,
        text_model = %text.model,
        vision_model = %vision.model,
        "Using live providers"
    );

    Ok(Platform {
        auth: supabase.clone(),
        storage: supabase,
        models: Models {
            text: Arc::new(ChatCompletionsModel::new(
                http.clone(),
                &text.base_url,
                text.model.as_str(),
                text.api_key()?,
            )),
            vision: Arc::new(ChatCompletionsModel::new(
                http,
                &vision.base_url,
                vision.model.as_str(),
                vision.api_key()?,
            )),
        },
    })
}

/// In-memory providers with one demo session. Returns the session token.
pub fn mock_platform(providers: &ProvidersConfig) -> (Platform, AccessToken) {
    let token = AccessToken::new(format!("demo-{}", nanoid::nanoid!()));
    let demo = AuthUser {
        id: uuid::Uuid::new_v4().to_string(),
        email: Some("demo@folio.local".to_string()),
        user_metadata: serde_json::Map::new(),
    };
    let auth = MemoryAuth::new().with_session(token.as_str(), demo);

    let platform = Platform {
        auth: Arc::new(auth),
        storage: Arc::new(MemoryObjectStore::default()),
        models: Models {
            text: Arc::new(ScriptedModel::new(&providers.text_model.model)),
            vision: Arc::new(ScriptedModel::new(&providers.vision_model.model)),
        },
    };
    (platform, token)
}

/// Every module the server runs, in start order.
pub fn modules() -> Vec<Arc<dyn RestfulModule>> {
    vec![Arc::new(Profiles::default()), Arc::new(Assistant::default())]
}

/// Register providers, start modules and assemble the full router.
pub async fn build_app(config: &AppConfig, platform: &Platform) -> Result<Router> {
    let hub = Arc::new(ClientHub::new());
    platform.register_into(&hub);

    let provider = Arc::new(ModulesConfigAdapter(Arc::new(AppConfigProvider::new(
        config.clone(),
    ))));
    let ctx = ModuleCtx::new(hub).with_config_provider(provider);

    let mut routes = Router::new();
    let mut openapi = ingress::base_openapi();
    for module in modules() {
        let name = module.name();
        let module_ctx = ctx.for_module(name);
        module
            .init(&module_ctx)
            .await
            .with_context(|| format!("module '{name}' failed to initialize"))?;
        routes = module
            .register_rest(&module_ctx, routes)
            .with_context(|| format!("module '{name}' failed to register routes"))?;
        openapi.merge(module.openapi());
        info!(module = name, "Module ready");
    }

    Ok(ingress::build_router(routes, openapi, &config.server))
}
