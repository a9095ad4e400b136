use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::client_hub::ClientHub;

/// Provider of module-specific configuration (raw JSON sections only).
pub trait ConfigProvider: Send + Sync {
    fn get_module_config(&self, module_name: &str) -> Option<&serde_json::Value>;
}

/// What a module sees during `init`: its own config section and the provider clients.
#[derive(Clone)]
pub struct ModuleCtx {
    config_provider: Option<Arc<dyn ConfigProvider>>,
    client_hub: Arc<ClientHub>,
    module_name: Option<Arc<str>>,
}

impl ModuleCtx {
    pub fn new(client_hub: Arc<ClientHub>) -> Self {
        Self {
            config_provider: None,
            client_hub,
            module_name: None,
        }
    }

    pub fn with_config_provider(mut self, p: Arc<dyn ConfigProvider>) -> Self {
        self.config_provider = Some(p);
        self
    }

    /// Scope the context to one module.
    pub fn for_module(&self, name: &str) -> Self {
        let mut scoped = self.clone();
        scoped.module_name = Some(Arc::from(name));
        scoped
    }

    pub fn client_hub(&self) -> Arc<ClientHub> {
        self.client_hub.clone()
    }

    /// Deserialize the module's section into `T`, falling back to `T::default()`
    /// when the section is absent. An invalid section is an error.
    pub fn module_config<T: DeserializeOwned + Default>(&self) -> anyhow::Result<T> {
        let (Some(name), Some(p)) = (&self.module_name, &self.config_provider) else {
            return Ok(T::default());
        };
        match p.get_module_config(name) {
            Some(v) => serde_json::from_value(v.clone())
                .map_err(|e| anyhow::anyhow!("invalid {name} config: {e}")),
            None => Ok(T::default()),
        }
    }
}
