use async_trait::async_trait;
use folio_kit::AccessToken;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::ProviderError;

/// User record as returned by the auth provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Map<String, Value>,
}

impl AuthUser {
    /// String metadata field; non-string values read as absent.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.user_metadata.get(key).and_then(Value::as_str)
    }
}

/// Sparse metadata change: listed keys are written, `null` clears,
/// keys not listed are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetadataPatch(BTreeMap<String, Value>);

impl MetadataPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn clear(mut self, key: &str) -> Self {
        self.0.insert(key.to_string(), Value::Null);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Apply onto existing metadata the way the auth provider merges it.
    pub fn apply_to(&self, metadata: &mut Map<String, Value>) {
        for (k, v) in &self.0 {
            metadata.insert(k.clone(), v.clone());
        }
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolve the session behind `token`. A rejected session is `ProviderError::Unauthorized`.
    async fn current_user(&self, token: &AccessToken) -> Result<AuthUser, ProviderError>;

    /// Merge `patch` into the user's metadata; returns the updated user.
    async fn update_user_metadata(
        &self,
        token: &AccessToken,
        patch: &MetadataPatch,
    ) -> Result<AuthUser, ProviderError>;
}
