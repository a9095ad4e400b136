use async_trait::async_trait;
use bytes::Bytes;
use folio_kit::AccessToken;
use serde::Deserialize;

use crate::error::ProviderError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub content_type: String,
    /// Overwrite an existing object at the same path.
    pub upsert: bool,
}

/// Entry returned by a bucket listing. `name` is relative to the listed prefix.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoredObject {
    pub name: String,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(
        &self,
        token: &AccessToken,
        bucket: &str,
        path: &str,
        data: Bytes,
        opts: &UploadOptions,
    ) -> Result<(), ProviderError>;

    /// Objects directly under `prefix` whose name contains `search`.
    async fn list(
        &self,
        token: &AccessToken,
        bucket: &str,
        prefix: &str,
        search: &str,
    ) -> Result<Vec<StoredObject>, ProviderError>;

    /// Bulk removal; the provider either removes all paths or reports an error.
    async fn remove(
        &self,
        token: &AccessToken,
        bucket: &str,
        paths: &[String],
    ) -> Result<(), ProviderError>;

    /// Public URL of an object. Pure: no remote call.
    fn public_url(&self, bucket: &str, path: &str) -> String;
}
