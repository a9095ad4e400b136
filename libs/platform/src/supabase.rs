//! Supabase REST adapter: GoTrue for the session user, Storage for objects.

use async_trait::async_trait;
use bytes::Bytes;
use folio_kit::{http::TracedClient, AccessToken};
use reqwest::{Method, RequestBuilder, Response};
use serde_json::json;
use tracing::debug;

use crate::{
    auth::{AuthProvider, AuthUser, MetadataPatch},
    error::ProviderError,
    storage::{ObjectStore, StoredObject, UploadOptions},
};

/// Page size for bucket listings.
const LIST_LIMIT: usize = 100;

#[derive(Clone)]
pub struct SupabaseClient {
    http: TracedClient,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(http: TracedClient, base_url: &str, anon_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    fn request(&self, method: Method, path: &str, token: &AccessToken) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.http
            .request(method, &url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token.as_str())
    }

    async fn send(&self, builder: RequestBuilder, auth_endpoint: bool) -> Result<Response, ProviderError> {
        let resp = self.http.send(builder).await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ProviderError::from_status(status.as_u16(), &body, auth_endpoint))
    }
}

/// Percent-encode each segment, keeping `/` separators.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|seg| urlencoding::encode(seg).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl AuthProvider for SupabaseClient {
    async fn current_user(&self, token: &AccessToken) -> Result<AuthUser, ProviderError> {
        let resp = self
            .send(self.request(Method::GET, "/auth/v1/user", token), true)
            .await?;
        Ok(resp.json::<AuthUser>().await?)
    }

    async fn update_user_metadata(
        &self,
        token: &AccessToken,
        patch: &MetadataPatch,
    ) -> Result<AuthUser, ProviderError> {
        debug!(keys = patch.iter().count(), "updating user metadata");
        let builder = self
            .request(Method::PUT, "/auth/v1/user", token)
            .json(&json!({ "data": patch }));
        let resp = self.send(builder, true).await?;
        Ok(resp.json::<AuthUser>().await?)
    }
}

#[async_trait]
impl ObjectStore for SupabaseClient {
    async fn upload(
        &self,
        token: &AccessToken,
        bucket: &str,
        path: &str,
        data: Bytes,
        opts: &UploadOptions,
    ) -> Result<(), ProviderError> {
        debug!(bucket, path, size = data.len(), upsert = opts.upsert, "uploading object");
        let route = format!("/storage/v1/object/{}/{}", encode_path(bucket), encode_path(path));
        let builder = self
            .request(Method::POST, &route, token)
            .header(reqwest::header::CONTENT_TYPE, &opts.content_type)
            .header(reqwest::header::CACHE_CONTROL, "max-age=3600")
            .header("x-upsert", if opts.upsert { "true" } else { "false" })
            .body(data);
        self.send(builder, false).await?;
        Ok(())
    }

    async fn list(
        &self,
        token: &AccessToken,
        bucket: &str,
        prefix: &str,
        search: &str,
    ) -> Result<Vec<StoredObject>, ProviderError> {
        let route = format!("/storage/v1/object/list/{}", encode_path(bucket));
        let mut objects: Vec<StoredObject> = Vec::new();
        // Storage caps each page at `limit`; a short page is the last one.
        loop {
            let builder = self.request(Method::POST, &route, token).json(&json!({
                "prefix": prefix,
                "search": search,
                "limit": LIST_LIMIT,
                "offset": objects.len(),
                "sortBy": { "column": "name", "order": "asc" },
            }));
            let page = self
                .send(builder, false)
                .await?
                .json::<Vec<StoredObject>>()
                .await?;
            let last = page.len() < LIST_LIMIT;
            objects.extend(page);
            if last {
                break;
            }
        }
        debug!(bucket, prefix, search, found = objects.len(), "listed objects");
        Ok(objects)
    }

    async fn remove(
        &self,
        token: &AccessToken,
        bucket: &str,
        paths: &[String],
    ) -> Result<(), ProviderError> {
        debug!(bucket, count = paths.len(), "removing objects");
        let route = format!("/storage/v1/object/{}", encode_path(bucket));
        let builder = self
            .request(Method::DELETE, &route, token)
            .json(&json!({ "prefixes": paths }));
        self.send(builder, false).await?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            encode_path(bucket),
            encode_path(path)
        )
    }
}
