//! In-memory providers for `--mock` runs and tests. Every fake counts the
//! remote calls it receives.

use async_trait::async_trait;
use bytes::Bytes;
use folio_kit::AccessToken;
use futures::StreamExt;
use parking_lot::{Mutex, RwLock};
use std::{
    collections::{BTreeMap, HashMap},
    sync::atomic::{AtomicUsize, Ordering},
};

use crate::{
    auth::{AuthProvider, AuthUser, MetadataPatch},
    error::ProviderError,
    inference::{ChatMessage, LanguageModel, TextStream},
    storage::{ObjectStore, StoredObject, UploadOptions},
};

// -------- auth --------

#[derive(Default)]
pub struct MemoryAuth {
    users: RwLock<HashMap<String, AuthUser>>,
    tokens: RwLock<HashMap<String, String>>,
    fail_updates: Mutex<Option<ProviderError>>,
    calls: AtomicUsize,
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a user reachable through `token`.
    pub fn with_session(self, token: &str, user: AuthUser) -> Self {
        self.tokens
            .write()
            .insert(token.to_string(), user.id.clone());
        self.users.write().insert(user.id.clone(), user);
        self
    }

    /// Make every metadata update fail with `err`.
    pub fn fail_updates_with(&self, err: ProviderError) {
        *self.fail_updates.lock() = Some(err);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn user(&self, id: &str) -> Option<AuthUser> {
        self.users.read().get(id).cloned()
    }

    fn resolve(&self, token: &AccessToken) -> Result<String, ProviderError> {
        self.tokens
            .read()
            .get(token.as_str())
            .cloned()
            .ok_or_else(|| ProviderError::Unauthorized("invalid JWT".into()))
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    async fn current_user(&self, token: &AccessToken) -> Result<AuthUser, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let id = self.resolve(token)?;
        self.user(&id)
            .ok_or_else(|| ProviderError::Unauthorized("user not found".into()))
    }

    async fn update_user_metadata(
        &self,
        token: &AccessToken,
        patch: &MetadataPatch,
    ) -> Result<AuthUser, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let id = self.resolve(token)?;
        if let Some(err) = self.fail_updates.lock().clone() {
            return Err(err);
        }
        let mut users = self.users.write();
        let user = users
            .get_mut(&id)
            .ok_or_else(|| ProviderError::Unauthorized("user not found".into()))?;
        patch.apply_to(&mut user.user_metadata);
        Ok(user.clone())
    }
}

// -------- storage --------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryObject {
    pub data: Bytes,
    pub content_type: String,
}

pub struct MemoryObjectStore {
    base_url: String,
    objects: RwLock<BTreeMap<(String, String), MemoryObject>>,
    fail_uploads: Mutex<Option<ProviderError>>,
    fail_removes: Mutex<Option<ProviderError>>,
    calls: AtomicUsize,
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new("memory://storage")
    }
}

impl MemoryObjectStore {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            objects: RwLock::new(BTreeMap::new()),
            fail_uploads: Mutex::new(None),
            fail_removes: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_uploads_with(&self, err: ProviderError) {
        *self.fail_uploads.lock() = Some(err);
    }

    pub fn fail_removes_with(&self, err: ProviderError) {
        *self.fail_removes.lock() = Some(err);
    }

    /// Seed an object without counting a call.
    pub fn insert(&self, bucket: &str, path: &str, data: &'static [u8]) {
        self.objects.write().insert(
            (bucket.to_string(), path.to_string()),
            MemoryObject {
                data: Bytes::from_static(data),
                content_type: "application/octet-stream".into(),
            },
        );
    }

    pub fn get(&self, bucket: &str, path: &str) -> Option<MemoryObject> {
        self.objects
            .read()
            .get(&(bucket.to_string(), path.to_string()))
            .cloned()
    }

    /// Paths currently stored in `bucket`.
    pub fn paths(&self, bucket: &str) -> Vec<String> {
        self.objects
            .read()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, p)| p.clone())
            .collect()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn upload(
        &self,
        _token: &AccessToken,
        bucket: &str,
        path: &str,
        data: Bytes,
        opts: &UploadOptions,
    ) -> Result<(), ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fail_uploads.lock().clone() {
            return Err(err);
        }
        let key = (bucket.to_string(), path.to_string());
        let mut objects = self.objects.write();
        if !opts.upsert && objects.contains_key(&key) {
            return Err(ProviderError::Api {
                status: 409,
                message: "The resource already exists".into(),
            });
        }
        objects.insert(
            key,
            MemoryObject {
                data,
                content_type: opts.content_type.clone(),
            },
        );
        Ok(())
    }

    async fn list(
        &self,
        _token: &AccessToken,
        bucket: &str,
        prefix: &str,
        search: &str,
    ) -> Result<Vec<StoredObject>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let dir = prefix.trim_matches('/');
        let found = self
            .objects
            .read()
            .keys()
            .filter(|(b, _)| b == bucket)
            .filter_map(|(_, path)| {
                let name = if dir.is_empty() {
                    path.as_str()
                } else {
                    path.strip_prefix(dir)?.strip_prefix('/')?
                };
                (!name.contains('/') && name.contains(search)).then(|| StoredObject {
                    name: name.to_string(),
                })
            })
            .collect();
        Ok(found)
    }

    async fn remove(
        &self,
        _token: &AccessToken,
        bucket: &str,
        paths: &[String],
    ) -> Result<(), ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fail_removes.lock().clone() {
            return Err(err);
        }
        let mut objects = self.objects.write();
        for path in paths {
            objects.remove(&(bucket.to_string(), path.clone()));
        }
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/{bucket}/{path}", self.base_url)
    }
}

// -------- inference --------

/// Model with canned output.
pub struct ScriptedModel {
    id: String,
    reply: Option<String>,
    chunks: Vec<String>,
    fail_open: Option<ProviderError>,
    fail_mid_stream: Option<ProviderError>,
    seen: Mutex<Vec<ChatMessage>>,
    calls: AtomicUsize,
}

impl ScriptedModel {
    /// Echoes prompts and streams a short fixed summary.
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            reply: None,
            chunks: vec![
                "## Overview\n\n".to_string(),
                "This document was summarized by an offline model.\n".to_string(),
            ],
            fail_open: None,
            fail_mid_stream: None,
            seen: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_reply(mut self, reply: &str) -> Self {
        self.reply = Some(reply.to_string());
        self
    }

    pub fn with_chunks(mut self, chunks: &[&str]) -> Self {
        self.chunks = chunks.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Every call fails before producing output.
    pub fn failing_with(mut self, err: ProviderError) -> Self {
        self.fail_open = Some(err);
        self
    }

    /// Streams the chunks, then yields `err`.
    pub fn failing_mid_stream(mut self, err: ProviderError) -> Self {
        self.fail_mid_stream = Some(err);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Messages received by `stream_text`, in order.
    pub fn seen_messages(&self) -> Vec<ChatMessage> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn model_id(&self) -> &str {
        &self.id
    }

    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.fail_open {
            return Err(err.clone());
        }
        Ok(self
            .reply
            .clone()
            .unwrap_or_else(|| format!("[{}] {prompt}", self.id)))
    }

    async fn stream_text(&self, messages: Vec<ChatMessage>) -> Result<TextStream, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().extend(messages);
        if let Some(err) = &self.fail_open {
            return Err(err.clone());
        }
        let items: Vec<Result<String, ProviderError>> = self
            .chunks
            .iter()
            .cloned()
            .map(Ok)
            .chain(self.fail_mid_stream.clone().map(Err))
            .collect();
        Ok(futures::stream::iter(items).boxed())
    }
}
