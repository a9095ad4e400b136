//! Ports for the three remote providers (auth, object storage, inference)
//! and their adapters: Supabase REST, OpenAI-compatible chat completions,
//! and in-memory fakes.

pub mod auth;
pub mod chat_completions;
pub mod error;
pub mod inference;
pub mod memory;
pub mod storage;
pub mod supabase;

use folio_kit::ClientHub;
use std::sync::Arc;

pub use auth::{AuthProvider, AuthUser, MetadataPatch};
pub use error::ProviderError;
pub use inference::{ChatMessage, ContentPart, LanguageModel, TextStream};
pub use storage::{ObjectStore, StoredObject, UploadOptions};

/// The two model backends. They share one interface, so they travel together.
#[derive(Clone)]
pub struct Models {
    /// General-purpose model for one-shot generation.
    pub text: Arc<dyn LanguageModel>,
    /// Document-capable model for PDF summaries.
    pub vision: Arc<dyn LanguageModel>,
}

/// The full set of remote collaborators a server instance talks to.
#[derive(Clone)]
pub struct Platform {
    pub auth: Arc<dyn AuthProvider>,
    pub storage: Arc<dyn ObjectStore>,
    pub models: Models,
}

impl Platform {
    /// Make every provider available to modules through the hub.
    pub fn register_into(&self, hub: &ClientHub) {
        hub.register::<dyn AuthProvider>(self.auth.clone());
        hub.register::<dyn ObjectStore>(self.storage.clone());
        hub.register::<Models>(Arc::new(self.models.clone()));
    }
}
