use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::error::ProviderError;

/// Incremental model output.
pub type TextStream = BoxStream<'static, Result<String, ProviderError>>;

#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    /// Raw document bytes sent inline with the message.
    File {
        media_type: String,
        filename: Option<String>,
        data: Bytes,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: Vec<ContentPart>,
}

impl ChatMessage {
    pub fn user(content: Vec<ContentPart>) -> Self {
        Self {
            role: "user".to_string(),
            content,
        }
    }
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn model_id(&self) -> &str;

    /// One blocking completion for a single prompt.
    async fn generate_text(&self, prompt: &str) -> Result<String, ProviderError>;

    /// Open a streaming completion. Errors before the first token are returned
    /// here; later ones arrive as stream items.
    async fn stream_text(&self, messages: Vec<ChatMessage>) -> Result<TextStream, ProviderError>;
}
