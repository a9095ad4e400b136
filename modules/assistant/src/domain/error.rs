use platform::ProviderError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("User not authenticated")]
    NotAuthenticated,

    #[error("{0}")]
    BadInput(String),

    #[error("Error uploading file: {0}")]
    Upload(String),

    /// Auth provider failure other than a rejected session.
    #[error("{0}")]
    Remote(String),

    /// The model call failed before producing output.
    #[error("{0}")]
    Inference(String),
}

impl DomainError {
    pub fn bad_input(message: impl Into<String>) -> Self {
        Self::BadInput(message.into())
    }

    pub fn remote(err: ProviderError) -> Self {
        match err {
            ProviderError::Unauthorized(_) => Self::NotAuthenticated,
            other => Self::Remote(other.to_string()),
        }
    }

    pub fn upload(err: ProviderError) -> Self {
        Self::Upload(err.to_string())
    }

    pub fn inference(err: ProviderError) -> Self {
        Self::Inference(err.to_string())
    }
}
