use platform::ProviderError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("User not authenticated")]
    NotAuthenticated,

    #[error("{0}")]
    BadInput(String),

    /// Storage rejected the avatar upload.
    #[error("{0}")]
    Upload(String),

    /// Auth or storage failure; the provider message is kept verbatim.
    #[error("{0}")]
    Remote(String),
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
        match err {
            ProviderError::Unauthorized(_) => Self::NotAuthenticated,
            other => Self::Upload(other.to_string()),
        }
    }
}
