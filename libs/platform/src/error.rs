use thiserror::Error;

/// Failure reported by a remote provider. Messages are the provider's own.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// Session missing, expired or rejected.
    #[error("{0}")]
    Unauthorized(String),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("{0}")]
    Transport(String),

    #[error("unexpected provider response: {0}")]
    Decode(String),
}

impl ProviderError {
    /// Classify a non-success HTTP response. 401/403 count as a rejected session
    /// only where the caller says so (auth endpoints).
    pub(crate) fn from_status(status: u16, body: &str, auth_endpoint: bool) -> Self {
        let message = extract_message(body).unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                format!("request failed with status {status}")
            } else {
                trimmed.to_string()
            }
        });
        if auth_endpoint && (status == 401 || status == 403) {
            ProviderError::Unauthorized(message)
        } else {
            ProviderError::Api { status, message }
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ProviderError::Decode(e.to_string())
        } else {
            ProviderError::Transport(e.to_string())
        }
    }
}

/// Pull the human-readable message out of the error shapes used by
/// Supabase (`message`, `msg`, `error_description`, `error`) and
/// OpenAI-compatible APIs (`error.message`).
fn extract_message(body: &str) -> Option<String> {
    let v: serde_json::Value = serde_json::from_str(body).ok()?;
    if let Some(m) = v.pointer("/error/message").and_then(|m| m.as_str()) {
        return Some(m.to_string());
    }
    ["message", "msg", "error_description", "error"]
        .iter()
        .find_map(|k| v.get(*k).and_then(|m| m.as_str()))
        .map(str::to_owned)
}
