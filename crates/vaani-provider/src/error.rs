//! Error types for provider calls.

use vaani_core::error::VaaniError;

/// Errors from a single provider request.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider API key is not configured")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response format: {0}")]
    MalformedResponse(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ProviderError {
    /// Upstream HTTP status, when the provider answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Status { status, .. } => Some(*status),
            ProviderError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<ProviderError> for VaaniError {
    fn from(err: ProviderError) -> Self {
        VaaniError::Provider(err.to_string())
    }
}
