//! Error types for the conversation engine.

use vaani_core::error::VaaniError;
use vaani_provider::ProviderError;

/// Errors from widget sessions.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("session not found: {0}")]
    SessionNotFound(uuid::Uuid),
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl From<ChatError> for VaaniError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Provider(e) => e.into(),
            other => VaaniError::Api(other.to_string()),
        }
    }
}
