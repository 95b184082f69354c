//! Capability traits consumed by the conversation engine.
//!
//! The engine never talks to [`SarvamClient`] directly; it is handed an
//! `Arc<dyn Translator>` and an `Arc<dyn ChatProvider>` at construction so
//! tests can substitute scripted implementations.

use async_trait::async_trait;

use vaani_core::types::Message;

use crate::client::SarvamClient;
use crate::error::ProviderError;
use crate::types::TranslateOptions;

/// Translates one piece of text. Each call is independent and may fail on
/// its own.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
        source_language: &str,
        options: &TranslateOptions,
    ) -> Result<String, ProviderError>;
}

/// Produces the assistant's reply to a conversation.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<String, ProviderError>;
}

#[async_trait]
impl Translator for SarvamClient {
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
        source_language: &str,
        options: &TranslateOptions,
    ) -> Result<String, ProviderError> {
        SarvamClient::translate(self, text, target_language, source_language, options).await
    }
}

#[async_trait]
impl ChatProvider for SarvamClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, ProviderError> {
        self.chat_completion(messages).await
    }
}
