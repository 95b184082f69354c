//! One embedded widget's conversation state.
//!
//! A [`WidgetSession`] owns the chat and voice transcripts, the language
//! switch orchestrator that keeps them in the active language, and the send
//! workflow that appends user and assistant messages.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

use vaani_core::config::WidgetConfig;
use vaani_core::types::Message;
use vaani_provider::{ChatProvider, Translator};

use crate::conversation::{ConversationMode, ConversationStore};
use crate::error::ChatError;
use crate::fallback;
use crate::orchestrator::{LanguageSwitchOrchestrator, SwitchConfig, SwitchOutcome};

/// Maximum message length in characters.
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Assistant reply produced by [`WidgetSession::send_message`].
#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    pub mode: ConversationMode,
    pub message: Message,
    /// The provider failed and a canned reply was used.
    pub fallback: bool,
    /// Voice replies are meant to be read aloud.
    pub speak: bool,
}

/// Point-in-time view of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub language: String,
    pub previous_language: String,
    pub translating: bool,
    pub chat: Vec<Message>,
    pub voice: Vec<Message>,
}

pub struct WidgetSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    last_active: Mutex<Instant>,
    enable_voice: bool,
    store: Arc<ConversationStore>,
    orchestrator: Arc<LanguageSwitchOrchestrator>,
    chat: Arc<dyn ChatProvider>,
}

impl WidgetSession {
    /// Create a session with both transcripts seeded from the widget context.
    pub fn new(
        config: &WidgetConfig,
        chat: Arc<dyn ChatProvider>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        let store = Arc::new(ConversationStore::seeded(&config.context));
        let orchestrator = Arc::new(LanguageSwitchOrchestrator::new(
            translator,
            Arc::clone(&store),
            SwitchConfig::from(config),
        ));
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            last_active: Mutex::new(Instant::now()),
            enable_voice: config.enable_voice,
            store,
            orchestrator,
            chat,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn language(&self) -> String {
        self.orchestrator.current_language()
    }

    pub fn is_translating(&self) -> bool {
        self.orchestrator.is_translating()
    }

    /// Time since the widget last read or changed this session.
    pub fn idle_for(&self) -> Duration {
        self.last_active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .elapsed()
    }

    fn touch(&self) {
        *self
            .last_active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Instant::now();
    }

    pub fn messages(&self, mode: ConversationMode) -> Vec<Message> {
        self.store.messages(mode)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.touch();
        let language = self.orchestrator.language();
        SessionSnapshot {
            id: self.id,
            created_at: self.created_at,
            language: language.current,
            previous_language: language.previous,
            translating: self.orchestrator.is_translating(),
            chat: self.store.messages(ConversationMode::Chat),
            voice: self.store.messages(ConversationMode::Voice),
        }
    }

    /// Append a user message, ask the provider for a reply and append it.
    ///
    /// Provider failures do not fail the call: a canned reply in the current
    /// language is used instead and the reply is flagged as a fallback.
    pub async fn send_message(&self, mode: ConversationMode, text: &str) -> Result<Reply, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if text.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(ChatError::MessageTooLong(MAX_MESSAGE_LENGTH));
        }

        self.touch();
        self.store.push(mode, Message::user(text));
        let history = self.store.messages(mode);
        debug!(session = %self.id, mode = %mode, messages = history.len(), "Requesting reply");

        let (content, fallback) = match self.chat.complete(&history).await {
            Ok(reply) => (reply, false),
            Err(e) => {
                warn!(session = %self.id, error = %e, "Chat provider unavailable, using fallback reply");
                (fallback::fallback_reply(&history, &self.language()), true)
            }
        };

        let message = Message::assistant(content);
        self.store.push(mode, message.clone());
        Ok(Reply {
            mode,
            message,
            fallback,
            speak: mode == ConversationMode::Voice && self.enable_voice,
        })
    }

    /// Switch the widget language; translation continues in the background.
    pub fn change_language(&self, language: &str) -> JoinHandle<SwitchOutcome> {
        self.touch();
        self.orchestrator.on_language_change(language)
    }

    /// Clear one transcript back to its system message.
    pub fn reset(&self, mode: ConversationMode) {
        self.touch();
        self.store.reset(mode);
    }
}
