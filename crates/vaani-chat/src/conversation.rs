//! Per-mode conversation transcripts.
//!
//! A widget keeps one ordered transcript per [`ConversationMode`]. Index 0 is
//! the system message when the widget has a context configured. Transcripts
//! are only ever replaced through [`ConversationStore::commit`], which checks
//! a revision number so that a translation batch started before a newer
//! switch (or a reset) cannot overwrite fresher content.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use vaani_core::types::Message;

/// Interaction mode owning a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationMode {
    Chat,
    Voice,
}

impl ConversationMode {
    pub const ALL: [ConversationMode; 2] = [ConversationMode::Chat, ConversationMode::Voice];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationMode::Chat => "chat",
            ConversationMode::Voice => "voice",
        }
    }
}

impl fmt::Display for ConversationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default)]
struct Conversation {
    messages: Vec<Message>,
    revision: u64,
    /// Revision of the translation batch expected to commit next, if any.
    pending: Option<u64>,
}

/// Copy of a transcript taken when a translation batch starts.
#[derive(Debug, Clone)]
pub struct TranscriptSnapshot {
    pub mode: ConversationMode,
    pub revision: u64,
    pub messages: Vec<Message>,
    /// An earlier batch for this transcript had not committed yet, so the
    /// snapshot may still be in an older language than the recorded one.
    pub superseded: bool,
}

/// Transcripts for every mode of one widget.
#[derive(Debug)]
pub struct ConversationStore {
    conversations: Mutex<HashMap<ConversationMode, Conversation>>,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationStore {
    /// Empty transcripts for every mode.
    pub fn new() -> Self {
        let conversations = ConversationMode::ALL
            .iter()
            .map(|mode| (*mode, Conversation::default()))
            .collect();
        Self {
            conversations: Mutex::new(conversations),
        }
    }

    /// Transcripts seeded with `context` as the system message. An empty
    /// context leaves them empty.
    pub fn seeded(context: &str) -> Self {
        let store = Self::new();
        store.seed(context);
        store
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ConversationMode, Conversation>> {
        self.conversations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert the system message into every transcript that is still empty.
    pub fn seed(&self, context: &str) {
        if context.trim().is_empty() {
            return;
        }
        let mut conversations = self.lock();
        for conversation in conversations.values_mut() {
            if conversation.messages.is_empty() {
                conversation.messages.push(Message::system(context));
            }
        }
    }

    pub fn messages(&self, mode: ConversationMode) -> Vec<Message> {
        self.lock()
            .get(&mode)
            .map(|c| c.messages.clone())
            .unwrap_or_default()
    }

    pub fn len(&self, mode: ConversationMode) -> usize {
        self.lock().get(&mode).map(|c| c.messages.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, mode: ConversationMode) -> bool {
        self.len(mode) == 0
    }

    pub fn revision(&self, mode: ConversationMode) -> u64 {
        self.lock().get(&mode).map(|c| c.revision).unwrap_or(0)
    }

    /// Append a message. Appends never invalidate an outstanding batch.
    pub fn push(&self, mode: ConversationMode, message: Message) {
        self.lock().entry(mode).or_default().messages.push(message);
    }

    /// Clear a transcript back to its system message and invalidate any
    /// outstanding batch for it.
    pub fn reset(&self, mode: ConversationMode) {
        let mut conversations = self.lock();
        let conversation = conversations.entry(mode).or_default();
        conversation.messages.truncate(1);
        if conversation
            .messages
            .first()
            .map(|m| !m.is_system())
            .unwrap_or(false)
        {
            conversation.messages.clear();
        }
        conversation.revision += 1;
        conversation.pending = None;
    }

    /// Start a translation batch: bump the revision and snapshot the
    /// transcript. Returns `None` when there is nothing beyond the system
    /// message.
    pub fn begin_batch(&self, mode: ConversationMode) -> Option<TranscriptSnapshot> {
        let mut conversations = self.lock();
        let conversation = conversations.get_mut(&mode)?;
        if conversation.messages.len() <= 1 {
            return None;
        }
        conversation.revision += 1;
        let superseded = conversation.pending.is_some();
        conversation.pending = Some(conversation.revision);
        Some(TranscriptSnapshot {
            mode,
            revision: conversation.revision,
            messages: conversation.messages.clone(),
            superseded,
        })
    }

    /// Replace the snapshotted prefix of a transcript with `messages`.
    ///
    /// Succeeds only if no newer batch or reset happened since the snapshot
    /// at `revision` was taken. Messages appended after the snapshot are
    /// kept after the replaced prefix.
    pub fn commit(&self, mode: ConversationMode, revision: u64, messages: Vec<Message>) -> bool {
        let mut conversations = self.lock();
        let Some(conversation) = conversations.get_mut(&mode) else {
            return false;
        };
        if conversation.revision != revision || messages.len() > conversation.messages.len() {
            return false;
        }
        let tail = conversation.messages.split_off(messages.len());
        conversation.messages = messages;
        conversation.messages.extend(tail);
        conversation.pending = None;
        true
    }

    /// Give up on the batch at `revision`, leaving the transcript as it is.
    pub fn abandon(&self, mode: ConversationMode, revision: u64) {
        if let Some(conversation) = self.lock().get_mut(&mode) {
            if conversation.pending == Some(revision) {
                conversation.pending = None;
            }
        }
    }
}
