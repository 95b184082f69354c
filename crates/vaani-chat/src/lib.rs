//! Conversation engine for the widget.
//!
//! Holds the per-mode transcripts, re-translates them when the user switches
//! language, and runs the send workflow with offline fallback replies.

pub mod conversation;
pub mod error;
pub mod fallback;
pub mod orchestrator;
pub mod session;

pub use conversation::{ConversationMode, ConversationStore, TranscriptSnapshot};
pub use error::ChatError;
pub use orchestrator::{
    BatchReport, LanguageState, LanguageSwitchOrchestrator, SwitchConfig, SwitchOutcome,
};
pub use session::{Reply, SessionSnapshot, WidgetSession, MAX_MESSAGE_LENGTH};
