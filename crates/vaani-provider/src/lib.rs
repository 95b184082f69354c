//! Client for the upstream speech and language provider.
//!
//! Wraps chat completions, text-to-speech, speech-to-text, translation and
//! language identification behind [`SarvamClient`], and exposes the narrow
//! [`Translator`] and [`ChatProvider`] seams the conversation engine is
//! built against.

pub mod client;
pub mod error;
pub mod traits;
pub mod types;

pub use client::{SarvamClient, API_KEY_HEADER};
pub use error::ProviderError;
pub use traits::{ChatProvider, Translator};
pub use types::{AudioUpload, TranslateOptions};
