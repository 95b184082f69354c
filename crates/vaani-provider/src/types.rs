//! Request bodies and response field extraction for provider endpoints.

use serde::Serialize;
use serde_json::Value;

use vaani_core::config::TranslationConfig;
use vaani_core::types::{Message, NumeralsFormat, OutputScript, SpeakerGender, TranslationMode};

/// Options for one translation call.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslateOptions {
    pub model: String,
    pub mode: TranslationMode,
    pub output_script: Option<OutputScript>,
    pub numerals_format: NumeralsFormat,
    pub enable_preprocessing: bool,
    pub speaker_gender: Option<SpeakerGender>,
}

/// Same values as the `[widget.translation]` defaults.
impl Default for TranslateOptions {
    fn default() -> Self {
        Self::from(&TranslationConfig::default())
    }
}

impl From<&TranslationConfig> for TranslateOptions {
    fn from(config: &TranslationConfig) -> Self {
        Self {
            model: config.model.clone(),
            mode: config.mode,
            output_script: config.output_script,
            numerals_format: config.numerals_format,
            enable_preprocessing: config.enable_preprocessing,
            speaker_gender: config.speaker_gender,
        }
    }
}

/// Body of `POST /translate`.
///
/// `output_script` is always sent, as `null` when unset.
#[derive(Debug, Serialize)]
pub struct TranslateRequest<'a> {
    pub input: &'a str,
    pub source_language_code: String,
    pub target_language_code: String,
    pub model: &'a str,
    pub mode: TranslationMode,
    pub output_script: Option<OutputScript>,
    pub numerals_format: NumeralsFormat,
    pub enable_preprocessing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker_gender: Option<SpeakerGender>,
}

/// Body of `POST /v1/chat/completions`.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub max_tokens: u32,
    pub temperature: f32,
    pub stream: bool,
}

/// Body of `POST /text-to-speech`.
#[derive(Debug, Serialize)]
pub struct TtsRequest<'a> {
    pub text: &'a str,
    pub language_code: String,
    pub voice: &'a str,
    pub speed: f32,
    pub pitch: f32,
    pub volume: f32,
}

/// An audio file bound for `POST /speech-to-text`.
#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
    /// Provider locale code, e.g. `hi-IN`.
    pub language_code: String,
}

impl AudioUpload {
    pub fn wav(bytes: Vec<u8>, language_code: impl Into<String>) -> Self {
        Self {
            bytes,
            file_name: "audio.wav".to_string(),
            content_type: "audio/wav".to_string(),
            language_code: language_code.into(),
        }
    }
}

/// First of `fields` holding a non-empty string.
pub(crate) fn first_text(payload: &Value, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .filter_map(|f| payload.get(*f).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Reply text from a chat completion payload.
pub(crate) fn chat_reply(payload: &Value) -> Option<String> {
    payload
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| first_text(payload, &["content"]))
}

/// Truncate to `max_chars` characters, marking the cut with `...`.
pub(crate) fn truncate_for_speech(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
