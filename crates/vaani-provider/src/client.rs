//! HTTP client for the provider's REST API.
//!
//! Every request carries the subscription key in [`API_KEY_HEADER`]. The
//! `forward_*` methods pass payloads through untouched for the relay; the
//! typed methods build the request body and pull the useful field out of the
//! response.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use vaani_core::config::ProviderConfig;
use vaani_core::languages::{self, AUTO_DETECT};
use vaani_core::types::Message;

use crate::error::ProviderError;
use crate::types::{
    chat_reply, first_text, truncate_for_speech, AudioUpload, ChatCompletionRequest,
    TranslateOptions, TranslateRequest, TtsRequest,
};

/// Header carrying the subscription key on every upstream request.
pub const API_KEY_HEADER: &str = "api-subscription-key";

/// Upstream endpoint paths, relative to the base URL.
pub mod endpoints {
    pub const CHAT: &str = "/v1/chat/completions";
    pub const TTS: &str = "/text-to-speech";
    pub const STT: &str = "/speech-to-text";
    pub const TRANSLATE: &str = "/translate";
    pub const LANGUAGE_ID: &str = "/language-identification";
}

/// Language reported when identification fails.
const FALLBACK_LANGUAGE: &str = "en";

/// Provider API client. Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct SarvamClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    chat_model: String,
    max_tokens: u32,
    temperature: f32,
    tts_max_chars: usize,
}

impl SarvamClient {
    /// Build a client from the provider section of the configuration.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.trim().to_string(),
            chat_model: config.chat_model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            tts_max_chars: config.tts_max_chars,
        })
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        if self.api_key.is_empty() {
            Err(ProviderError::MissingApiKey)
        } else {
            Ok(&self.api_key)
        }
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<Value, ProviderError> {
        let key = self.api_key()?;
        let response = self
            .http
            .post(self.url(endpoint))
            .header(API_KEY_HEADER, key)
            .json(body)
            .send()
            .await?;
        read_json(endpoint, response).await
    }

    /// Forward an arbitrary JSON body to `endpoint` and return the provider's
    /// JSON unchanged.
    pub async fn forward_json(&self, endpoint: &str, body: &Value) -> Result<Value, ProviderError> {
        self.post_json(endpoint, body).await
    }

    /// Forward an audio file to the speech-to-text endpoint as multipart.
    pub async fn forward_multipart(&self, audio: AudioUpload) -> Result<Value, ProviderError> {
        let key = self.api_key()?;
        let part = reqwest::multipart::Part::bytes(audio.bytes)
            .file_name(audio.file_name)
            .mime_str(&audio.content_type)
            .map_err(|e| ProviderError::InvalidRequest(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("language_code", audio.language_code);

        let response = self
            .http
            .post(self.url(endpoints::STT))
            .header(API_KEY_HEADER, key)
            .multipart(form)
            .send()
            .await?;
        read_json(endpoints::STT, response).await
    }

    /// Run a chat completion over the full conversation and return the
    /// assistant's reply.
    pub async fn chat_completion(&self, messages: &[Message]) -> Result<String, ProviderError> {
        let body = ChatCompletionRequest {
            model: &self.chat_model,
            messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            stream: false,
        };
        let payload = self.post_json(endpoints::CHAT, &body).await?;
        chat_reply(&payload).ok_or_else(|| {
            ProviderError::MalformedResponse("no choices[0].message.content or content".into())
        })
    }

    /// Synthesize speech and return the audio URL or base64 payload.
    pub async fn synthesize_speech(&self, text: &str, language: &str) -> Result<String, ProviderError> {
        let text = truncate_for_speech(text, self.tts_max_chars);
        let body = TtsRequest {
            text: &text,
            language_code: languages::provider_code(language),
            voice: "default",
            speed: 1.0,
            pitch: 1.0,
            volume: 1.0,
        };
        let payload = self.post_json(endpoints::TTS, &body).await?;
        first_text(&payload, &["audio_url", "audio"])
            .ok_or_else(|| ProviderError::MalformedResponse("no audio_url or audio".into()))
    }

    /// Transcribe an audio file. An answer without text yields an empty
    /// transcript.
    pub async fn transcribe_audio(&self, audio: AudioUpload) -> Result<String, ProviderError> {
        let payload = self.forward_multipart(audio).await?;
        Ok(first_text(&payload, &["transcription", "text"]).unwrap_or_default())
    }

    /// Translate `text` from `source_language` (or `auto`) into
    /// `target_language`.
    ///
    /// A response without `translated_text` or `output` is an error, so the
    /// caller decides what to keep.
    pub async fn translate(
        &self,
        text: &str,
        target_language: &str,
        source_language: &str,
        options: &TranslateOptions,
    ) -> Result<String, ProviderError> {
        let source = if source_language == AUTO_DETECT {
            AUTO_DETECT.to_string()
        } else {
            languages::provider_code(source_language)
        };
        let body = TranslateRequest {
            input: text,
            source_language_code: source,
            target_language_code: languages::provider_code(target_language),
            model: &options.model,
            mode: options.mode,
            output_script: options.output_script,
            numerals_format: options.numerals_format,
            enable_preprocessing: options.enable_preprocessing,
            speaker_gender: options.speaker_gender,
        };
        debug!(
            source = %body.source_language_code,
            target = %body.target_language_code,
            chars = text.chars().count(),
            "Translating text"
        );
        let payload = self.post_json(endpoints::TRANSLATE, &body).await?;
        first_text(&payload, &["translated_text", "output"]).ok_or_else(|| {
            ProviderError::MalformedResponse("no translated_text or output".into())
        })
    }

    /// Identify the language of `text`. Never fails: any error reports
    /// English.
    pub async fn identify_language(&self, text: &str) -> String {
        let body = serde_json::json!({ "input": text });
        match self.post_json(endpoints::LANGUAGE_ID, &body).await {
            Ok(payload) => first_text(&payload, &["language_code", "language"])
                .unwrap_or_else(|| FALLBACK_LANGUAGE.to_string()),
            Err(e) => {
                warn!(error = %e, "Language identification failed, assuming English");
                FALLBACK_LANGUAGE.to_string()
            }
        }
    }
}

async fn read_json(endpoint: &str, response: reqwest::Response) -> Result<Value, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!(endpoint, status = status.as_u16(), "Provider returned an error");
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body,
        });
    }
    response
        .json::<Value>()
        .await
        .map_err(|e| ProviderError::MalformedResponse(e.to_string()))
}
