//! Route handler functions for all API endpoints.
//!
//! The relay handlers forward JSON (or, for speech-to-text, a multipart
//! upload) to the provider and hand its answer back unmodified. The session
//! handlers drive [`vaani_chat::WidgetSession`]s held in [`AppState`].

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use vaani_chat::{ConversationMode, Reply, SessionSnapshot};
use vaani_core::config::WidgetConfig;
use vaani_core::languages::{self, LanguageInfo, SUPPORTED_LANGUAGES};
use vaani_provider::client::endpoints;
use vaani_provider::AudioUpload;

use crate::error::ApiError;
use crate::state::AppState;

/// Language assumed for uploads that do not name one.
const DEFAULT_STT_LANGUAGE: &str = "en-IN";

// =============================================================================
// Request / response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub endpoints: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "hasApiKey")]
    pub has_api_key: bool,
    pub uptime_secs: u64,
    pub sessions: usize,
}

#[derive(Debug, Serialize)]
pub struct LanguagesResponse {
    pub languages: Vec<LanguageInfo>,
}

/// Widget settings safe to hand to the browser.
#[derive(Debug, Serialize)]
pub struct WidgetConfigResponse {
    pub widget: WidgetConfig,
    /// Display details for the configured languages, in selector order.
    pub languages: Vec<LanguageInfo>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default = "default_mode")]
    pub mode: ConversationMode,
    pub text: String,
}

fn default_mode() -> ConversationMode {
    ConversationMode::Chat
}

#[derive(Debug, Deserialize)]
pub struct ChangeLanguageRequest {
    pub language: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LanguageChangeResponse {
    pub language: String,
    pub previous_language: String,
    pub translating: bool,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub mode: ConversationMode,
}

// =============================================================================
// Service endpoints
// =============================================================================

/// GET / - service banner.
pub async fn root() -> Json<RootResponse> {
    let endpoints = [
        "GET /api/health - Health check",
        "POST /api/chat - Chat completions",
        "POST /api/tts - Text-to-Speech",
        "POST /api/stt - Speech-to-Text",
        "POST /api/translate - Translation",
        "POST /api/language-id - Language identification",
        "GET /api/languages - Supported languages",
        "GET /api/widget/config - Widget settings",
        "POST /api/sessions - Create a widget session",
    ];
    Json(RootResponse {
        status: "ok".to_string(),
        message: "Vaani widget backend".to_string(),
        timestamp: Utc::now(),
        endpoints: endpoints.iter().map(|e| e.to_string()).collect(),
    })
}

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        has_api_key: state.client.has_api_key(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        sessions: state.session_count(),
    })
}

/// GET /api/languages
pub async fn supported_languages() -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        languages: SUPPORTED_LANGUAGES.to_vec(),
    })
}

/// GET /api/widget/config
pub async fn widget_config(State(state): State<AppState>) -> Json<WidgetConfigResponse> {
    let widget = state.config.widget.clone();
    let languages = widget
        .languages
        .iter()
        .map(String::as_str)
        .map(languages::language_info)
        .collect();
    Json(WidgetConfigResponse { widget, languages })
}

// =============================================================================
// Relay endpoints
// =============================================================================

async fn relay(state: &AppState, endpoint: &str, body: Value) -> Result<Json<Value>, ApiError> {
    tracing::debug!(endpoint, "Relaying request");
    let result = state.client.forward_json(endpoint, &body).await.map_err(|e| {
        tracing::error!(endpoint, error = %e, "Relay request failed");
        ApiError::from(e)
    })?;
    Ok(Json(result))
}

/// POST /api/chat
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    relay(&state, endpoints::CHAT, body).await
}

/// POST /api/tts
pub async fn tts(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    relay(&state, endpoints::TTS, body).await
}

/// POST /api/translate
pub async fn translate(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    relay(&state, endpoints::TRANSLATE, body).await
}

/// POST /api/language-id
pub async fn language_id(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    relay(&state, endpoints::LANGUAGE_ID, body).await
}

/// POST /api/stt - multipart upload with a `file` part and an optional
/// `language_code` field.
pub async fn stt(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut audio: Option<AudioUpload> = None;
    let mut language_code: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field
                    .file_name()
                    .filter(|n| !n.is_empty())
                    .unwrap_or("audio.wav")
                    .to_string();
                let content_type = field
                    .content_type()
                    .filter(|c| !c.is_empty())
                    .unwrap_or("audio/wav")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read audio: {}", e)))?;
                audio = Some(AudioUpload {
                    bytes: bytes.to_vec(),
                    file_name,
                    content_type,
                    language_code: String::new(),
                });
            }
            Some("language_code") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid language_code: {}", e)))?;
                if !value.trim().is_empty() {
                    language_code = Some(value.trim().to_string());
                }
            }
            _ => {}
        }
    }

    let mut audio = audio.ok_or_else(|| ApiError::BadRequest("No audio file provided".to_string()))?;
    audio.language_code = language_code.unwrap_or_else(|| DEFAULT_STT_LANGUAGE.to_string());
    tracing::debug!(
        bytes = audio.bytes.len(),
        language = %audio.language_code,
        "Relaying speech-to-text upload"
    );

    let result = state.client.forward_multipart(audio).await.map_err(|e| {
        tracing::error!(error = %e, "Speech-to-text relay failed");
        ApiError::from(e)
    })?;
    Ok(Json(result))
}

// =============================================================================
// Widget sessions
// =============================================================================

fn parse_session_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid session id: {}", raw)))
}

/// POST /api/sessions
pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionSnapshot>) {
    let session = state.create_session();
    (StatusCode::CREATED, Json(session.snapshot()))
}

/// GET /api/sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = state.session(parse_session_id(&id)?)?;
    Ok(Json(session.snapshot()))
}

/// DELETE /api/sessions/{id}
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.remove_session(parse_session_id(&id)?)?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/sessions/{id}/messages
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> Result<Json<Reply>, ApiError> {
    let session = state.session(parse_session_id(&id)?)?;
    let reply = session.send_message(body.mode, &body.text).await?;
    Ok(Json(reply))
}

/// PUT /api/sessions/{id}/language - returns once the language is switched;
/// translation of the history continues in the background.
pub async fn change_language(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ChangeLanguageRequest>,
) -> Result<(StatusCode, Json<LanguageChangeResponse>), ApiError> {
    let session = state.session(parse_session_id(&id)?)?;
    let language = body.language.trim();
    if language.is_empty() {
        return Err(ApiError::BadRequest("language must not be empty".to_string()));
    }

    let previous_language = session.language();
    // Dropping the handle detaches the switch; it still runs to completion.
    drop(session.change_language(language));

    Ok((
        StatusCode::ACCEPTED,
        Json(LanguageChangeResponse {
            language: session.language(),
            previous_language,
            translating: session.is_translating(),
        }),
    ))
}

/// POST /api/sessions/{id}/reset
pub async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ResetRequest>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let session = state.session(parse_session_id(&id)?)?;
    session.reset(body.mode);
    Ok(Json(session.snapshot()))
}
