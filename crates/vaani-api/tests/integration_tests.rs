//! Integration tests for the Vaani API.
//!
//! Each test builds its own router against an in-process mock of the
//! provider bound to an ephemeral port, so relay and session behaviour is
//! exercised end to end over real HTTP.

use std::time::Duration;

use axum::body::Body;
use axum::extract::Multipart;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tower::ServiceExt;

use vaani_api::create_router;
use vaani_api::handlers::{HealthResponse, LanguageChangeResponse};
use vaani_api::state::AppState;
use vaani_core::config::VaaniConfig;

// =============================================================================
// Helpers
// =============================================================================

const TEST_KEY: &str = "test-subscription-key";

fn key_ok(headers: &HeaderMap) -> bool {
    headers
        .get("api-subscription-key")
        .and_then(|v| v.to_str().ok())
        == Some(TEST_KEY)
}

/// Mock provider. Translation prefixes the target locale and fails for the
/// input "fail"; chat echoes the last message.
fn mock_provider() -> Router {
    Router::new()
        .route(
            "/v1/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                if !key_ok(&headers) {
                    return (StatusCode::FORBIDDEN, Json(json!({"error": "invalid key"})));
                }
                let last = body["messages"]
                    .as_array()
                    .and_then(|m| m.last())
                    .and_then(|m| m["content"].as_str())
                    .unwrap_or("")
                    .to_string();
                (
                    StatusCode::OK,
                    Json(json!({"choices": [{"message": {"role": "assistant", "content": format!("Echo: {}", last)}}]})),
                )
            }),
        )
        .route(
            "/translate",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                if !key_ok(&headers) {
                    return (StatusCode::FORBIDDEN, Json(json!({"error": "invalid key"})));
                }
                let input = body["input"].as_str().unwrap_or("");
                if input == "fail" {
                    return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "boom"})));
                }
                let target = body["target_language_code"].as_str().unwrap_or("");
                (
                    StatusCode::OK,
                    Json(json!({"translated_text": format!("[{}] {}", target, input)})),
                )
            }),
        )
        .route(
            "/text-to-speech",
            post(|Json(body): Json<Value>| async move {
                Json(json!({"audios": ["UklGRg=="], "echo": body}))
            }),
        )
        .route(
            "/language-identification",
            post(|| async { Json(json!({"language_code": "hi-IN", "script_code": "Deva"})) }),
        )
        .route(
            "/speech-to-text",
            post(|headers: HeaderMap, mut multipart: Multipart| async move {
                assert!(key_ok(&headers));
                let mut summary = Vec::new();
                while let Some(field) = multipart.next_field().await.unwrap() {
                    let name = field.name().unwrap_or_default().to_string();
                    if name == "file" {
                        let file_name = field.file_name().unwrap_or_default().to_string();
                        let content_type = field.content_type().unwrap_or_default().to_string();
                        let len = field.bytes().await.unwrap().len();
                        summary.push(format!("file={} type={} len={}", file_name, content_type, len));
                    } else {
                        let value = field.text().await.unwrap();
                        summary.push(format!("{}={}", name, value));
                    }
                }
                Json(json!({"transcript": summary.join(";")}))
            }),
        )
}

async fn spawn_provider() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, mock_provider()).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Router wired to the mock provider with a valid key.
async fn make_app() -> Router {
    let base_url = spawn_provider().await;
    let mut config = VaaniConfig::default();
    config.provider.base_url = base_url;
    config.provider.api_key = TEST_KEY.to_string();
    config.provider.timeout_secs = 5;
    config.widget.context = "ctx".to_string();
    create_router(AppState::new(config).unwrap())
}

/// Router with no provider key configured.
fn make_keyless_app() -> Router {
    let mut config = VaaniConfig::default();
    config.provider.base_url = "http://127.0.0.1:9".to_string();
    create_router(AppState::new(config).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, json: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

fn put_json(uri: &str, json: Value) -> Request<Body> {
    Request::put(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::delete(uri).body(Body::empty()).unwrap()
}

fn multipart_request(uri: &str, parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
    let boundary = "vaani-test-boundary";
    let mut body = Vec::new();
    for (name, file_name, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        match file_name {
            Some(file_name) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: audio/webm\r\n\r\n",
                        name, file_name
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
            }
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

    Request::post(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_session(app: &Router) -> String {
    let resp = app
        .clone()
        .oneshot(Request::post("/api/sessions").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await["id"].as_str().unwrap().to_string()
}

/// Poll a session until no switch is translating.
async fn settled_session(app: &Router, id: &str) -> Value {
    for _ in 0..100 {
        let resp = app
            .clone()
            .oneshot(get(&format!("/api/sessions/{}", id)))
            .await
            .unwrap();
        let json = body_json(resp).await;
        if json["translating"] == false {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("translation did not settle");
}

fn contents(messages: &Value) -> Vec<String> {
    messages
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Service endpoints
// =============================================================================

#[tokio::test]
async fn test_root_banner() {
    let app = make_keyless_app();
    let resp = app.oneshot(get("/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["status"], "ok");
    let endpoints = json["endpoints"].as_array().unwrap();
    assert!(endpoints
        .iter()
        .any(|e| e.as_str().unwrap().starts_with("POST /api/stt")));
}

#[tokio::test]
async fn test_health_reports_api_key() {
    let resp = make_app().await.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["hasApiKey"], true);
    let health: HealthResponse = serde_json::from_value(json).unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.sessions, 0);

    let resp = make_keyless_app().oneshot(get("/api/health")).await.unwrap();
    assert_eq!(body_json(resp).await["hasApiKey"], false);
}

#[tokio::test]
async fn test_languages_lists_supported_table() {
    let resp = make_keyless_app()
        .oneshot(get("/api/languages"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    let languages = json["languages"].as_array().unwrap();
    assert_eq!(languages.len(), 23);
    let odia = languages.iter().find(|l| l["code"] == "or").unwrap();
    assert_eq!(odia["provider_code"], "od-IN");
}

#[tokio::test]
async fn test_widget_config_never_exposes_key() {
    let app = make_app().await;
    let resp = app.oneshot(get("/api/widget/config")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert!(!json.to_string().contains(TEST_KEY));
    assert_eq!(json["widget"]["position"], "bottom-right");
    assert_eq!(json["languages"][1]["name"], "Hindi");
}

// =============================================================================
// Relay
// =============================================================================

#[tokio::test]
async fn test_relay_translate_passes_through() {
    let app = make_app().await;
    let resp = app
        .oneshot(post_json(
            "/api/translate",
            json!({"input": "Hello", "source_language_code": "en-IN", "target_language_code": "hi-IN"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["translated_text"], "[hi-IN] Hello");
}

#[tokio::test]
async fn test_relay_chat_passes_through() {
    let app = make_app().await;
    let resp = app
        .oneshot(post_json(
            "/api/chat",
            json!({"model": "sarvam-m", "messages": [{"role": "user", "content": "Hi"}]}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["choices"][0]["message"]["content"], "Echo: Hi");
}

#[tokio::test]
async fn test_relay_tts_and_language_id() {
    let app = make_app().await;

    let resp = app
        .clone()
        .oneshot(post_json("/api/tts", json!({"text": "hi", "custom": 1})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    // Body forwarded unmodified.
    assert_eq!(json["echo"], json!({"text": "hi", "custom": 1}));

    let resp = app
        .oneshot(post_json("/api/language-id", json!({"input": "नमस्ते"})))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["language_code"], "hi-IN");
}

#[tokio::test]
async fn test_relay_upstream_error_is_bad_gateway() {
    let app = make_app().await;
    let resp = app
        .oneshot(post_json("/api/translate", json!({"input": "fail"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

    let json = body_json(resp).await;
    assert_eq!(json["error"], "bad_gateway");
    assert_eq!(json["details"]["upstream_status"], 500);
    assert!(json["message"].as_str().unwrap().contains("boom"));
}

#[tokio::test]
async fn test_relay_without_key_is_unavailable() {
    let resp = make_keyless_app()
        .oneshot(post_json("/api/chat", json!({"messages": []})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(resp).await["error"], "service_unavailable");
}

#[tokio::test]
async fn test_stt_requires_file() {
    let app = make_app().await;
    let resp = app
        .oneshot(multipart_request(
            "/api/stt",
            &[("language_code", None, &b"hi-IN"[..])],
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "No audio file provided");
}

#[tokio::test]
async fn test_stt_forwards_multipart() {
    let app = make_app().await;
    let resp = app
        .oneshot(multipart_request(
            "/api/stt",
            &[
                ("file", Some("clip.webm"), &[0u8; 32][..]),
                ("language_code", None, &b"ta-IN"[..]),
            ],
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await["transcript"],
        "file=clip.webm type=audio/webm len=32;language_code=ta-IN"
    );
}

#[tokio::test]
async fn test_stt_defaults_language() {
    let app = make_app().await;
    let resp = app
        .oneshot(multipart_request(
            "/api/stt",
            &[("file", Some("a.wav"), &b"RIFF"[..])],
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let transcript = body_json(resp).await["transcript"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(transcript.ends_with("language_code=en-IN"));
}

// =============================================================================
// Widget sessions
// =============================================================================

#[tokio::test]
async fn test_session_lifecycle() {
    let app = make_app().await;
    let id = create_session(&app).await;

    let resp = app
        .clone()
        .oneshot(get(&format!("/api/sessions/{}", id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["language"], "en");
    assert_eq!(contents(&json["chat"]), vec!["ctx"]);
    assert_eq!(contents(&json["voice"]), vec!["ctx"]);

    let resp = app
        .clone()
        .oneshot(delete(&format!("/api/sessions/{}", id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app
        .oneshot(get(&format!("/api/sessions/{}", id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["error"], "not_found");
}

#[tokio::test]
async fn test_invalid_session_id_is_bad_request() {
    let resp = make_keyless_app()
        .oneshot(get("/api/sessions/not-a-uuid"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_send_message_uses_provider() {
    let app = make_app().await;
    let id = create_session(&app).await;

    let resp = app
        .clone()
        .oneshot(post_json(
            &format!("/api/sessions/{}/messages", id),
            json!({"mode": "voice", "text": "Hello"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let reply = body_json(resp).await;
    assert_eq!(reply["message"]["content"], "Echo: Hello");
    assert_eq!(reply["fallback"], false);
    assert_eq!(reply["speak"], true);

    let json = settled_session(&app, &id).await;
    assert_eq!(contents(&json["voice"]), vec!["ctx", "Hello", "Echo: Hello"]);
    assert_eq!(contents(&json["chat"]), vec!["ctx"]);
}

#[tokio::test]
async fn test_send_message_falls_back_without_key() {
    let app = make_keyless_app();
    let id = create_session(&app).await;

    let resp = app
        .oneshot(post_json(
            &format!("/api/sessions/{}/messages", id),
            json!({"text": "Hello"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let reply = body_json(resp).await;
    assert_eq!(reply["fallback"], true);
    assert_eq!(reply["mode"], "chat");
    assert!(!reply["message"]["content"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_send_empty_message_rejected() {
    let app = make_app().await;
    let id = create_session(&app).await;

    let resp = app
        .oneshot(post_json(
            &format!("/api/sessions/{}/messages", id),
            json!({"text": "  "}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "message cannot be empty");
}

#[tokio::test]
async fn test_language_switch_translates_history() {
    let app = make_app().await;
    let id = create_session(&app).await;

    for text in ["Hello", "fail"] {
        let resp = app
            .clone()
            .oneshot(post_json(
                &format!("/api/sessions/{}/messages", id),
                json!({"text": text}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = app
        .clone()
        .oneshot(put_json(
            &format!("/api/sessions/{}/language", id),
            json!({"language": "hi"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let change: LanguageChangeResponse = serde_json::from_value(body_json(resp).await).unwrap();
    assert_eq!(change.language, "hi");
    assert_eq!(change.previous_language, "en");

    let json = settled_session(&app, &id).await;
    assert_eq!(json["language"], "hi");
    assert_eq!(
        contents(&json["chat"]),
        vec![
            "ctx",
            "[hi-IN] Hello",
            "[hi-IN] Echo: Hello",
            // The provider rejects this one, so it stays as it was.
            "fail",
            "[hi-IN] Echo: fail",
        ]
    );
    // Voice transcript has only its system message and is left alone.
    assert_eq!(contents(&json["voice"]), vec!["ctx"]);
}

#[tokio::test]
async fn test_same_language_switch_is_noop() {
    let app = make_app().await;
    let id = create_session(&app).await;
    app.clone()
        .oneshot(post_json(
            &format!("/api/sessions/{}/messages", id),
            json!({"text": "Hello"}),
        ))
        .await
        .unwrap();

    let resp = app
        .clone()
        .oneshot(put_json(
            &format!("/api/sessions/{}/language", id),
            json!({"language": "en"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    assert_eq!(body_json(resp).await["translating"], false);

    let json = settled_session(&app, &id).await;
    assert_eq!(contents(&json["chat"]), vec!["ctx", "Hello", "Echo: Hello"]);
}

#[tokio::test]
async fn test_language_switch_requires_language() {
    let app = make_app().await;
    let id = create_session(&app).await;
    let resp = app
        .oneshot(put_json(
            &format!("/api/sessions/{}/language", id),
            json!({"language": ""}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reset_clears_transcript() {
    let app = make_app().await;
    let id = create_session(&app).await;
    app.clone()
        .oneshot(post_json(
            &format!("/api/sessions/{}/messages", id),
            json!({"text": "Hello"}),
        ))
        .await
        .unwrap();

    let resp = app
        .oneshot(post_json(
            &format!("/api/sessions/{}/reset", id),
            json!({"mode": "chat"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(contents(&body_json(resp).await["chat"]), vec!["ctx"]);
}

#[tokio::test]
async fn test_unknown_session_message_is_not_found() {
    let app = make_keyless_app();
    let resp = app
        .oneshot(post_json(
            "/api/sessions/550e8400-e29b-41d4-a716-446655440000/messages",
            json!({"text": "hi"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
