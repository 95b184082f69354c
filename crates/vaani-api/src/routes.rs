//! Router setup with all API routes and middleware.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use vaani_core::config::ServerConfig;
use vaani_core::error::VaaniError;

use crate::handlers;
use crate::state::AppState;

/// CORS for the embed script: the configured origins, or any origin when
/// none are configured. Unparseable origins are skipped with a warning.
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    if server.allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = server
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server);
    let body_limit = state.config.server.max_upload_bytes;

    let relay_routes = Router::new()
        .route("/chat", post(handlers::chat))
        .route("/tts", post(handlers::tts))
        .route("/stt", post(handlers::stt))
        .route("/translate", post(handlers::translate))
        .route("/language-id", post(handlers::language_id));

    let session_routes = Router::new()
        .route("/sessions", post(handlers::create_session))
        .route(
            "/sessions/{id}",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/sessions/{id}/messages", post(handlers::send_message))
        .route("/sessions/{id}/language", put(handlers::change_language))
        .route("/sessions/{id}/reset", post(handlers::reset_session));

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/languages", get(handlers::supported_languages))
        .route("/widget/config", get(handlers::widget_config))
        .merge(relay_routes)
        .merge(session_routes);

    Router::new()
        .route("/", get(handlers::root))
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind the configured address and serve until the server stops.
pub async fn start_server(state: AppState) -> Result<(), VaaniError> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| VaaniError::Api(format!("Failed to bind {}: {}", addr, e)))?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, router)
        .await
        .map_err(|e| VaaniError::Api(format!("Server error: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_builds_for_any_and_list() {
        let mut server = ServerConfig::default();
        let _ = cors_layer(&server);

        server.allowed_origins = vec![
            "https://shop.example.com".to_string(),
            "not a header\n".to_string(),
        ];
        let _ = cors_layer(&server);
    }
}
