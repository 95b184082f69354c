//! Vaani API crate - axum HTTP server and route handlers.
//!
//! Serves the provider relay used by the embeddable widget (chat, speech,
//! translation, language identification) and the widget session endpoints
//! that keep chat and voice transcripts in the active language.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
