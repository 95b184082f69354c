//! Application state shared across all route handlers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use uuid::Uuid;

use vaani_chat::{ChatError, WidgetSession};
use vaani_core::config::VaaniConfig;
use vaani_provider::{ProviderError, SarvamClient};

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration. Read-only once the server is up.
    pub config: Arc<VaaniConfig>,
    /// Provider client used by the relay and by every widget session.
    pub client: Arc<SarvamClient>,
    /// Live widget sessions by ID.
    pub sessions: Arc<Mutex<HashMap<Uuid, Arc<WidgetSession>>>>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: VaaniConfig) -> Result<Self, ProviderError> {
        let client = SarvamClient::new(&config.provider)?;
        Ok(Self {
            config: Arc::new(config),
            client: Arc::new(client),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            start_time: Instant::now(),
        })
    }

    /// Create a widget session from the configured widget defaults.
    pub fn create_session(&self) -> Arc<WidgetSession> {
        let session = Arc::new(WidgetSession::new(
            &self.config.widget,
            self.client.clone(),
            self.client.clone(),
        ));
        self.lock_sessions().insert(session.id(), Arc::clone(&session));
        tracing::info!(session = %session.id(), "Widget session created");
        session
    }

    pub fn session(&self, id: Uuid) -> Result<Arc<WidgetSession>, ChatError> {
        self.lock_sessions()
            .get(&id)
            .cloned()
            .ok_or(ChatError::SessionNotFound(id))
    }

    pub fn remove_session(&self, id: Uuid) -> Result<(), ChatError> {
        match self.lock_sessions().remove(&id) {
            Some(_) => {
                tracing::info!(session = %id, "Widget session closed");
                Ok(())
            }
            None => Err(ChatError::SessionNotFound(id)),
        }
    }

    /// Drop sessions idle for at least `max_idle`. Sessions still
    /// translating are kept. Returns how many were dropped.
    pub fn expire_idle_sessions(&self, max_idle: Duration) -> usize {
        let mut sessions = self.lock_sessions();
        let before = sessions.len();
        sessions.retain(|id, session| {
            let keep = session.is_translating() || session.idle_for() < max_idle;
            if !keep {
                tracing::info!(session = %id, "Widget session expired");
            }
            keep
        });
        before - sessions.len()
    }

    pub fn session_count(&self) -> usize {
        self.lock_sessions().len()
    }

    fn lock_sessions(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Arc<WidgetSession>>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
