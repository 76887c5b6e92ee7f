use crate::config::Config;
use crate::db::DbPool;
use crate::xsrf::XsrfToken;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A logged-in browser session.
#[derive(Clone, Debug)]
pub struct Session {
    pub user_id: i64,
    pub xsrf_token: XsrfToken,
}

/// Server-side session store keyed by the session cookie value.
pub type SessionStore = Arc<Mutex<HashMap<String, Session>>>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Arc<Config>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(db: DbPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn session(&self, token: &str) -> Option<Session> {
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(token)
            .cloned()
    }

    pub fn start_session(&self, token: String, session: Session) {
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(token, session);
    }

    pub fn end_session(&self, token: &str) -> Option<Session> {
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(token)
    }
}
