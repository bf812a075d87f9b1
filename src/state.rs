//! Application state: the in-memory session store, prompts, and the gateway.
//!
//! This module owns:
//!   - the session map (id -> state machine), memory-only
//!   - the prompts struct (from TOML or defaults)
//!   - the optional AI gateway, built once at startup and injected everywhere
//!
//! The gateway is a field, never a global: handlers reach it through the
//! shared state they were constructed with.

use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::{load_game_config_from_env, Prompts};
use crate::domain::Language;
use crate::gateway::Gateway;
use crate::languages::find_language;
use crate::session::{Session, SessionError};

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<RwLock<HashMap<String, Session>>>,
    pub gateway: Option<Gateway>,
    pub prompts: Prompts,
}

impl AppState {
    /// Build state from env: load config and init the gateway.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let prompts = load_game_config_from_env()
            .map(|c| c.prompts)
            .unwrap_or_default();

        let gateway = Gateway::from_env();
        match &gateway {
            Some(gw) => {
                info!(target: "translingo_backend", mode = gw.mode(), "AI gateway enabled.")
            }
            None => info!(
                target: "translingo_backend",
                "AI gateway disabled (no GEMINI_API_KEY / TRANSLINGO_PROXY_URL)."
            ),
        }

        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            gateway,
            prompts,
        }
    }

    /// The gateway, or the one-shot Configuration error when no credential
    /// was present at startup.
    pub fn gateway(&self) -> Result<&Gateway, SessionError> {
        self.gateway.as_ref().ok_or(SessionError::Configuration)
    }

    /// Create a session for a language pair. Fails fast when the codes are
    /// unknown, equal, or no gateway credential is configured.
    #[instrument(level = "info", skip(self))]
    pub async fn create_session(
        &self,
        source_code: &str,
        target_code: &str,
    ) -> Result<String, SessionError> {
        self.gateway()?;
        let source = lookup(source_code)?;
        let target = lookup(target_code)?;

        let id = Uuid::new_v4().to_string();
        let session = Session::new(id.clone(), source, target)?;
        self.sessions.write().await.insert(id.clone(), session);
        info!(target: "session", %id, "Session created");
        Ok(id)
    }

    /// Run a closure against one session under the write lock. The lock is
    /// only held for the closure; gateway awaits happen outside it.
    pub async fn with_session<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Session) -> T,
    ) -> Result<T, SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id).ok_or(SessionError::UnknownSession)?;
        Ok(f(session))
    }
}

pub fn lookup(code: &str) -> Result<Language, SessionError> {
    find_language(code).ok_or_else(|| SessionError::UnknownLanguage(code.to_string()))
}
