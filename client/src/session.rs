//! Session management.
//!
//! Holds the authenticated session, keeps it in durable client storage,
//! and owns the forced-logout path taken when any authenticated call
//! reports an expired session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use validator::Validate;

use common::errors::AppResult;
use common::models::{LoginRequest, Session};

use crate::api::ApiClient;
use crate::notify::Notifier;
use crate::storage::ClientStorage;
use crate::store::TopologyStore;

/// Session holder shared by the scheduler and the action dispatcher.
pub struct SessionStore {
    api: Arc<ApiClient>,
    store: Arc<TopologyStore>,
    storage: ClientStorage,
    notifier: Notifier,
    session: RwLock<Option<Session>>,
    /// Set once a forced logout has been announced; concurrent failing
    /// calls must not announce it again.
    invalidated: AtomicBool,
}

impl SessionStore {
    /// Creates a session store with no active session.
    pub fn new(
        api: Arc<ApiClient>,
        store: Arc<TopologyStore>,
        storage: ClientStorage,
        notifier: Notifier,
    ) -> Self {
        Self {
            api,
            store,
            storage,
            notifier,
            session: RwLock::new(None),
            invalidated: AtomicBool::new(false),
        }
    }

    /// Restores a previously persisted session, if one is held.
    pub async fn restore(&self) -> bool {
        let state = self.storage.load();
        let (Some(token), Some(username)) = (state.token, state.username) else {
            return false;
        };
        let session = Session::new(username, token);
        self.api.set_token(Some(session.token.clone()));
        tracing::info!(username = %session.username, "Session restored from storage");
        *self.session.write().await = Some(session);
        self.invalidated.store(false, Ordering::SeqCst);
        true
    }

    /// Logs in with credentials and persists the session.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<()> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        request.validate()?;

        let response = self.api.login(&request).await?;
        self.install(Session::new(username, response.token)).await?;
        Ok(())
    }

    /// Logs in against the git-backed account endpoint.
    pub async fn login_git(&self, username: &str, password: &str) -> AppResult<()> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        request.validate()?;

        let response = self.api.login_git(&request).await?;
        self.install(Session::new(username, response.token)).await?;
        Ok(())
    }

    async fn install(&self, session: Session) -> AppResult<()> {
        self.api.set_token(Some(session.token.clone()));
        self.storage.update(|state| {
            state.token = Some(session.token.clone());
            state.username = Some(session.username.clone());
        })?;
        tracing::info!(username = %session.username, "Logged in");
        *self.session.write().await = Some(session);
        self.invalidated.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// Logs out explicitly: clears the session, the persisted keys, and
    /// every topology slice.
    pub async fn logout(&self) {
        let username = self
            .session
            .write()
            .await
            .take()
            .map(|session| session.username);
        self.api.set_token(None);
        if let Err(err) = self.storage.update(|state| {
            state.token = None;
            state.username = None;
        }) {
            tracing::warn!(error = %err, "Failed to clear persisted session");
        }
        self.store.clear();
        tracing::info!(username = ?username, "Logged out");
    }

    /// Forced logout: taken when any authenticated call reports an
    /// expired session. Announces the logout exactly once, no matter how
    /// many in-flight calls fail concurrently.
    pub async fn invalidate(&self, reason: &str) {
        if self.invalidated.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::warn!(reason, "Session invalidated, returning to login");
        self.logout().await;
        self.notifier
            .error(format!("Session expired: {reason}. Please log in again."));
    }

    /// Whether a session is currently held.
    pub async fn is_logged_in(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Username of the active session.
    pub async fn username(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|session| session.username.clone())
    }
}
