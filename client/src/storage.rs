//! Durable client storage.
//!
//! The browser-localStorage analogue: one JSON file holding the persisted
//! client state under named keys (bearer token, username, refresh
//! preference, UI-panel flags). Reads are best-effort; a missing or
//! corrupt file yields defaults so the client can always start.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use common::errors::{AppError, AppResult};
use common::models::RefreshConfig;

/// File name of the persisted client state.
const STATE_FILE: &str = "client-state.json";

/// Persisted client state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredState {
    /// Bearer token of the last session, if still held.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Username of the last session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Refresh cadence preference.
    #[serde(default)]
    pub refresh: RefreshConfig,
    /// UI-panel open/closed flags, keyed by panel name.
    #[serde(default)]
    pub panels: HashMap<String, bool>,
}

/// Handle on the durable client state file.
#[derive(Debug, Clone)]
pub struct ClientStorage {
    path: PathBuf,
}

impl ClientStorage {
    /// Creates a storage handle rooted in the given directory.
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(STATE_FILE),
        }
    }

    /// Loads the persisted state, falling back to defaults.
    pub fn load(&self) -> StoredState {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return StoredState::default(),
        };
        match serde_json::from_str(&content) {
            Ok(state) => state,
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "Client state file corrupt, starting from defaults"
                );
                StoredState::default()
            }
        }
    }

    /// Persists the given state, creating the directory if needed.
    pub fn save(&self, state: &StoredState) -> AppResult<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)
                .map_err(|e| AppError::Storage(format!("create {}: {e}", dir.display())))?;
        }
        let content = serde_json::to_string_pretty(state)
            .map_err(|e| AppError::Storage(format!("encode state: {e}")))?;
        std::fs::write(&self.path, content)
            .map_err(|e| AppError::Storage(format!("write {}: {e}", self.path.display())))?;
        Ok(())
    }

    /// Loads, mutates, and persists the state in one step.
    pub fn update<F>(&self, mutate: F) -> AppResult<StoredState>
    where
        F: FnOnce(&mut StoredState),
    {
        let mut state = self.load();
        mutate(&mut state);
        self.save(&state)?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_storage(tag: &str) -> ClientStorage {
        let dir = std::env::temp_dir().join(format!("clusterdash-test-{tag}-{}", std::process::id()));
        ClientStorage::new(&dir)
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let storage = temp_storage("missing");
        let state = storage.load();
        assert!(state.token.is_none());
        assert!(!state.refresh.paused);
    }

    #[test]
    fn test_state_round_trips() {
        let storage = temp_storage("roundtrip");
        storage
            .update(|state| {
                state.token = Some("tok".to_string());
                state.username = Some("admin".to_string());
                state.refresh.set_interval(5);
                state.panels.insert("alerts".to_string(), true);
            })
            .expect("save");

        let state = storage.load();
        assert_eq!(state.token.as_deref(), Some("tok"));
        assert_eq!(state.username.as_deref(), Some("admin"));
        assert_eq!(state.refresh.interval_seconds, 5);
        assert_eq!(state.panels.get("alerts"), Some(&true));
    }

    #[test]
    fn test_clearing_session_keys_keeps_preferences() {
        let storage = temp_storage("clear");
        storage
            .update(|state| {
                state.token = Some("tok".to_string());
                state.refresh.set_interval(30);
            })
            .expect("save");
        storage
            .update(|state| {
                state.token = None;
                state.username = None;
            })
            .expect("clear");

        let state = storage.load();
        assert!(state.token.is_none());
        assert_eq!(state.refresh.interval_seconds, 30);
    }
}
