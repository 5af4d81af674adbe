//! Action dispatcher.
//!
//! Translates a user-confirmed command into exactly one HTTP call against
//! a deterministic action URL. The dispatcher never mutates topology
//! state: the action's effect becomes visible on the next poll tick. The
//! backend may silently not complete an action; no acknowledgement wait
//! is added here.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use common::errors::{AppError, AppResult};

use crate::api::ApiClient;
use crate::notify::Notifier;
use crate::session::SessionStore;

/// One-shot commands the dashboard can send to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Planned master switchover.
    Switchover,
    /// Forced failover to a new master.
    Failover,
    /// Rolling restart of the cluster.
    RollingRestart,
    /// Rolling re-provision of the cluster.
    RollingReprov,
    /// Route traffic to the cluster.
    StartTraffic,
    /// Stop routing traffic to the cluster.
    StopTraffic,
    /// Provision cluster resources.
    Provision,
    /// Tear provisioned resources down.
    Unprovision,
    /// Start one database server.
    Start,
    /// Stop one database server.
    Stop,
    /// Toggle maintenance mode on one database server.
    Maintenance,
}

impl Action {
    /// Action name as it appears in the URL.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Switchover => "switchover",
            Action::Failover => "failover",
            Action::RollingRestart => "rolling",
            Action::RollingReprov => "reprov",
            Action::StartTraffic => "start-traffic",
            Action::StopTraffic => "stop-traffic",
            Action::Provision => "provision",
            Action::Unprovision => "unprovision",
            Action::Start => "start",
            Action::Stop => "stop",
            Action::Maintenance => "maintenance",
        }
    }

    /// Deterministic URL path for this action and target.
    pub fn path(&self, target: &ActionTarget) -> String {
        match target.server_id {
            Some(id) => format!(
                "/api/clusters/{}/servers/{}/actions/{}",
                target.cluster,
                id,
                self.as_str()
            ),
            None => format!("/api/clusters/{}/actions/{}", target.cluster, self.as_str()),
        }
    }

    /// Confirmation prompt shown before the action is issued.
    pub fn describe(&self, target: &ActionTarget) -> String {
        match target.server_id {
            Some(id) => format!(
                "Confirm {} on server {} of cluster {}?",
                self.as_str(),
                id,
                target.cluster
            ),
            None => format!("Confirm {} on cluster {}?", self.as_str(), target.cluster),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What an action is aimed at: a cluster, optionally one of its servers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionTarget {
    /// Cluster name.
    pub cluster: String,
    /// Server id within the cluster, for server-scoped actions.
    pub server_id: Option<u64>,
}

impl ActionTarget {
    /// Targets a whole cluster.
    pub fn cluster(name: impl Into<String>) -> Self {
        Self {
            cluster: name.into(),
            server_id: None,
        }
    }

    /// Targets one server of a cluster.
    pub fn server(name: impl Into<String>, id: u64) -> Self {
        Self {
            cluster: name.into(),
            server_id: Some(id),
        }
    }
}

/// Blocking user acknowledgement, the browser-`confirm()` analogue.
pub trait Confirm: Send + Sync {
    /// Returns whether the user accepted the prompt.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Confirms everything; for headless use and tests.
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Result of a dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The user declined the confirmation; nothing was issued.
    Declined,
    /// The call was issued and the backend accepted it.
    Issued,
    /// The call was issued and failed; surfaced as a toast only.
    Failed,
}

/// Dispatcher seam, for view layers and tests.
#[async_trait]
pub trait ActionDispatch: Send + Sync {
    /// Confirms and issues one action against its target.
    async fn dispatch(&self, action: Action, target: ActionTarget) -> AppResult<DispatchOutcome>;
}

/// The production dispatcher.
pub struct ActionDispatcher {
    api: Arc<ApiClient>,
    session: Arc<SessionStore>,
    notifier: Notifier,
    confirm: Arc<dyn Confirm>,
    /// Scoped loading flags: one entry per action+target in flight.
    in_flight: Mutex<HashSet<String>>,
}

impl ActionDispatcher {
    /// Creates a dispatcher.
    pub fn new(
        api: Arc<ApiClient>,
        session: Arc<SessionStore>,
        notifier: Notifier,
        confirm: Arc<dyn Confirm>,
    ) -> Self {
        Self {
            api,
            session,
            notifier,
            confirm,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    fn key(action: Action, target: &ActionTarget) -> String {
        match target.server_id {
            Some(id) => format!("{}:{}:{}", target.cluster, id, action.as_str()),
            None => format!("{}:{}", target.cluster, action.as_str()),
        }
    }
}

#[async_trait]
impl ActionDispatch for ActionDispatcher {
    async fn dispatch(&self, action: Action, target: ActionTarget) -> AppResult<DispatchOutcome> {
        if !self.confirm.confirm(&action.describe(&target)) {
            tracing::debug!(action = %action, cluster = %target.cluster, "Action declined");
            return Ok(DispatchOutcome::Declined);
        }

        let key = Self::key(action, &target);
        {
            let mut in_flight = self.in_flight.lock().await;
            if !in_flight.insert(key.clone()) {
                return Err(AppError::ActionInFlight(key));
            }
        }

        let path = action.path(&target);
        tracing::info!(action = %action, path = %path, "Dispatching action");
        let result = self.api.trigger(&path).await;

        self.in_flight.lock().await.remove(&key);

        match result {
            Ok(()) => {
                self.notifier
                    .success(format!("{action} requested on {}", target.cluster));
                Ok(DispatchOutcome::Issued)
            }
            Err(err) if err.is_auth_expiry() => {
                self.session.invalidate(&err.to_string()).await;
                Ok(DispatchOutcome::Failed)
            }
            Err(err) => {
                tracing::warn!(action = %action, error = %err, "Action call failed");
                self.notifier
                    .error(format!("{action} on {} failed: {err}", target.cluster));
                Ok(DispatchOutcome::Failed)
            }
        }
    }
}
