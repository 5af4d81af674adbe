//! Refresh scheduler.
//!
//! One repeating poll loop that keeps the topology store current. Each
//! tick issues the fixed batch of read calls for the current scope and
//! schedules the next tick only after every call in the batch has
//! settled, so at most one batch is ever in flight: under a slow backend
//! the cadence stretches, it never piles up. A failed call flips its
//! slice's stale flag without aborting siblings; the polling interval is
//! the only retry throttle.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

use common::errors::AppError;
use common::models::RefreshConfig;

use crate::api::ApiClient;
use crate::session::SessionStore;
use crate::storage::ClientStorage;
use crate::store::TopologyStore;

/// The repeating poll driver.
pub struct RefreshScheduler {
    api: Arc<ApiClient>,
    store: Arc<TopologyStore>,
    session: Arc<SessionStore>,
    storage: ClientStorage,
    prefs: Arc<RwLock<RefreshConfig>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl RefreshScheduler {
    /// Creates a scheduler; the cadence preference is read back from
    /// durable storage.
    pub fn new(
        api: Arc<ApiClient>,
        store: Arc<TopologyStore>,
        session: Arc<SessionStore>,
        storage: ClientStorage,
    ) -> Self {
        let prefs = storage.load().refresh;
        Self {
            api,
            store,
            session,
            storage,
            prefs: Arc::new(RwLock::new(prefs)),
            handle: Mutex::new(None),
        }
    }

    /// Sets the refresh interval; out-of-range input resets to the
    /// default. Returns the interval actually applied, in seconds.
    pub async fn set_interval(&self, seconds: u64) -> u64 {
        let applied = {
            let mut prefs = self.prefs.write().await;
            prefs.set_interval(seconds);
            prefs.interval_seconds
        };
        self.persist_prefs().await;
        tracing::info!(interval_secs = applied, "Refresh interval updated");
        applied
    }

    /// Pauses or resumes polling. Pausing cancels the timer on the next
    /// tick decision; resuming requires `start()`.
    pub async fn set_paused(&self, paused: bool) {
        self.prefs.write().await.paused = paused;
        self.persist_prefs().await;
        tracing::info!(paused, "Refresh pause flag updated");
    }

    /// Current refresh preferences.
    pub async fn prefs(&self) -> RefreshConfig {
        *self.prefs.read().await
    }

    async fn persist_prefs(&self) {
        let prefs = *self.prefs.read().await;
        if let Err(err) = self.storage.update(|state| state.refresh = prefs) {
            tracing::warn!(error = %err, "Failed to persist refresh preference");
        }
    }

    /// Starts the poll loop. A second call while the loop is alive is a
    /// no-op.
    pub async fn start(&self) {
        let mut handle = self.handle.lock().await;
        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }

        let api = self.api.clone();
        let store = self.store.clone();
        let session = self.session.clone();
        let prefs = self.prefs.clone();
        *handle = Some(tokio::spawn(async move {
            loop {
                let current = *prefs.read().await;
                if current.paused {
                    tracing::debug!("Polling paused, timer cancelled");
                    break;
                }
                if !session.is_logged_in().await {
                    tracing::debug!("No session, timer cancelled");
                    break;
                }

                // The batch settles completely before the next tick is
                // scheduled, bounding outstanding requests to one batch.
                run_tick(&api, &store, &session).await;

                let interval = prefs.read().await.interval();
                tokio::time::sleep(interval).await;
            }
        }));
        tracing::debug!("Refresh scheduler started");
    }

    /// Cancels the pending timer and the poll task. Must be called on
    /// navigation away or shutdown so no orphaned task keeps polling;
    /// responses already in flight are discarded by the store's
    /// generation guard.
    pub async fn stop(&self) {
        if let Some(handle) = self.handle.lock().await.take() {
            handle.abort();
            tracing::debug!("Refresh scheduler stopped");
        }
    }

    /// Runs one poll tick: the read batch for the current scope.
    ///
    /// Public so a view can force an immediate refresh between ticks.
    pub async fn tick(&self) {
        run_tick(&self.api, &self.store, &self.session).await;
    }
}

/// One poll tick: the read batch for the current scope.
async fn run_tick(api: &ApiClient, store: &TopologyStore, session: &SessionStore) {
    let generation = store.generation();
    match store.selected() {
        Some(name) => refresh_cluster(api, store, session, generation, &name).await,
        None => refresh_overview(api, store, session, generation).await,
    }
}

/// Overview scope: cluster list + monitor info.
async fn refresh_overview(
    api: &ApiClient,
    store: &TopologyStore,
    session: &SessionStore,
    generation: u64,
) {
    let (clusters, monitor) = tokio::join!(api.clusters(), api.monitor());

    if let Some(status) = auth_expiry(&[clusters.as_ref().err(), monitor.as_ref().err()]) {
        session
            .invalidate(&format!("backend returned HTTP {status}"))
            .await;
        return;
    }

    store.apply_clusters(generation, clusters);
    store.apply_monitor(generation, monitor);
}

/// Cluster scope: detail + servers + alerts + master + proxies for the
/// selected cluster. Calls are unordered relative to each other.
async fn refresh_cluster(
    api: &ApiClient,
    store: &TopologyStore,
    session: &SessionStore,
    generation: u64,
    name: &str,
) {
    let (detail, servers, alerts, master, proxies) = tokio::join!(
        api.cluster(name),
        api.servers(name),
        api.alerts(name),
        api.master(name),
        api.proxies(name),
    );

    if let Some(status) = auth_expiry(&[
        detail.as_ref().err(),
        servers.as_ref().err(),
        alerts.as_ref().err(),
        master.as_ref().err(),
        proxies.as_ref().err(),
    ]) {
        session
            .invalidate(&format!("backend returned HTTP {status}"))
            .await;
        return;
    }

    store.apply_detail(generation, detail);
    store.apply_servers(generation, servers);
    store.apply_alerts(generation, alerts);
    store.apply_master(generation, master);
    store.apply_proxies(generation, proxies);
}

/// Returns the offending status when any batch member reported an
/// expired session.
fn auth_expiry(errors: &[Option<&AppError>]) -> Option<u16> {
    errors.iter().flatten().find_map(|err| match err {
        AppError::AuthExpired(status) => Some(*status),
        _ => None,
    })
}
