//! Cluster/topology state store.
//!
//! An in-memory normalized snapshot of the last successfully fetched
//! cluster state. Setters replace their slice wholesale; a failed fetch
//! leaves prior data untouched and only flips that slice's stale flag.
//! Snapshots are published through a watch channel; the view layer
//! subscribes and re-renders, it never mutates.

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use common::errors::AppResult;
use common::models::{
    AlertList, ClusterDetail, ClusterSummary, MonitorInfo, ProxyRecord, ServerRecord,
};

/// Per-slice stale flags, set when the last fetch of a slice failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaleFlags {
    pub clusters: bool,
    pub monitor: bool,
    pub detail: bool,
    pub servers: bool,
    pub master: bool,
    pub alerts: bool,
    pub proxies: bool,
}

impl StaleFlags {
    /// Whether any slice is stale.
    pub fn any(&self) -> bool {
        self.clusters
            || self.monitor
            || self.detail
            || self.servers
            || self.master
            || self.alerts
            || self.proxies
    }
}

/// One published snapshot of the dashboard state.
#[derive(Debug, Clone, Default)]
pub struct TopologySnapshot {
    /// Last successfully fetched cluster list.
    pub clusters: Option<Vec<ClusterSummary>>,
    /// Last successfully fetched global monitor info.
    pub monitor: Option<MonitorInfo>,
    /// Name of the selected cluster, if any.
    pub selected: Option<String>,
    /// Detail of the selected cluster.
    pub detail: Option<ClusterDetail>,
    /// Database servers of the selected cluster.
    pub servers: Option<Vec<ServerRecord>>,
    /// Elected master of the selected cluster.
    pub master: Option<ServerRecord>,
    /// Active alerts of the selected cluster.
    pub alerts: Option<AlertList>,
    /// Proxies of the selected cluster.
    pub proxies: Option<Vec<ProxyRecord>>,
    /// Stale flags per slice.
    pub stale: StaleFlags,
    /// Monotonic change counter for renderers.
    pub revision: u64,
    /// Selection/lifecycle generation; writes from an older generation
    /// are discarded.
    pub generation: u64,
    /// When the snapshot last changed.
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// The state store. All mutation goes through `send_modify`, so every
/// change is one atomic critical section and no observer can see a
/// half-applied state.
pub struct TopologyStore {
    tx: watch::Sender<TopologySnapshot>,
}

impl Default for TopologyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TopologyStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(TopologySnapshot::default());
        Self { tx }
    }

    /// Subscribes to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<TopologySnapshot> {
        self.tx.subscribe()
    }

    /// Returns a copy of the current snapshot.
    pub fn snapshot(&self) -> TopologySnapshot {
        self.tx.borrow().clone()
    }

    /// Current generation; capture it before issuing a fetch and pass it
    /// back to the `apply_*` setter.
    pub fn generation(&self) -> u64 {
        self.tx.borrow().generation
    }

    /// Name of the selected cluster, if any.
    pub fn selected(&self) -> Option<String> {
        self.tx.borrow().selected.clone()
    }

    /// Selects a cluster and clears every slice that belongs to the
    /// previous selection. Bumps the generation so responses still in
    /// flight for the old selection are discarded on arrival.
    pub fn select_cluster(&self, name: &str) {
        self.tx.send_modify(|snap| {
            snap.selected = Some(name.to_string());
            Self::reset_selection_slices(snap);
            snap.generation += 1;
            snap.revision += 1;
        });
        tracing::debug!(cluster = name, "Cluster selected");
    }

    /// Closes the selected cluster and clears its slices.
    pub fn close_cluster(&self) {
        self.tx.send_modify(|snap| {
            snap.selected = None;
            Self::reset_selection_slices(snap);
            snap.generation += 1;
            snap.revision += 1;
        });
    }

    /// Clears every slice atomically. Called on logout.
    pub fn clear(&self) {
        self.tx.send_modify(|snap| {
            *snap = TopologySnapshot {
                revision: snap.revision + 1,
                generation: snap.generation + 1,
                ..TopologySnapshot::default()
            };
        });
        tracing::debug!("Topology store cleared");
    }

    /// Applies a cluster-list fetch result.
    pub fn apply_clusters(&self, generation: u64, result: AppResult<Vec<ClusterSummary>>) -> bool {
        self.apply(generation, "clusters", |snap| match result {
            Ok(data) => {
                snap.clusters = Some(data);
                snap.stale.clusters = false;
            }
            Err(err) => {
                tracing::warn!(error = %err, "Cluster list fetch failed, keeping last data");
                snap.stale.clusters = true;
            }
        })
    }

    /// Applies a monitor-info fetch result.
    pub fn apply_monitor(&self, generation: u64, result: AppResult<MonitorInfo>) -> bool {
        self.apply(generation, "monitor", |snap| match result {
            Ok(data) => {
                snap.monitor = Some(data);
                snap.stale.monitor = false;
            }
            Err(err) => {
                tracing::warn!(error = %err, "Monitor fetch failed, keeping last data");
                snap.stale.monitor = true;
            }
        })
    }

    /// Applies a selected-cluster detail fetch result.
    pub fn apply_detail(&self, generation: u64, result: AppResult<ClusterDetail>) -> bool {
        self.apply(generation, "detail", |snap| match result {
            Ok(data) => {
                snap.detail = Some(data);
                snap.stale.detail = false;
            }
            Err(err) => {
                tracing::warn!(error = %err, "Cluster detail fetch failed, keeping last data");
                snap.stale.detail = true;
            }
        })
    }

    /// Applies a server-list fetch result.
    pub fn apply_servers(&self, generation: u64, result: AppResult<Vec<ServerRecord>>) -> bool {
        self.apply(generation, "servers", |snap| match result {
            Ok(data) => {
                snap.servers = Some(data);
                snap.stale.servers = false;
            }
            Err(err) => {
                tracing::warn!(error = %err, "Server list fetch failed, keeping last data");
                snap.stale.servers = true;
            }
        })
    }

    /// Applies a master fetch result.
    pub fn apply_master(&self, generation: u64, result: AppResult<ServerRecord>) -> bool {
        self.apply(generation, "master", |snap| match result {
            Ok(data) => {
                snap.master = Some(data);
                snap.stale.master = false;
            }
            Err(err) => {
                tracing::warn!(error = %err, "Master fetch failed, keeping last data");
                snap.stale.master = true;
            }
        })
    }

    /// Applies an alerts fetch result.
    pub fn apply_alerts(&self, generation: u64, result: AppResult<AlertList>) -> bool {
        self.apply(generation, "alerts", |snap| match result {
            Ok(data) => {
                snap.alerts = Some(data);
                snap.stale.alerts = false;
            }
            Err(err) => {
                tracing::warn!(error = %err, "Alerts fetch failed, keeping last data");
                snap.stale.alerts = true;
            }
        })
    }

    /// Applies a proxy-list fetch result.
    pub fn apply_proxies(&self, generation: u64, result: AppResult<Vec<ProxyRecord>>) -> bool {
        self.apply(generation, "proxies", |snap| match result {
            Ok(data) => {
                snap.proxies = Some(data);
                snap.stale.proxies = false;
            }
            Err(err) => {
                tracing::warn!(error = %err, "Proxy list fetch failed, keeping last data");
                snap.stale.proxies = true;
            }
        })
    }

    fn reset_selection_slices(snap: &mut TopologySnapshot) {
        snap.detail = None;
        snap.servers = None;
        snap.master = None;
        snap.alerts = None;
        snap.proxies = None;
        snap.stale.detail = false;
        snap.stale.servers = false;
        snap.stale.master = false;
        snap.stale.alerts = false;
        snap.stale.proxies = false;
    }

    /// Runs one setter inside the atomic critical section. The write is
    /// discarded when the captured generation no longer matches, so a
    /// response arriving after a selection change, clear, or logout is
    /// dropped instead of resurrecting stale state.
    fn apply<F>(&self, generation: u64, slice: &str, f: F) -> bool
    where
        F: FnOnce(&mut TopologySnapshot),
    {
        let mut applied = false;
        self.tx.send_modify(|snap| {
            if snap.generation != generation {
                return;
            }
            f(snap);
            snap.revision += 1;
            snap.refreshed_at = Some(Utc::now());
            applied = true;
        });
        if !applied {
            tracing::debug!(slice, "Discarded fetch result from stale generation");
        }
        applied
    }
}
