//! Database server models.
//!
//! One record per database server of the selected cluster, replaced
//! wholesale on every poll tick.

use serde::{Deserialize, Serialize};

/// Role/health state of a database server as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ServerState {
    /// Acting master.
    Master,
    /// Healthy replicating slave.
    Slave,
    /// Reachable but replication is in doubt.
    Suspect,
    /// Unreachable or failed.
    Failed,
    /// Not participating in replication.
    Standalone,
    /// In scheduled maintenance.
    Maintenance,
    /// Any state this client does not model.
    #[serde(other)]
    Unknown,
}

impl Default for ServerState {
    fn default() -> Self {
        ServerState::Unknown
    }
}

impl ServerState {
    /// Whether the server is usable for reads.
    pub fn is_healthy(&self) -> bool {
        matches!(self, ServerState::Master | ServerState::Slave)
    }
}

impl std::fmt::Display for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerState::Master => write!(f, "Master"),
            ServerState::Slave => write!(f, "Slave"),
            ServerState::Suspect => write!(f, "Suspect"),
            ServerState::Failed => write!(f, "Failed"),
            ServerState::Standalone => write!(f, "Standalone"),
            ServerState::Maintenance => write!(f, "Maintenance"),
            ServerState::Unknown => write!(f, "Unknown"),
        }
    }
}

/// One replication stream on a slave.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplicationLink {
    /// Master host this stream replicates from.
    #[serde(default)]
    pub master_host: String,
    /// Master port.
    #[serde(default)]
    pub master_port: u16,
    /// Seconds the slave lags behind the master, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds_behind_master: Option<u64>,
    /// Whether the IO thread is running.
    #[serde(default)]
    pub slave_io_running: bool,
    /// Whether the SQL thread is running.
    #[serde(default)]
    pub slave_sql_running: bool,
}

/// One database server of the selected cluster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerRecord {
    /// Server id (unique within the cluster).
    pub id: u64,
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Current role/health state.
    #[serde(default)]
    pub state: ServerState,
    /// Whether the server currently replicates from a master.
    #[serde(default)]
    pub is_slave: bool,
    /// Active replication streams (empty on a master).
    #[serde(default)]
    pub replications: Vec<ReplicationLink>,
    /// Currently executed GTID set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_gtid: Option<String>,
    /// GTID set retrieved from the master but not yet applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slave_gtid: Option<String>,
    /// Reported server version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ServerRecord {
    /// `host:port` form used in summaries and logs.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
