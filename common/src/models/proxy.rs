//! Proxy server models.

use serde::{Deserialize, Serialize};

/// One proxy in front of the selected cluster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyRecord {
    /// Proxy id (unique within the cluster).
    pub id: u64,
    /// Proxy kind (e.g. "haproxy", "proxysql", "maxscale").
    #[serde(default)]
    pub kind: String,
    /// Proxy host.
    pub host: String,
    /// Proxy port.
    pub port: u16,
    /// Health state as reported by the backend.
    #[serde(default)]
    pub state: String,
    /// Read/write port, when the proxy splits traffic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_port: Option<u16>,
}
