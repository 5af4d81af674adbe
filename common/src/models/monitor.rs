//! Monitor info models.
//!
//! Global state of the remote monitor, fetched alongside the cluster list
//! on every overview poll tick.

use serde::{Deserialize, Serialize};

/// Global monitor information.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorInfo {
    /// Backend version string.
    #[serde(default)]
    pub version: String,
    /// Full version/build description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_version: Option<String>,
    /// Monitor uptime as reported by the backend.
    #[serde(default)]
    pub uptime: String,
    /// Names of all monitored clusters.
    #[serde(default)]
    pub clusters: Vec<String>,
    /// Additional key-value info not modeled explicitly.
    #[serde(flatten)]
    pub extra: std::collections::HashMap<String, serde_json::Value>,
}
