//! Cluster models.
//!
//! Snapshot types for the cluster list and the selected-cluster detail.
//! Every field mirrors what the remote API returns; slices are replaced
//! wholesale on each fetch, never patched.

use serde::{Deserialize, Serialize};

/// Cluster-level configuration as reported by the remote API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Orchestrator in charge of provisioning (e.g. "opensvc", "onpremise").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orchestrator: Option<String>,
    /// Whether automatic failover is enabled.
    #[serde(default)]
    pub interactive: bool,
    /// Replication checks enabled.
    #[serde(default)]
    pub check_repl_filter: bool,
    /// Configured failover time limit in seconds.
    #[serde(default)]
    pub failover_time_limit: u64,
    /// Additional configuration entries not modeled explicitly.
    #[serde(flatten)]
    pub extra: std::collections::HashMap<String, serde_json::Value>,
}

/// One cluster as it appears in the cluster list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterSummary {
    /// Cluster name (unique).
    pub name: String,
    /// Replication topology (e.g. "master-slave", "multi-master").
    #[serde(default)]
    pub topology: String,
    /// Cluster configuration block.
    #[serde(default)]
    pub config: ClusterConfig,
    /// Database server addresses.
    #[serde(default)]
    pub db_servers: Vec<String>,
    /// Proxy server addresses.
    #[serde(default)]
    pub proxy_servers: Vec<String>,
    /// Whether the cluster is currently down.
    #[serde(default)]
    pub is_down: bool,
    /// Whether the cluster is being provisioned.
    #[serde(default)]
    pub is_provision: bool,
    /// Human-readable uptime as computed by the backend.
    #[serde(default)]
    pub uptime: String,
}

/// Full detail for the selected cluster.
///
/// Superset of [`ClusterSummary`]; fetched only while a cluster is
/// selected and cleared when the selection changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterDetail {
    /// Summary fields, flattened into the same JSON object.
    #[serde(flatten)]
    pub summary: ClusterSummary,
    /// Monitoring agents attached to this cluster.
    #[serde(default)]
    pub agents: Vec<String>,
    /// Free-form tags attached to this cluster.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Whether query/traffic capture is enabled.
    #[serde(default)]
    pub capture: bool,
    /// Currently active master address, if elected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_decodes_with_missing_fields() {
        let summary: ClusterSummary =
            serde_json::from_str(r#"{"name":"prod"}"#).expect("decode");
        assert_eq!(summary.name, "prod");
        assert!(!summary.is_down);
        assert!(summary.db_servers.is_empty());
    }

    #[test]
    fn test_detail_flattens_summary() {
        let detail: ClusterDetail = serde_json::from_str(
            r#"{"name":"prod","topology":"master-slave","tags":["ssl"],"master":"db1:3306"}"#,
        )
        .expect("decode");
        assert_eq!(detail.summary.name, "prod");
        assert_eq!(detail.summary.topology, "master-slave");
        assert_eq!(detail.master.as_deref(), Some("db1:3306"));
    }
}
