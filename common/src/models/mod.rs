//! Shared data models for the dashboard client.

pub mod alert;
pub mod auth;
pub mod cluster;
pub mod monitor;
pub mod proxy;
pub mod refresh;
pub mod server;

// Re-export commonly used types
pub use alert::{Alert, AlertList};
pub use auth::{LoginRequest, LoginResponse, Session};
pub use cluster::{ClusterConfig, ClusterDetail, ClusterSummary};
pub use monitor::MonitorInfo;
pub use proxy::ProxyRecord;
pub use refresh::RefreshConfig;
pub use server::{ReplicationLink, ServerRecord, ServerState};
