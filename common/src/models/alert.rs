//! Alert models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single alert raised by the backend monitor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Alert {
    /// Backend error/warning number, when assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    /// Server the alert concerns (`host:port`), when applicable.
    #[serde(default)]
    pub server: String,
    /// Human-readable description.
    #[serde(default)]
    pub desc: String,
    /// When the alert was raised.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<DateTime<Utc>>,
}

/// Alerts for the selected cluster, split by severity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertList {
    /// Active errors.
    #[serde(default)]
    pub errors: Vec<Alert>,
    /// Active warnings.
    #[serde(default)]
    pub warnings: Vec<Alert>,
}

impl AlertList {
    /// Total number of active alerts.
    pub fn len(&self) -> usize {
        self.errors.len() + self.warnings.len()
    }

    /// Whether no alert is active.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}
