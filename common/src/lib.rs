//! Shared library for the cluster dashboard client.
//!
//! Contains the configuration loader, the error taxonomy, and the data
//! models exchanged with the remote cluster-management API.

pub mod config;
pub mod errors;
pub mod models;
