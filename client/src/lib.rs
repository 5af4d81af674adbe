//! Cluster dashboard client core.
//!
//! Keeps a local view of a remote, continuously-changing cluster topology
//! current by polling the cluster-management REST API, and drives
//! user-confirmed one-shot actions against it.
//!
//! ## Architecture
//!
//! ```text
//! RefreshScheduler ──> ApiClient ──HTTP──> remote cluster-management API
//!        │                                        │
//!        └──> TopologyStore <── fetch results ────┘
//!                  │ watch
//!                  └──> subscribers (view layer)
//!
//! ActionDispatcher ──> ApiClient   (effect visible on the next poll tick)
//! ```
//!
//! The scheduler issues one batch of read calls per tick and schedules the
//! next tick only after the whole batch has settled, so at most one batch
//! is ever in flight. The store replaces slices wholesale and publishes
//! snapshots through a watch channel; the view layer owns no business
//! logic. Actions are fire-and-forget: the dashboard becomes consistent
//! with the backend on the next tick, not on action completion.

pub mod actions;
pub mod api;
pub mod notify;
pub mod scheduler;
pub mod session;
pub mod storage;
pub mod store;
