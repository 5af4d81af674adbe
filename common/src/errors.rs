//! Error types for the dashboard client.
//!
//! One taxonomy for every failure class the client distinguishes. Read-path
//! callers turn these into per-slice stale flags; the action path surfaces
//! them as toasts; auth-expiry forces a logout.

use thiserror::Error;

/// Result alias used throughout the client.
pub type AppResult<T> = Result<T, AppError>;

/// HTTP statuses that force a logout when returned on an authenticated call.
const AUTH_EXPIRY_STATUSES: [u16; 4] = [401, 403, 404, 503];

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Login was rejected by the remote API (bad credentials).
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The remote API rate-limited the request (HTTP 429).
    #[error("Too many attempts, retry later")]
    RateLimited,

    /// An authenticated call came back with a status that invalidates the
    /// session (401/403/404/503). Triggers a forced logout.
    #[error("Session expired or backend unavailable (HTTP {0})")]
    AuthExpired(u16),

    /// No session is held; the call requires a bearer token.
    #[error("Not logged in")]
    NotLoggedIn,

    /// Any other non-success HTTP status.
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// Transport-level failure (DNS, connect, timeout, body read).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body could not be decoded into the expected model.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Durable client storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Input failed validation before any request was issued.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The same action is already in flight for this target.
    #[error("Action already in flight: {0}")]
    ActionInFlight(String),
}

impl AppError {
    /// Maps a non-success status on an authenticated call to an error.
    pub fn from_status(status: u16, url: &str) -> Self {
        if AUTH_EXPIRY_STATUSES.contains(&status) {
            AppError::AuthExpired(status)
        } else if status == 429 {
            AppError::RateLimited
        } else {
            AppError::Http {
                status,
                url: url.to_string(),
            }
        }
    }

    /// Whether this error must clear the session and return to login.
    pub fn is_auth_expiry(&self) -> bool {
        matches!(self, AppError::AuthExpired(_))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}
