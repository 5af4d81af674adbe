//! Authentication models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request body for the login endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Account name.
    #[validate(length(min = 1, max = 100, message = "Username must be 1-100 characters"))]
    pub username: String,
    /// Account password, sent only to the login endpoint.
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Response body of a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for all subsequent calls.
    pub token: String,
}

/// An authenticated session.
///
/// Created on successful login, persisted in durable client storage, and
/// destroyed on logout or on an authentication-failure response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Account name the session belongs to.
    pub username: String,
    /// Bearer token.
    pub token: String,
    /// When the session was established.
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Creates a session stamped with the current time.
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
            created_at: Utc::now(),
        }
    }
}
