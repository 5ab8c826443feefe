//! Authentication-related models

use serde::{Deserialize, Serialize};

/// The single live bearer credential of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Authorization {
    pub username: String,
    pub token: String,
}

impl Authorization {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
        }
    }
}

/// Login form
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Plain message body, used by `/setup`
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub response: String,
}
