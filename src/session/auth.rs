use serde::{Deserialize, Serialize};

/// Body of `POST /auth/token/`.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

/// Token pair returned by a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Body of `POST /auth/token/refresh/`.
#[derive(Debug, Serialize)]
pub(crate) struct RefreshRequest {
    pub refresh: String,
}

/// `POST /auth/token/refresh/` returns only a new access token; the refresh
/// token stays valid until it expires or is blacklisted.
#[derive(Debug, Deserialize)]
pub(crate) struct RefreshResponse {
    pub access: String,
}

/// Body of `POST /auth/token/blacklist/`.
#[derive(Debug, Serialize)]
pub(crate) struct LogoutRequest {
    pub refresh: String,
}
