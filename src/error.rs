use reqwest::StatusCode;
use std::fmt::{self, Display, Formatter};
use std::io;

/// Errors surfaced by the API client and the session layer.
///
/// `AuthenticationRequired` is the distinguished "session is unrecoverable
/// without user action" signal: callers are expected to send the user back
/// to the login screen when they see it, never to retry.
#[derive(Debug)]
pub enum ApiError {
    /// Transport failure, no HTTP response was obtained.
    Network(reqwest::Error),
    /// The backend answered with a non-2xx status that the client does not
    /// interpret (including a 401 on an already-replayed request).
    Http { status: StatusCode, body: String },
    /// The stored session could not be recovered: the refresh token is
    /// missing or was rejected. Tokens have already been purged.
    AuthenticationRequired,
    /// The response body could not be decoded into the expected type.
    Json(serde_json::Error),
    /// Token storage failure surfaced at initialization.
    Io(io::Error),
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e) => write!(f, "network error: {e}"),
            ApiError::Http { status, body } => {
                write!(f, "http error: status {status}, body: {body}")
            }
            ApiError::AuthenticationRequired => write!(f, "authentication required"),
            ApiError::Json(e) => write!(f, "json error: {e}"),
            ApiError::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Network(e)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Json(e)
    }
}

impl From<io::Error> for ApiError {
    fn from(e: io::Error) -> Self {
        ApiError::Io(e)
    }
}

impl ApiError {
    /// True when the UI layer should redirect to login.
    pub fn is_authentication_required(&self) -> bool {
        matches!(self, ApiError::AuthenticationRequired)
    }

    /// HTTP status of the response, when one was obtained.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
