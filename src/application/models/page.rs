use serde::{Deserialize, Serialize};

/// Outcome payload of action endpoints (register, activate, deactivate).
/// Failures arrive as non-2xx responses, so only the success branch is
/// modeled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionMessage {
    pub success: String,
}

/// Paginated list envelope returned by the backend's list endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}
