use crate::application::models::user::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Course review; replies carry the parent review's id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: i64,
    pub course: i64,
    pub user: User,
    /// 0 to 5 stars; absent on reply reviews.
    pub rating: Option<u8>,
    pub comment: Option<String>,
    pub parent_review: Option<i64>,
    pub created_at: DateTime<Utc>,
    /// Replies, embedded by the by-course listing; empty elsewhere.
    #[serde(default)]
    pub replies: Vec<Review>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewUpsert {
    pub course: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_review: Option<i64>,
}

/// A question opens a discussion thread on a course.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub id: i64,
    pub course: i64,
    pub asked_by: Option<User>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Reply within a question thread, either from a person or the integrated
/// assistant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    pub id: i64,
    pub question: i64,
    pub answered_by: Option<User>,
    pub content: String,
    pub is_ai: bool,
    pub parent: Option<i64>,
    pub created_at: DateTime<Utc>,
}
