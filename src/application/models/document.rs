use crate::application::models::course::Course;
use crate::application::models::user::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: i64,
    /// Owning course, exposed by the serializer as a primary key.
    pub course: i64,
    pub title: String,
    /// File URL; empty string when the document is link-only.
    #[serde(default)]
    pub file: String,
    pub uploaded_by: Option<User>,
    pub uploaded_at: DateTime<Utc>,
}

/// A learner's completion record for a single document. Marking one
/// complete makes the backend recompute the owning course's progress.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentCompletion {
    pub id: i64,
    pub user: User,
    pub document: Document,
    pub is_complete: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Timestamped note a learner attaches to a video while watching.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub id: i64,
    pub user: User,
    pub course: Option<Course>,
    pub document: Option<Document>,
    pub video_id: String,
    /// Offset into the video, in seconds.
    pub timestamp: f64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
