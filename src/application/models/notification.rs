use crate::application::models::user::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    PaymentSuccess,
    PaymentFailed,
    CourseEnrollment,
    Warning,
    Reminder,
    Update,
}

/// Broadcast notification, optionally scoped to a course.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: i64,
    pub course: Option<i64>,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Per-recipient delivery record with its read state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserNotification {
    pub id: i64,
    pub user: User,
    pub notification: Notification,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Payload of the unread-count endpoint, the target of the 30-second
/// notification poller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnreadCount {
    pub unread_count: u64,
}
