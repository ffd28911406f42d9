use crate::application::models::user::User;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Image URL; empty string when the course has no image.
    #[serde(default)]
    pub image: String,
    pub instructor: User,
    /// Decimal amount, serialized by the backend as a string.
    pub price: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    /// Tag names, flattened by the serializer.
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body for creating or updating a course.
#[derive(Debug, Clone, Serialize)]
pub struct CourseUpsert {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<String>,
}

/// A learner's enrollment and completion state for one course.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourseProgress {
    pub id: i64,
    pub student: User,
    pub course: Course,
    pub enrolled_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Percentage in `0..=100`, recomputed server-side from document
    /// completions.
    pub progress: f64,
    pub is_completed: bool,
    pub updated_at: DateTime<Utc>,
}
