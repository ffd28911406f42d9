use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::{
    application::models::{
        page::Page,
        review::{Answer, Question, Review, ReviewUpsert},
    },
    error::ApiError,
    transport::http_client::ApiHttpClient,
};

#[async_trait]
pub trait ReviewService: Send + Sync {
    /// Root reviews of a course, replies embedded, paginated.
    async fn reviews_by_course(
        &self,
        course_id: i64,
        page: Option<u32>,
    ) -> Result<Page<Review>, ApiError>;

    /// The backend allows one root review per learner per course; a second
    /// one comes back as a 400.
    async fn create_review(&self, review: &ReviewUpsert) -> Result<Review, ApiError>;

    async fn update_review(&self, id: i64, review: &ReviewUpsert) -> Result<Review, ApiError>;

    async fn delete_review(&self, id: i64) -> Result<(), ApiError>;

    async fn list_questions(&self, course_id: i64) -> Result<Page<Question>, ApiError>;

    async fn create_question(&self, course_id: i64, content: &str) -> Result<Question, ApiError>;

    async fn list_answers(&self, question_id: i64) -> Result<Page<Answer>, ApiError>;

    async fn create_answer(&self, question_id: i64, content: &str) -> Result<Answer, ApiError>;
}

pub struct ReviewServiceImpl {
    client: Arc<ApiHttpClient>,
}

impl ReviewServiceImpl {
    pub fn new(client: Arc<ApiHttpClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReviewService for ReviewServiceImpl {
    async fn reviews_by_course(
        &self,
        course_id: i64,
        page: Option<u32>,
    ) -> Result<Page<Review>, ApiError> {
        let path = match page {
            Some(page) => format!("/api/reviews/by-course/{course_id}/?page={page}"),
            None => format!("/api/reviews/by-course/{course_id}/"),
        };
        self.client.get(&path).await
    }

    async fn create_review(&self, review: &ReviewUpsert) -> Result<Review, ApiError> {
        info!("Creating review for course {}", review.course);
        self.client.post("/api/reviews/", review).await
    }

    async fn update_review(&self, id: i64, review: &ReviewUpsert) -> Result<Review, ApiError> {
        self.client.put(&format!("/api/reviews/{id}/"), review).await
    }

    async fn delete_review(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&format!("/api/reviews/{id}/")).await
    }

    async fn list_questions(&self, course_id: i64) -> Result<Page<Question>, ApiError> {
        self.client
            .get(&format!("/api/questions/?course={course_id}"))
            .await
    }

    async fn create_question(&self, course_id: i64, content: &str) -> Result<Question, ApiError> {
        self.client
            .post(
                "/api/questions/",
                &json!({"course": course_id, "content": content}),
            )
            .await
    }

    async fn list_answers(&self, question_id: i64) -> Result<Page<Answer>, ApiError> {
        self.client
            .get(&format!("/api/answers/?question={question_id}"))
            .await
    }

    async fn create_answer(&self, question_id: i64, content: &str) -> Result<Answer, ApiError> {
        self.client
            .post(
                "/api/answers/",
                &json!({"question": question_id, "content": content}),
            )
            .await
    }
}
