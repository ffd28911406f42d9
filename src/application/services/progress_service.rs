use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::{
    application::models::{
        course::CourseProgress,
        document::{Document, DocumentCompletion},
        page::Page,
    },
    error::ApiError,
    transport::http_client::ApiHttpClient,
};

#[async_trait]
pub trait ProgressService: Send + Sync {
    /// Enrollment records for the current learner.
    async fn list_progress(&self, page: Option<u32>) -> Result<Page<CourseProgress>, ApiError>;

    async fn get_progress(&self, id: i64) -> Result<CourseProgress, ApiError>;

    /// Documents belonging to one course.
    async fn list_documents(&self, course_id: i64) -> Result<Page<Document>, ApiError>;

    async fn get_document(&self, id: i64) -> Result<Document, ApiError>;

    /// Completion records for the current learner.
    async fn list_completions(&self) -> Result<Page<DocumentCompletion>, ApiError>;

    /// Marks one document complete. The backend recomputes the course
    /// progress percentage as a side effect, so callers should re-fetch
    /// the progress record afterwards rather than patching it locally.
    async fn mark_document_complete(
        &self,
        document_id: i64,
    ) -> Result<DocumentCompletion, ApiError>;
}

pub struct ProgressServiceImpl {
    client: Arc<ApiHttpClient>,
}

impl ProgressServiceImpl {
    pub fn new(client: Arc<ApiHttpClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProgressService for ProgressServiceImpl {
    async fn list_progress(&self, page: Option<u32>) -> Result<Page<CourseProgress>, ApiError> {
        let path = match page {
            Some(page) => format!("/api/course-progress/?page={page}"),
            None => "/api/course-progress/".to_string(),
        };
        self.client.get(&path).await
    }

    async fn get_progress(&self, id: i64) -> Result<CourseProgress, ApiError> {
        self.client.get(&format!("/api/course-progress/{id}/")).await
    }

    async fn list_documents(&self, course_id: i64) -> Result<Page<Document>, ApiError> {
        self.client
            .get(&format!("/api/documents/?course={course_id}"))
            .await
    }

    async fn get_document(&self, id: i64) -> Result<Document, ApiError> {
        self.client.get(&format!("/api/documents/{id}/")).await
    }

    async fn list_completions(&self) -> Result<Page<DocumentCompletion>, ApiError> {
        self.client.get("/api/document-completions/").await
    }

    async fn mark_document_complete(
        &self,
        document_id: i64,
    ) -> Result<DocumentCompletion, ApiError> {
        info!("Marking document {} complete", document_id);
        self.client
            .post(
                "/api/document-completions/",
                &json!({"document": document_id, "is_complete": true}),
            )
            .await
    }
}
