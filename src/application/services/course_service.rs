use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::{
    application::models::{
        course::{Course, CourseUpsert, Tag},
        page::{ActionMessage, Page},
    },
    error::ApiError,
    transport::http_client::ApiHttpClient,
};

#[async_trait]
pub trait CourseService: Send + Sync {
    /// Paginated course catalog, optionally filtered by a search term.
    async fn list_courses(
        &self,
        page: Option<u32>,
        search: Option<&str>,
    ) -> Result<Page<Course>, ApiError>;

    async fn get_course(&self, id: i64) -> Result<Course, ApiError>;

    async fn create_course(&self, course: &CourseUpsert) -> Result<Course, ApiError>;

    async fn update_course(&self, id: i64, course: &CourseUpsert) -> Result<Course, ApiError>;

    async fn delete_course(&self, id: i64) -> Result<(), ApiError>;

    /// Top courses by enrollments over the last week.
    async fn hot_courses(&self) -> Result<Vec<Course>, ApiError>;

    /// Tag-based recommendations for the current user; empty when
    /// unauthenticated.
    async fn suggested_courses(&self) -> Result<Vec<Course>, ApiError>;

    /// Enrolls the current learner. The backend rejects a second
    /// registration for the same course with a 400.
    async fn register(&self, course_id: i64) -> Result<ActionMessage, ApiError>;

    async fn deactivate(&self, course_id: i64) -> Result<ActionMessage, ApiError>;

    async fn list_tags(&self) -> Result<Page<Tag>, ApiError>;
}

pub struct CourseServiceImpl {
    client: Arc<ApiHttpClient>,
}

impl CourseServiceImpl {
    pub fn new(client: Arc<ApiHttpClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CourseService for CourseServiceImpl {
    async fn list_courses(
        &self,
        page: Option<u32>,
        search: Option<&str>,
    ) -> Result<Page<Course>, ApiError> {
        let mut path = String::from("/api/courses/");
        let mut params = Vec::new();
        if let Some(page) = page {
            params.push(format!("page={page}"));
        }
        if let Some(search) = search {
            params.push(format!("search={search}"));
        }
        if !params.is_empty() {
            path = format!("{}?{}", path, params.join("&"));
        }

        let result: Page<Course> = self.client.get(&path).await?;
        debug!("Fetched {} of {} courses", result.results.len(), result.count);
        Ok(result)
    }

    async fn get_course(&self, id: i64) -> Result<Course, ApiError> {
        self.client.get(&format!("/api/courses/{id}/")).await
    }

    async fn create_course(&self, course: &CourseUpsert) -> Result<Course, ApiError> {
        info!("Creating course: {}", course.title);
        self.client.post("/api/courses/", course).await
    }

    async fn update_course(&self, id: i64, course: &CourseUpsert) -> Result<Course, ApiError> {
        self.client
            .put(&format!("/api/courses/{id}/"), course)
            .await
    }

    async fn delete_course(&self, id: i64) -> Result<(), ApiError> {
        info!("Deleting course {}", id);
        self.client.delete(&format!("/api/courses/{id}/")).await
    }

    async fn hot_courses(&self) -> Result<Vec<Course>, ApiError> {
        self.client.get("/api/courses/hot/").await
    }

    async fn suggested_courses(&self) -> Result<Vec<Course>, ApiError> {
        self.client.get("/api/courses/suggested/").await
    }

    async fn register(&self, course_id: i64) -> Result<ActionMessage, ApiError> {
        info!("Registering for course {}", course_id);
        self.client
            .post(
                &format!("/api/courses/{course_id}/register/"),
                &serde_json::json!({}),
            )
            .await
    }

    async fn deactivate(&self, course_id: i64) -> Result<ActionMessage, ApiError> {
        self.client
            .post(
                &format!("/api/courses/{course_id}/deactivate/"),
                &serde_json::json!({}),
            )
            .await
    }

    async fn list_tags(&self) -> Result<Page<Tag>, ApiError> {
        self.client.get("/api/tags/").await
    }
}

#[cfg(test)]
mod tests_course_service {
    use super::*;
    use crate::config::Config;
    use crate::session::store::SessionStore;
    use crate::utils::logger::setup_logger;
    use mockito::{Matcher, Server, ServerGuard};
    use pretty_assertions::assert_eq;

    const COURSE_JSON: &str = r#"{
        "id": 5,
        "title": "Rust for Educators",
        "description": "Systems programming from zero.",
        "image": "",
        "instructor": {
            "id": 7,
            "username": "lan.nguyen",
            "email": "lan@example.com",
            "full_name": "Nguyen Thi Lan",
            "role": "instructor",
            "phone": null,
            "avatar": "",
            "is_active": true,
            "created_at": "2024-09-07T10:00:00Z",
            "updated_at": "2024-09-07T10:00:00Z"
        },
        "price": "49.99",
        "start_date": null,
        "end_date": null,
        "is_active": true,
        "tags": ["rust"],
        "created_at": "2024-09-07T10:00:00Z",
        "updated_at": "2024-09-08T11:30:00Z"
    }"#;

    fn create_service(server: &ServerGuard) -> CourseServiceImpl {
        let mut config = Config::default();
        config.rest_api.base_url = server.url();
        config.rest_api.timeout = 5;
        let store = Arc::new(SessionStore::in_memory());
        store.set_tokens("access-1", "refresh-1");
        let client = Arc::new(ApiHttpClient::new(&config, store).unwrap());
        CourseServiceImpl::new(client)
    }

    #[tokio::test]
    async fn test_list_courses_builds_query() {
        setup_logger();
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/api/courses/")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".into(), "2".into()),
                Matcher::UrlEncoded("search".into(), "rust".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"count": 1, "next": null, "previous": null, "results": [{COURSE_JSON}]}}"#
            ))
            .create_async()
            .await;

        let service = create_service(&server);
        let page = service.list_courses(Some(2), Some("rust")).await.unwrap();

        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].title, "Rust for Educators");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_register_posts_to_course_action() {
        setup_logger();
        let mut server = Server::new_async().await;

        let mock = server
            .mock("POST", "/api/courses/5/register/")
            .match_header("authorization", "Bearer access-1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": "enrolled"}"#)
            .create_async()
            .await;

        let service = create_service(&server);
        let outcome = service.register(5).await.unwrap();

        assert_eq!(outcome.success, "enrolled");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_duplicate_registration_surfaces_http_error() {
        setup_logger();
        let mut server = Server::new_async().await;

        let mock = server
            .mock("POST", "/api/courses/5/register/")
            .with_status(400)
            .with_body(r#"{"error": "already registered"}"#)
            .create_async()
            .await;

        let service = create_service(&server);
        let error = service.register(5).await.unwrap_err();

        assert_eq!(error.status(), Some(reqwest::StatusCode::BAD_REQUEST));
        mock.assert_async().await;
    }
}
