use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::{
    application::models::{
        page::{ActionMessage, Page},
        user::User,
    },
    error::ApiError,
    transport::http_client::ApiHttpClient,
};

/// Administrative user listings and account toggles. The current user's
/// own profile lives on [`Session`](crate::session::session::Session).
#[async_trait]
pub trait UserService: Send + Sync {
    async fn list_users(&self, page: Option<u32>) -> Result<Page<User>, ApiError>;

    async fn list_instructors(&self, page: Option<u32>) -> Result<Page<User>, ApiError>;

    async fn list_learners(&self, page: Option<u32>) -> Result<Page<User>, ApiError>;

    async fn list_centers(&self, page: Option<u32>) -> Result<Page<User>, ApiError>;

    /// Only instructors and learners can be toggled; the backend rejects
    /// other roles with a 400.
    async fn activate(&self, user_id: i64) -> Result<ActionMessage, ApiError>;

    async fn deactivate(&self, user_id: i64) -> Result<ActionMessage, ApiError>;
}

pub struct UserServiceImpl {
    client: Arc<ApiHttpClient>,
}

impl UserServiceImpl {
    pub fn new(client: Arc<ApiHttpClient>) -> Self {
        Self { client }
    }

    fn paged(base: &str, page: Option<u32>) -> String {
        match page {
            Some(page) => format!("{base}?page={page}"),
            None => base.to_string(),
        }
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn list_users(&self, page: Option<u32>) -> Result<Page<User>, ApiError> {
        self.client.get(&Self::paged("/api/users/", page)).await
    }

    async fn list_instructors(&self, page: Option<u32>) -> Result<Page<User>, ApiError> {
        self.client
            .get(&Self::paged("/api/users/instructors/", page))
            .await
    }

    async fn list_learners(&self, page: Option<u32>) -> Result<Page<User>, ApiError> {
        self.client
            .get(&Self::paged("/api/users/learners/", page))
            .await
    }

    async fn list_centers(&self, page: Option<u32>) -> Result<Page<User>, ApiError> {
        self.client
            .get(&Self::paged("/api/users/centers/", page))
            .await
    }

    async fn activate(&self, user_id: i64) -> Result<ActionMessage, ApiError> {
        info!("Activating user {}", user_id);
        self.client
            .post(&format!("/api/users/{user_id}/activate/"), &json!({}))
            .await
    }

    async fn deactivate(&self, user_id: i64) -> Result<ActionMessage, ApiError> {
        info!("Deactivating user {}", user_id);
        self.client
            .post(&format!("/api/users/{user_id}/deactivate/"), &json!({}))
            .await
    }
}
