use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::{
    application::models::{
        notification::{UnreadCount, UserNotification},
        page::Page,
    },
    error::ApiError,
    transport::http_client::ApiHttpClient,
};

#[async_trait]
pub trait NotificationService: Send + Sync {
    /// The current user's notifications, newest first.
    async fn list_notifications(&self, page: Option<u32>)
        -> Result<Page<UserNotification>, ApiError>;

    /// Number of unread notifications. This is the endpoint the 30-second
    /// poller hits, so it stays deliberately cheap.
    async fn unread_count(&self) -> Result<UnreadCount, ApiError>;

    async fn mark_read(&self, user_notification_id: i64) -> Result<UserNotification, ApiError>;

    async fn mark_all_read(&self) -> Result<(), ApiError>;

    async fn delete_notification(&self, user_notification_id: i64) -> Result<(), ApiError>;
}

pub struct NotificationServiceImpl {
    client: Arc<ApiHttpClient>,
}

impl NotificationServiceImpl {
    pub fn new(client: Arc<ApiHttpClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationService for NotificationServiceImpl {
    async fn list_notifications(
        &self,
        page: Option<u32>,
    ) -> Result<Page<UserNotification>, ApiError> {
        let path = match page {
            Some(page) => format!("/api/user-notifications/?page={page}"),
            None => "/api/user-notifications/".to_string(),
        };
        self.client.get(&path).await
    }

    async fn unread_count(&self) -> Result<UnreadCount, ApiError> {
        let count: UnreadCount = self
            .client
            .get("/api/user-notifications/unread_count/")
            .await?;
        debug!("Unread notifications: {}", count.unread_count);
        Ok(count)
    }

    async fn mark_read(&self, user_notification_id: i64) -> Result<UserNotification, ApiError> {
        self.client
            .put(
                &format!("/api/user-notifications/{user_notification_id}/"),
                &json!({"is_read": true}),
            )
            .await
    }

    async fn mark_all_read(&self) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .client
            .post("/api/user-notifications/mark_all_read/", &json!({}))
            .await?;
        Ok(())
    }

    async fn delete_notification(&self, user_notification_id: i64) -> Result<(), ApiError> {
        self.client
            .delete(&format!("/api/user-notifications/{user_notification_id}/"))
            .await
    }
}
