use crate::config::Config;
use crate::constants::REFRESH_ENDPOINT;
use crate::error::ApiError;
use crate::session::auth::{RefreshRequest, RefreshResponse};
use crate::session::store::SessionStore;
use reqwest::{header, Client, Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

/// HTTP client for the learning platform backend.
///
/// Attaches the stored access token as a bearer header on every request and
/// recovers transparently from an expired one: the first 401 triggers a
/// token refresh and a single replay of the failed request. The replay's
/// outcome is returned to the caller as if nothing happened; a 401 on the
/// replay itself is surfaced as a plain HTTP error, so no request is ever
/// retried twice.
#[derive(Debug)]
pub struct ApiHttpClient {
    client: Client,
    base_url: String,
    store: Arc<SessionStore>,
}

impl ApiHttpClient {
    pub fn new(config: &Config, store: Arc<SessionStore>) -> Result<Self, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.rest_api.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.rest_api.base_url.trim_end_matches('/').to_string(),
            store,
        })
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    #[instrument(skip(self))]
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request(Method::GET, endpoint, None::<&()>).await
    }

    #[instrument(skip(self, body))]
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request(Method::POST, endpoint, Some(body)).await
    }

    #[instrument(skip(self, body))]
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request(Method::PUT, endpoint, Some(body)).await
    }

    #[instrument(skip(self))]
    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        self.request(Method::DELETE, endpoint, None::<&()>).await
    }

    /// Issues a request without a bearer header and without 401 recovery.
    /// Used by the login and logout flows, which operate outside a session.
    #[instrument(skip(self, body))]
    pub async fn post_unauthenticated<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.send(Method::POST, endpoint, Some(body), None).await?;
        let (_, _, parsed) = Self::handle_response(response).await?;
        Ok(parsed)
    }

    pub async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (_, _, parsed) = self.request_with_status(method, path, body).await?;
        Ok(parsed)
    }

    /// Like [`request`](Self::request) but exposes the response status and
    /// headers alongside the decoded body.
    #[instrument(skip(self, body))]
    pub async fn request_with_status<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(StatusCode, header::HeaderMap, T), ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let token = self.store.access_token();
        let response = self
            .send(method.clone(), path, body, token.as_deref())
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Self::handle_response(response).await;
        }

        // Expired access token: refresh once and replay. A second 401 on the
        // replayed request falls through handle_response as a plain HTTP
        // error, which is what prevents retry loops.
        let access = self.refresh_access_token(token.as_deref()).await?;
        let retried = self.send(method, path, body, Some(&access)).await?;
        Self::handle_response(retried).await
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<Response, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Sending {} request to {}", method, url);

        let mut request = self.client.request(method, &url);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }

    /// Exchanges the stored refresh token for a new access token.
    ///
    /// The store's refresh gate is held across the whole sequence so that
    /// concurrent 401s share one in-flight refresh: whoever loses the race
    /// finds the token already replaced and reuses it without another call.
    /// Any refresh failure purges the session; the caller then sees
    /// `AuthenticationRequired` and must send the user back to login.
    #[instrument(skip(self, rejected))]
    async fn refresh_access_token(&self, rejected: Option<&str>) -> Result<String, ApiError> {
        let _gate = self.store.refresh_gate().lock().await;

        if let Some(current) = self.store.access_token() {
            if rejected != Some(current.as_str()) {
                debug!("Access token already refreshed by a concurrent request");
                return Ok(current);
            }
        }

        let Some(refresh) = self.store.refresh_token() else {
            warn!("No refresh token available, session cannot be recovered");
            self.store.clear();
            return Err(ApiError::AuthenticationRequired);
        };

        debug!("Access token rejected, requesting a new one");
        match self.post_refresh(refresh).await {
            Ok(access) => {
                self.store.set_access_token(&access);
                debug!("Access token refreshed");
                Ok(access)
            }
            Err(e) => {
                error!("Token refresh failed: {}", e);
                self.store.clear();
                Err(ApiError::AuthenticationRequired)
            }
        }
    }

    async fn post_refresh(&self, refresh: String) -> Result<String, ApiError> {
        let url = format!("{}{}", self.base_url, REFRESH_ENDPOINT);
        let response = self
            .client
            .post(&url)
            .json(&RefreshRequest { refresh })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Http { status, body });
        }

        let parsed: RefreshResponse = serde_json::from_str(&body)?;
        Ok(parsed.access)
    }

    async fn handle_response<T: DeserializeOwned>(
        response: Response,
    ) -> Result<(StatusCode, header::HeaderMap, T), ApiError> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        debug!("Response status: {}", status);

        if status.is_success() {
            Ok((status, headers, Self::decode_body(&body)?))
        } else {
            error!("API request failed. Status: {}, Body: {}", status, body);
            Err(ApiError::Http { status, body })
        }
    }

    fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
        if body.trim().is_empty() {
            // 204-style responses decode as null, for callers expecting ()
            return Ok(serde_json::from_value(serde_json::Value::Null)?);
        }
        Ok(serde_json::from_str(body)?)
    }
}

#[cfg(test)]
mod tests_api_http_client {
    use super::*;
    use crate::utils::logger::setup_logger;
    use mockito::{Matcher, Server, ServerGuard};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn create_client(server: &ServerGuard) -> ApiHttpClient {
        let mut config = Config::default();
        config.rest_api.base_url = server.url();
        config.rest_api.timeout = 5;
        ApiHttpClient::new(&config, Arc::new(SessionStore::in_memory())).unwrap()
    }

    #[tokio::test]
    async fn test_get_request_attaches_bearer_header() {
        setup_logger();
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/api/courses/")
            .match_header("authorization", "Bearer access-1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"results": [], "count": 0}"#)
            .create_async()
            .await;

        let client = create_client(&server);
        client.store().set_tokens("access-1", "refresh-1");

        let result: serde_json::Value = client.get("/api/courses/").await.unwrap();
        assert_eq!(result["count"], 0);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_request_without_stored_token_has_no_header() {
        setup_logger();
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/api/courses/hot/")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;

        let client = create_client(&server);
        let result: serde_json::Value = client.get("/api/courses/hot/").await.unwrap();
        assert_eq!(result, json!([]));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed_and_request_replayed() {
        setup_logger();
        let mut server = Server::new_async().await;

        let rejected = server
            .mock("GET", "/api/courses/5/")
            .match_header("authorization", "Bearer stale")
            .with_status(401)
            .with_body(r#"{"detail": "Token is invalid or expired"}"#)
            .create_async()
            .await;

        let refresh = server
            .mock("POST", "/auth/token/refresh/")
            .match_body(Matcher::Json(json!({"refresh": "refresh-1"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access": "abc123"}"#)
            .create_async()
            .await;

        let replayed = server
            .mock("GET", "/api/courses/5/")
            .match_header("authorization", "Bearer abc123")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": 5, "title": "Rust for Educators"}"#)
            .create_async()
            .await;

        let client = create_client(&server);
        client.store().set_tokens("stale", "refresh-1");

        let result: serde_json::Value = client.get("/api/courses/5/").await.unwrap();
        assert_eq!(result["title"], "Rust for Educators");
        assert_eq!(
            client.store().access_token(),
            Some("abc123".to_string())
        );

        rejected.assert_async().await;
        refresh.assert_async().await;
        replayed.assert_async().await;
    }

    #[tokio::test]
    async fn test_second_401_surfaces_as_plain_http_error() {
        setup_logger();
        let mut server = Server::new_async().await;

        // Rejects both the original and the replayed request.
        let rejected = server
            .mock("GET", "/api/users/current_user/")
            .with_status(401)
            .with_body("Unauthorized")
            .expect(2)
            .create_async()
            .await;

        let refresh = server
            .mock("POST", "/auth/token/refresh/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access": "still-rejected"}"#)
            .expect(1)
            .create_async()
            .await;

        let client = create_client(&server);
        client.store().set_tokens("stale", "refresh-1");

        let error = client
            .get::<serde_json::Value>("/api/users/current_user/")
            .await
            .unwrap_err();

        match error {
            ApiError::Http { status, .. } => assert_eq!(status, StatusCode::UNAUTHORIZED),
            other => panic!("Expected Http error, got {:?}", other),
        }

        rejected.assert_async().await;
        refresh.assert_async().await;
    }

    #[tokio::test]
    async fn test_refresh_failure_purges_session() {
        setup_logger();
        let mut server = Server::new_async().await;

        let _rejected = server
            .mock("GET", "/api/notifications/")
            .with_status(401)
            .with_body("Unauthorized")
            .create_async()
            .await;

        let refresh = server
            .mock("POST", "/auth/token/refresh/")
            .with_status(401)
            .with_body(r#"{"detail": "Token is blacklisted"}"#)
            .create_async()
            .await;

        let client = create_client(&server);
        client.store().set_tokens("stale", "expired-refresh");

        let error = client
            .get::<serde_json::Value>("/api/notifications/")
            .await
            .unwrap_err();

        assert!(error.is_authentication_required());
        assert_eq!(client.store().access_token(), None);
        assert_eq!(client.store().refresh_token(), None);
        refresh.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_refresh_token_fails_without_network_call() {
        setup_logger();
        let mut server = Server::new_async().await;

        let _rejected = server
            .mock("GET", "/api/notifications/")
            .with_status(401)
            .with_body("Unauthorized")
            .create_async()
            .await;

        let refresh = server
            .mock("POST", "/auth/token/refresh/")
            .expect(0)
            .create_async()
            .await;

        let client = create_client(&server);
        client.store().set_access_token("stale");

        let error = client
            .get::<serde_json::Value>("/api/notifications/")
            .await
            .unwrap_err();

        assert!(error.is_authentication_required());
        assert_eq!(client.store().access_token(), None);
        refresh.assert_async().await;
    }

    #[tokio::test]
    async fn test_concurrent_401s_share_one_refresh() {
        setup_logger();
        let mut server = Server::new_async().await;

        let rejected = server
            .mock("GET", "/api/user-notifications/unread_count/")
            .match_header("authorization", "Bearer stale")
            .with_status(401)
            .with_body("Unauthorized")
            .expect(2)
            .create_async()
            .await;

        let refresh = server
            .mock("POST", "/auth/token/refresh/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access": "fresh"}"#)
            .expect(1)
            .create_async()
            .await;

        let replayed = server
            .mock("GET", "/api/user-notifications/unread_count/")
            .match_header("authorization", "Bearer fresh")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"unread_count": 2}"#)
            .expect(2)
            .create_async()
            .await;

        let client = create_client(&server);
        client.store().set_tokens("stale", "refresh-1");

        let (first, second) = tokio::join!(
            client.get::<serde_json::Value>("/api/user-notifications/unread_count/"),
            client.get::<serde_json::Value>("/api/user-notifications/unread_count/"),
        );

        assert_eq!(first.unwrap()["unread_count"], 2);
        assert_eq!(second.unwrap()["unread_count"], 2);

        rejected.assert_async().await;
        refresh.assert_async().await;
        replayed.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_401_errors_pass_through() {
        setup_logger();
        let mut server = Server::new_async().await;

        let mock = server
            .mock("DELETE", "/api/reviews/9/")
            .with_status(403)
            .with_body(r#"{"detail": "You do not have permission"}"#)
            .create_async()
            .await;

        let refresh = server
            .mock("POST", "/auth/token/refresh/")
            .expect(0)
            .create_async()
            .await;

        let client = create_client(&server);
        client.store().set_tokens("access-1", "refresh-1");

        let error = client
            .delete::<serde_json::Value>("/api/reviews/9/")
            .await
            .unwrap_err();

        match error {
            ApiError::Http { status, body } => {
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert!(body.contains("permission"));
            }
            other => panic!("Expected Http error, got {:?}", other),
        }

        mock.assert_async().await;
        refresh.assert_async().await;
    }

    #[tokio::test]
    async fn test_transport_failure_maps_to_network_error() {
        setup_logger();

        let mut config = Config::default();
        // Nothing listens here; the connection is refused.
        config.rest_api.base_url = "http://127.0.0.1:9".to_string();
        config.rest_api.timeout = 1;

        let client = ApiHttpClient::new(&config, Arc::new(SessionStore::in_memory())).unwrap();
        let error = client.get::<serde_json::Value>("/api/courses/").await.unwrap_err();

        assert!(matches!(error, ApiError::Network(_)));
    }

    #[tokio::test]
    async fn test_empty_body_decodes_to_unit() {
        setup_logger();
        let mut server = Server::new_async().await;

        let mock = server
            .mock("POST", "/api/courses/3/register/")
            .with_status(204)
            .create_async()
            .await;

        let client = create_client(&server);
        client.store().set_tokens("access-1", "refresh-1");

        let result: Result<(), ApiError> =
            client.post("/api/courses/3/register/", &json!({})).await;
        assert!(result.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_request_with_status_exposes_metadata() {
        setup_logger();
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/api/tags/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("x-total-count", "1")
            .with_body(r#"[{"id": 1, "name": "rust"}]"#)
            .create_async()
            .await;

        let client = create_client(&server);
        let (status, headers, body): (_, _, serde_json::Value) = client
            .request_with_status(Method::GET, "/api/tags/", None::<&()>)
            .await
            .unwrap();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers.get("x-total-count").unwrap(), "1");
        assert_eq!(body[0]["name"], "rust");
        mock.assert_async().await;
    }
}
