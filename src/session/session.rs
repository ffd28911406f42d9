use crate::application::models::user::{ProfileUpdate, User};
use crate::constants::{
    ACCESS_PARAM, CURRENT_USER_ENDPOINT, LOGIN_ENDPOINT, LOGOUT_ENDPOINT, REFRESH_PARAM,
    USER_CACHE_TTL_SECS,
};
use crate::error::ApiError;
use crate::session::auth::{LoginRequest, LogoutRequest, TokenPair};
use crate::session::store::SessionStore;
use crate::transport::http_client::ApiHttpClient;
use reqwest::Url;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

struct CachedUser {
    user: User,
    fetched_at: Instant,
}

/// Session lifecycle on top of the authenticated client: login, logout,
/// the current-user profile (with a short-lived cache), and the
/// social-login redirect callback.
pub struct Session {
    client: Arc<ApiHttpClient>,
    user_cache: Mutex<Option<CachedUser>>,
    cache_ttl: Duration,
}

impl Session {
    pub fn new(client: Arc<ApiHttpClient>) -> Self {
        Self {
            client,
            user_cache: Mutex::new(None),
            cache_ttl: Duration::from_secs(USER_CACHE_TTL_SECS),
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        self.client.store()
    }

    pub fn is_authenticated(&self) -> bool {
        self.store().is_authenticated()
    }

    /// Exchanges credentials for a token pair and installs it.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, ApiError> {
        debug!("Authenticating user: {}", username);
        let pair: TokenPair = self
            .client
            .post_unauthenticated(LOGIN_ENDPOINT, &LoginRequest::new(username, password))
            .await?;

        self.store().set_tokens(&pair.access, &pair.refresh);
        self.clear_user_cache();
        debug!("Authentication successful");
        Ok(pair)
    }

    /// Blacklists the refresh token (best effort) and purges the session.
    /// The local session is gone even when the blacklist call fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Some(refresh) = self.store().refresh_token() {
            if let Err(e) = self
                .client
                .post_unauthenticated::<serde_json::Value, _>(
                    LOGOUT_ENDPOINT,
                    &LogoutRequest { refresh },
                )
                .await
            {
                warn!("Token blacklist call failed: {}", e);
            }
        }
        self.store().clear();
        self.clear_user_cache();
    }

    /// The current user's profile, cached for five minutes. Transparent
    /// token refresh happens underneath; an unrecoverable session shows up
    /// as `AuthenticationRequired` with the tokens already purged.
    #[instrument(skip(self))]
    pub async fn current_user(&self, force_refresh: bool) -> Result<User, ApiError> {
        if !force_refresh {
            if let Some(user) = self.cached_user() {
                debug!("Serving current user from cache");
                return Ok(user);
            }
        }

        match self.client.get::<User>(CURRENT_USER_ENDPOINT).await {
            Ok(user) => {
                self.cache_user(user.clone());
                Ok(user)
            }
            Err(e) => {
                self.clear_user_cache();
                Err(e)
            }
        }
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        let user: User = self.client.put(CURRENT_USER_ENDPOINT, update).await?;
        self.cache_user(user.clone());
        Ok(user)
    }

    /// Completes a social-login redirect: persists the `access`/`refresh`
    /// query parameters and returns the URL with both stripped, ready to
    /// show in the address bar. A redirect without both tokens cannot
    /// establish a session.
    pub fn social_callback(&self, url: &str) -> Result<String, ApiError> {
        let parsed = Url::parse(url).map_err(|e| {
            warn!("Unparseable social callback URL: {}", e);
            ApiError::AuthenticationRequired
        })?;

        let mut access = None;
        let mut refresh = None;
        let remaining: Vec<(String, String)> = parsed
            .query_pairs()
            .filter_map(|(key, value)| match key.as_ref() {
                ACCESS_PARAM => {
                    access = Some(value.into_owned());
                    None
                }
                REFRESH_PARAM => {
                    refresh = Some(value.into_owned());
                    None
                }
                _ => Some((key.into_owned(), value.into_owned())),
            })
            .collect();

        let (Some(access), Some(refresh)) = (access, refresh) else {
            warn!("Social callback missing token parameters");
            return Err(ApiError::AuthenticationRequired);
        };

        self.store().set_tokens(&access, &refresh);
        self.clear_user_cache();

        let mut cleaned = parsed;
        cleaned.set_query(None);
        if !remaining.is_empty() {
            cleaned.query_pairs_mut().extend_pairs(remaining);
        }
        Ok(cleaned.to_string())
    }

    fn cached_user(&self) -> Option<User> {
        let guard = match self.user_cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard
            .as_ref()
            .filter(|cached| cached.fetched_at.elapsed() < self.cache_ttl)
            .map(|cached| cached.user.clone())
    }

    fn cache_user(&self, user: User) {
        let mut guard = match self.user_cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Some(CachedUser {
            user,
            fetched_at: Instant::now(),
        });
    }

    fn clear_user_cache(&self) {
        let mut guard = match self.user_cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = None;
    }
}
