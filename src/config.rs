use crate::constants::DEFAULT_NOTIFICATIONS_POLL_SECS;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::fmt::Debug;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::error;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub rest_api: RestApiConfig,
    pub polling: PollingConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RestApiConfig {
    pub base_url: String,
    pub timeout: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollingConfig {
    /// Cadence of the unread-notification-count poller, in seconds.
    pub notifications_interval: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Where the token pair is persisted. `None` selects the platform
    /// config directory.
    pub token_path: Option<PathBuf>,
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"rest_api\":{},\"polling\":{},\"storage\":{}}}",
            self.rest_api, self.polling, self.storage
        )
    }
}

impl fmt::Display for RestApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"base_url\":\"{}\",\"timeout\":{}}}",
            self.base_url, self.timeout
        )
    }
}

impl fmt::Display for PollingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{\"notifications_interval\":{}}}",
            self.notifications_interval
        )
    }
}

impl fmt::Display for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.token_path {
            Some(path) => write!(f, "{{\"token_path\":\"{}\"}}", path.display()),
            None => write!(f, "{{\"token_path\":null}}"),
        }
    }
}

pub fn get_env_or_default<T: FromStr>(env_var: &str, default: T) -> T
where
    <T as FromStr>::Err: Debug,
{
    match env::var(env_var) {
        Ok(val) => val.parse::<T>().unwrap_or_else(|_| {
            error!("Failed to parse {}: {}, using default", env_var, val);
            default
        }),
        Err(_) => default,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Config {
            rest_api: RestApiConfig {
                base_url: get_env_or_default(
                    "LMS_REST_BASE_URL",
                    String::from("http://127.0.0.1:8000"),
                ),
                timeout: get_env_or_default("LMS_REST_TIMEOUT", 30),
            },
            polling: PollingConfig {
                notifications_interval: get_env_or_default(
                    "LMS_NOTIFICATIONS_POLL_INTERVAL",
                    DEFAULT_NOTIFICATIONS_POLL_SECS,
                ),
            },
            storage: StorageConfig {
                token_path: env::var("LMS_TOKEN_PATH").ok().map(PathBuf::from),
            },
        }
    }
}
