pub const LOGIN_ENDPOINT: &str = "/auth/token/";
pub const REFRESH_ENDPOINT: &str = "/auth/token/refresh/";
pub const LOGOUT_ENDPOINT: &str = "/auth/token/blacklist/";
pub const CURRENT_USER_ENDPOINT: &str = "/api/users/current_user/";

pub(crate) const ACCESS_PARAM: &str = "access";
pub(crate) const REFRESH_PARAM: &str = "refresh";

pub(crate) const DEFAULT_NOTIFICATIONS_POLL_SECS: u64 = 30;
pub(crate) const USER_CACHE_TTL_SECS: u64 = 300;

pub(crate) const TOKEN_DIR_NAME: &str = "lms-client";
pub(crate) const TOKEN_FILE_NAME: &str = "session.json";
