/// Default API location used by the console during development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3002";

/// Path the console sends users to once their session is gone.
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Connection settings for [`ApiClient`](crate::ApiClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the admin API. Endpoint paths are appended verbatim, so a
    /// path prefix such as `https://host/api` is preserved.
    pub base_url: String,

    /// Login entry point handed to the session-expiry handler on HTTP 401.
    pub login_path: String,

    /// Reject unflagged response bodies that look like envelopes instead of
    /// returning their three fields as plain JSON.
    pub strict_envelopes: bool,

    /// Session cookie (`name=value`) to preload into the cookie store.
    pub session_cookie: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
        self
    }

    pub fn with_strict_envelopes(mut self, strict: bool) -> Self {
        self.strict_envelopes = strict;
        self
    }

    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        self.session_cookie = Some(cookie.into());
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            strict_envelopes: false,
            session_cookie: None,
        }
    }
}
