use std::env;
use std::time::Duration;

/// Where the quiz backend lives and how to authenticate against it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
    /// `None` waits indefinitely, like the browser client.
    pub timeout: Option<Duration>,
}

impl ApiConfig {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:5000";

    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: None,
            timeout: None,
        }
    }

    /// Read `QUIZ_API_BASE_URL`, `QUIZ_AUTH_TOKEN` and `QUIZ_API_TIMEOUT_SECS`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars(get: impl Fn(&str) -> Option<String>) -> Self {
        let base_url = get("QUIZ_API_BASE_URL")
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_BASE_URL.into());
        let auth_token = get("QUIZ_AUTH_TOKEN")
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty());
        let timeout = get("QUIZ_API_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        Self {
            base_url,
            auth_token,
            timeout,
        }
    }

    #[must_use]
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Absolute URL for `path`; absolute `http` paths pass through untouched.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http") {
            return path.to_owned();
        }
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE_URL)
    }
}
