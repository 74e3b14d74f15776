use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.stream-io-api.com/api/v1.0";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const BASE_URL_ENV: &str = "FEED_API_BASE_URL";
pub const REQUEST_TIMEOUT_ENV: &str = "FEED_REQUEST_TIMEOUT_SECS";
pub const USER_AGENT_ENV: &str = "FEED_USER_AGENT";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Settings for the HTTP response source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: default_user_agent(),
        }
    }
}

impl FeedConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Blank values count as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(base_url) = lookup(BASE_URL_ENV) {
            config.base_url = base_url.trim().to_string();
        }
        if let Some(raw) = lookup(REQUEST_TIMEOUT_ENV) {
            let seconds = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|seconds| *seconds > 0)
                .ok_or(ConfigError::InvalidValue {
                    key: REQUEST_TIMEOUT_ENV,
                    value: raw.clone(),
                })?;
            config.request_timeout = Duration::from_secs(seconds);
        }
        if let Some(user_agent) = lookup(USER_AGENT_ENV) {
            config.user_agent = user_agent;
        }
        Ok(config)
    }

    /// Joins `path` onto the base URL with exactly one slash between them.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

pub fn default_user_agent() -> String {
    format!("feed-core/{}", env!("CARGO_PKG_VERSION"))
}
