use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, fs::File, io::Read, path::Path, time::Duration};
use validator::Validate;

/// Production endpoint of the name.com API.
pub const API_BASE_URL: &str = "https://api.name.com/api";

/// Attempts made for a request whose transport keeps timing out.
pub const MAX_TIMEOUT_RETRIES: u32 = 3;

/// Pause after each timed-out attempt.
pub const TIMEOUT_RETRY_SECONDS: u64 = 5;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

fn default_base_url() -> String {
    API_BASE_URL.to_string()
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_max_attempts() -> u32 {
    MAX_TIMEOUT_RETRIES
}

fn default_backoff() -> u64 {
    TIMEOUT_RETRY_SECONDS
}

/// Connection settings for a [`NameComClient`](crate::NameComClient).
///
/// Set once at construction; the client never mutates them.
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    #[validate(length(min = 1, message = "Base URL cannot be empty"))]
    pub base_url: String,

    #[validate(length(min = 1, message = "API username cannot be empty"))]
    pub username: String,

    #[validate(length(min = 1, message = "API token cannot be empty"))]
    pub token: String,

    #[serde(default = "default_request_timeout")]
    #[validate(range(min = 1, message = "Request timeout must be greater than 0"))]
    pub request_timeout_secs: u64,

    #[serde(default)]
    #[validate(nested)]
    pub retry: RetryPolicy,
}

/// Fixed-interval retry applied to transport timeouts only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct RetryPolicy {
    #[serde(default = "default_max_attempts")]
    #[validate(range(min = 1, message = "At least one attempt is required"))]
    pub max_attempts: u32,

    #[serde(default = "default_backoff")]
    pub backoff_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_TIMEOUT_RETRIES,
            backoff_secs: TIMEOUT_RETRY_SECONDS,
        }
    }
}

impl RetryPolicy {
    pub fn backoff(&self) -> Duration {
        Duration::from_secs(self.backoff_secs)
    }
}

impl ClientConfig {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: default_base_url(),
            username: username.into(),
            token: token.into(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Base URL without trailing slashes, ready for path templating.
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(contents).context("Failed to parse client configuration")?;
        config
            .validate()
            .context("Invalid client configuration")?;
        Ok(config)
    }

    pub fn from_yaml_file(config_file: impl AsRef<Path>) -> Result<Self> {
        let config_file = config_file.as_ref();
        let mut file = File::open(config_file)
            .with_context(|| format!("Failed to open config file: {}", config_file.display()))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .with_context(|| format!("Failed to read config file: {}", config_file.display()))?;

        Self::from_yaml_str(&contents)
            .with_context(|| format!("Failed to load config file: {}", config_file.display()))
    }
}

// Keeps the token out of logs and panic messages.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("retry", &self.retry)
            .finish()
    }
}
