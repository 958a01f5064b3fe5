//! Client configuration.
//!
//! Provides configuration options for the Booker client.

use std::env;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::BookerError;

/// Default base URL for the API.
pub const DEFAULT_BASE_URL: &str = "https://api-staging.booker.com/v4.1/customer";

/// Default path of the token endpoint, relative to the base URL.
pub const DEFAULT_AUTH_PATH: &str = "/access_token";

/// Fixed request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Pause before the single retry, in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Environment toggle for request/response tracing.
pub const DEBUG_ENV_VAR: &str = "BOOKER_API_DEBUG";

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL for the API.
    pub base_url: String,

    /// OAuth client identifier.
    pub client_id: String,

    /// OAuth client secret.
    pub client_secret: String,

    /// Token endpoint path.
    pub auth_path: String,

    /// Request timeout.
    pub timeout: Duration,

    /// Pause before retrying a failed call.
    pub retry_delay: Duration,

    /// Whether a POST that timed out may be sent again.
    pub retry_post_on_timeout: bool,

    /// Whether requests and responses are traced at info level.
    pub debug: bool,

    /// Access token carried over from a previous process.
    pub access_token: Option<String>,

    /// Expiry of `access_token`.
    pub access_token_expires_at: Option<DateTime<Utc>>,

    /// User agent string.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            auth_path: DEFAULT_AUTH_PATH.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            retry_post_on_timeout: false,
            debug: false,
            access_token: None,
            access_token_expires_at: None,
            user_agent: format!("booker-sdk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Creates a new configuration with the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Loads the configuration from the environment.
    ///
    /// Reads `BOOKER_BASE_URL`, `BOOKER_CLIENT_ID`, `BOOKER_CLIENT_SECRET`
    /// and `BOOKER_API_DEBUG`. Missing variables keep their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(base_url) = env::var("BOOKER_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(client_id) = env::var("BOOKER_CLIENT_ID") {
            config.client_id = client_id;
        }
        if let Ok(client_secret) = env::var("BOOKER_CLIENT_SECRET") {
            config.client_secret = client_secret;
        }
        config.debug = debug_from_env();

        config
    }

    /// Sets the client credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.client_id = client_id.into();
        self.client_secret = client_secret.into();
        self
    }

    /// Sets the token endpoint path.
    #[must_use]
    pub fn with_auth_path(mut self, auth_path: impl Into<String>) -> Self {
        self.auth_path = auth_path.into();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the pause before a retry.
    #[must_use]
    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Allows POST requests to be replayed after a timeout.
    #[must_use]
    pub fn with_retry_post_on_timeout(mut self, enabled: bool) -> Self {
        self.retry_post_on_timeout = enabled;
        self
    }

    /// Enables request/response tracing.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Seeds the cached access token.
    #[must_use]
    pub fn with_access_token(
        mut self,
        token: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        self.access_token = Some(token.into());
        self.access_token_expires_at = Some(expires_at);
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), BookerError> {
        if self.base_url.is_empty() {
            return Err(BookerError::InvalidConfig(
                "base_url cannot be empty".to_string(),
            ));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(BookerError::InvalidConfig(
                "base_url must start with http:// or https://".to_string(),
            ));
        }

        if self.timeout.is_zero() {
            return Err(BookerError::InvalidConfig(
                "timeout must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn debug_from_env() -> bool {
    env::var(DEBUG_ENV_VAR).is_ok_and(|v| v == "true")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.retry_delay, Duration::from_millis(DEFAULT_RETRY_DELAY_MS));
        assert_eq!(config.auth_path, DEFAULT_AUTH_PATH);
        assert!(!config.retry_post_on_timeout);
        assert!(config.access_token.is_none());
    }

    #[test]
    fn test_config_new() {
        let config = ClientConfig::new("http://foo");
        assert_eq!(config.base_url, "http://foo");
    }

    #[test]
    fn test_config_builder() {
        let expires_at = Utc::now() + chrono::Duration::minutes(1);
        let config = ClientConfig::new("https://api.example.com")
            .with_credentials("id", "secret")
            .with_auth_path("/v4.1/auth/access_token")
            .with_timeout(Duration::from_secs(5))
            .with_retry_delay(Duration::from_millis(10))
            .with_retry_post_on_timeout(true)
            .with_debug(true)
            .with_access_token("token", expires_at)
            .with_user_agent("my-app/1.0");

        assert_eq!(config.client_id, "id");
        assert_eq!(config.client_secret, "secret");
        assert_eq!(config.auth_path, "/v4.1/auth/access_token");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.retry_delay, Duration::from_millis(10));
        assert!(config.retry_post_on_timeout);
        assert!(config.debug);
        assert_eq!(config.access_token.as_deref(), Some("token"));
        assert_eq!(config.access_token_expires_at, Some(expires_at));
        assert_eq!(config.user_agent, "my-app/1.0");
    }

    #[test]
    fn test_config_validate_valid() {
        let config = ClientConfig::new("https://api.example.com");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validate_empty_url() {
        let config = ClientConfig::new("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validate_invalid_scheme() {
        let config = ClientConfig::new("ftp://api.example.com");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validate_zero_timeout() {
        let config = ClientConfig::new("https://api.example.com").with_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }
}
