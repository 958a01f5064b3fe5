//! Access token lifecycle.
//!
//! The [`TokenManager`] caches one token and its expiry. A cached token is
//! handed out only while both are present and the expiry is strictly in the
//! future; otherwise a new one is fetched through the [`Authenticator`] and,
//! if configured, handed to a [`TokenStore`] so it can outlive the process.
//!
//! There is no revocation. When the server reports the token invalid the
//! executor calls [`TokenManager::refresh`] and the old token is overwritten.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::classify::{classify, Outcome};
use super::config::ClientConfig;
use super::request::RequestDescriptor;
use super::transport;
use crate::error::{BookerError, Result};

/// A token together with the instant it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    /// Token string.
    pub token: String,

    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Returns true if the token can still be used at `now`.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Token as issued by the authentication endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Token string.
    pub access_token: String,

    /// Validity in seconds from issue.
    pub expires_in: i64,
}

impl IssuedToken {
    /// Reads `access_token` and `expires_in` from a token response body.
    ///
    /// `expires_in` may arrive as a number or a numeric string.
    #[must_use]
    pub fn from_body(body: &Value) -> Option<Self> {
        let access_token = body.get("access_token")?.as_str()?.to_string();
        let expires_in = match body.get("expires_in")? {
            Value::Number(n) => n.as_i64()?,
            Value::String(s) => s.trim().parse().ok()?,
            _ => return None,
        };

        Some(Self {
            access_token,
            expires_in,
        })
    }
}

/// Fetches new access tokens.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Requests a fresh token from the authentication endpoint.
    async fn fetch_token(&self) -> Result<IssuedToken>;
}

/// Persists tokens across process restarts.
pub trait TokenStore: Send + Sync {
    /// Called with every newly fetched token.
    ///
    /// # Errors
    ///
    /// Implementations report persistence failures as
    /// [`BookerError::TokenStore`].
    fn update_token(&self, token: &str, expires_at: DateTime<Utc>) -> Result<()>;
}

impl<F> TokenStore for F
where
    F: Fn(&str, DateTime<Utc>) -> Result<()> + Send + Sync,
{
    fn update_token(&self, token: &str, expires_at: DateTime<Utc>) -> Result<()> {
        self(token, expires_at)
    }
}

/// Client-credentials grant against the configured token endpoint.
pub struct ClientCredentialsAuthenticator {
    http: reqwest::Client,
    base_url: String,
    auth_path: String,
    client_id: String,
    client_secret: String,
    timeout: Duration,
}

impl ClientCredentialsAuthenticator {
    /// Creates an authenticator that shares `http` with the client.
    #[must_use]
    pub fn new(http: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.clone(),
            auth_path: config.auth_path.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            timeout: config.timeout,
        }
    }

    fn request(&self) -> RequestDescriptor {
        let mut query = Map::new();
        query.insert("client_id".to_string(), Value::from(self.client_id.as_str()));
        query.insert(
            "client_secret".to_string(),
            Value::from(self.client_secret.as_str()),
        );
        query.insert("grant_type".to_string(), Value::from("client_credentials"));

        RequestDescriptor::new(Method::GET, self.auth_path.as_str(), self.timeout)
            .with_query(Some(query))
    }
}

#[async_trait]
impl Authenticator for ClientCredentialsAuthenticator {
    async fn fetch_token(&self) -> Result<IssuedToken> {
        let request = self.request();
        debug!("Fetching access token from {}", request.path);

        let response = transport::send(&self.http, &self.base_url, &request).await?;
        let snapshot = response.clone();

        match classify(&request, response)? {
            Outcome::Usable(body) => IssuedToken::from_body(&body)
                .ok_or_else(|| BookerError::api(request.clone(), Some(snapshot))),
            Outcome::Empty => Err(BookerError::invalid_credentials(request, Some(snapshot))),
            Outcome::RefreshAndRetry => Err(BookerError::api(request, Some(snapshot))),
        }
    }
}

#[derive(Debug, Default)]
struct TokenState {
    token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl TokenState {
    fn usable(&self, now: DateTime<Utc>) -> Option<AccessToken> {
        let token = AccessToken {
            token: self.token.clone()?,
            expires_at: self.expires_at?,
        };
        token.is_valid_at(now).then_some(token)
    }
}

/// Caches the access token and fetches a new one when needed.
pub struct TokenManager {
    state: RwLock<TokenState>,
    authenticator: Arc<dyn Authenticator>,
    store: Option<Arc<dyn TokenStore>>,
}

impl TokenManager {
    /// Creates a manager with an empty cache.
    #[must_use]
    pub fn new(authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            state: RwLock::new(TokenState::default()),
            authenticator,
            store: None,
        }
    }

    /// Sets the store that receives every new token.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Seeds the cache, e.g. with a token persisted by an earlier process.
    #[must_use]
    pub fn with_token(
        mut self,
        token: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        *self.state.get_mut() = TokenState { token, expires_at };
        self
    }

    /// Returns a usable token, fetching a new one if the cached one is
    /// missing or expired.
    ///
    /// # Errors
    ///
    /// Returns whatever [`TokenManager::refresh`] reports.
    pub async fn current_token(&self) -> Result<String> {
        if let Some(cached) = self.state.read().await.usable(Utc::now()) {
            return Ok(cached.token);
        }

        self.refresh().await
    }

    /// Fetches a new token unconditionally, caches it and persists it.
    ///
    /// A failing token store is logged; the new token is still returned.
    ///
    /// # Errors
    ///
    /// Returns whatever the authenticator reports, or
    /// [`BookerError::Deserialization`] if the token lifetime does not fit a
    /// timestamp.
    pub async fn refresh(&self) -> Result<String> {
        let issued = self.authenticator.fetch_token().await?;
        let expires_at = chrono::Duration::try_seconds(issued.expires_in)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .ok_or_else(|| {
                BookerError::Deserialization(format!(
                    "token lifetime out of range: {}s",
                    issued.expires_in
                ))
            })?;

        {
            let mut state = self.state.write().await;
            state.token = Some(issued.access_token.clone());
            state.expires_at = Some(expires_at);
        }

        info!("Obtained new access token valid until {}", expires_at);

        if let Some(store) = &self.store {
            if let Err(e) = store.update_token(&issued.access_token, expires_at) {
                warn!("Failed to persist access token: {}", e);
            }
        }

        Ok(issued.access_token)
    }

    /// Returns the cached token, valid or not.
    pub async fn snapshot(&self) -> Option<AccessToken> {
        let state = self.state.read().await;
        Some(AccessToken {
            token: state.token.clone()?,
            expires_at: state.expires_at?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    /// Hands out `token-1`, `token-2`, ... and counts calls.
    struct CountingAuthenticator {
        calls: AtomicUsize,
    }

    impl CountingAuthenticator {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Authenticator for CountingAuthenticator {
        async fn fetch_token(&self) -> Result<IssuedToken> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(IssuedToken {
                access_token: format!("token-{}", n),
                expires_in: 3600,
            })
        }
    }

    #[tokio::test]
    async fn test_valid_cached_token_is_reused() {
        let auth = CountingAuthenticator::new();
        let manager = TokenManager::new(auth.clone()).with_token(
            Some("token".to_string()),
            Some(Utc::now() + chrono::Duration::minutes(1)),
        );

        assert_eq!(manager.current_token().await.expect("token"), "token");
        assert_eq!(auth.calls(), 0);
    }

    #[tokio::test]
    async fn test_expired_token_is_never_reused() {
        let auth = CountingAuthenticator::new();
        let manager = TokenManager::new(auth.clone()).with_token(
            Some("token".to_string()),
            Some(Utc::now() - chrono::Duration::minutes(1)),
        );

        assert_eq!(manager.current_token().await.expect("token"), "token-1");
        assert_eq!(auth.calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_token_is_fetched() {
        let auth = CountingAuthenticator::new();
        let manager = TokenManager::new(auth.clone())
            .with_token(None, Some(Utc::now() + chrono::Duration::minutes(1)));

        assert_eq!(manager.current_token().await.expect("token"), "token-1");
        assert_eq!(auth.calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_expiry_is_fetched() {
        let auth = CountingAuthenticator::new();
        let manager = TokenManager::new(auth.clone()).with_token(Some("token".to_string()), None);

        assert_eq!(manager.current_token().await.expect("token"), "token-1");
    }

    #[tokio::test]
    async fn test_fetched_token_is_cached() {
        let auth = CountingAuthenticator::new();
        let manager = TokenManager::new(auth.clone());

        assert_eq!(manager.current_token().await.expect("token"), "token-1");
        assert_eq!(manager.current_token().await.expect("token"), "token-1");
        assert_eq!(auth.calls(), 1);

        let snapshot = manager.snapshot().await.expect("snapshot");
        assert_eq!(snapshot.token, "token-1");
        assert!(snapshot.is_valid_at(Utc::now()));
    }

    #[tokio::test]
    async fn test_refresh_overwrites_and_persists() {
        let auth = CountingAuthenticator::new();
        let stored: Arc<Mutex<Vec<(String, DateTime<Utc>)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&stored);
        let store = move |token: &str, expires_at: DateTime<Utc>| -> Result<()> {
            sink.lock()
                .map_err(|e| BookerError::TokenStore(e.to_string()))?
                .push((token.to_string(), expires_at));
            Ok(())
        };

        let manager = TokenManager::new(auth.clone())
            .with_store(Arc::new(store))
            .with_token(
                Some("old".to_string()),
                Some(Utc::now() + chrono::Duration::minutes(1)),
            );

        assert_eq!(manager.refresh().await.expect("token"), "token-1");
        assert_eq!(manager.current_token().await.expect("token"), "token-1");

        let stored = stored.lock().expect("lock");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].0, "token-1");
        assert!(stored[0].1 > Utc::now());
    }

    #[tokio::test]
    async fn test_store_failure_keeps_token() {
        let auth = CountingAuthenticator::new();
        let store = |_: &str, _: DateTime<Utc>| -> Result<()> {
            Err(BookerError::TokenStore("disk full".to_string()))
        };
        let manager = TokenManager::new(auth.clone()).with_store(Arc::new(store));

        assert_eq!(manager.current_token().await.expect("token"), "token-1");
        assert_eq!(manager.current_token().await.expect("token"), "token-1");
        assert_eq!(auth.calls(), 1);
    }

    /// Issues a token with a fixed lifetime.
    struct FixedLifetime(i64);

    #[async_trait]
    impl Authenticator for FixedLifetime {
        async fn fetch_token(&self) -> Result<IssuedToken> {
            Ok(IssuedToken {
                access_token: "long".to_string(),
                expires_in: self.0,
            })
        }
    }

    #[tokio::test]
    async fn test_out_of_range_lifetime_is_an_error() {
        for lifetime in [i64::MAX, i64::MIN] {
            let manager = TokenManager::new(Arc::new(FixedLifetime(lifetime)));

            let err = manager.current_token().await.expect_err("out of range");
            assert!(matches!(err, BookerError::Deserialization(_)));
            assert!(manager.snapshot().await.is_none());
        }
    }

    #[test]
    fn test_issued_token_from_body() {
        let issued = IssuedToken::from_body(&json!({"access_token": "abc", "expires_in": 86400}))
            .expect("issued");
        assert_eq!(issued.access_token, "abc");
        assert_eq!(issued.expires_in, 86_400);

        let issued = IssuedToken::from_body(&json!({"access_token": "abc", "expires_in": "60"}))
            .expect("issued");
        assert_eq!(issued.expires_in, 60);

        assert!(IssuedToken::from_body(&json!({"access_token": "abc"})).is_none());
    }

    #[tokio::test]
    async fn test_client_credentials_fetch() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/access_token"))
            .and(query_param("client_id", "id"))
            .and(query_param("client_secret", "secret"))
            .and(query_param("grant_type", "client_credentials"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "fresh", "expires_in": 60})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = ClientConfig::new(mock_server.uri()).with_credentials("id", "secret");
        let auth = ClientCredentialsAuthenticator::new(reqwest::Client::new(), &config);

        let issued = auth.fetch_token().await.expect("token");
        assert_eq!(issued.access_token, "fresh");
        assert_eq!(issued.expires_in, 60);
    }

    #[tokio::test]
    async fn test_client_credentials_invalid_client() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/access_token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_client",
                "error_description": "client_id unknown"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let config =
            ClientConfig::new(mock_server.uri()).with_credentials("bad-id", "bad-secret");
        let auth = ClientCredentialsAuthenticator::new(reqwest::Client::new(), &config);

        let err = auth.fetch_token().await.expect_err("invalid client");
        assert!(err.is_fatal());
        let failure = err.failure().expect("failure");
        assert_eq!(failure.description.as_deref(), Some("client_id unknown"));
        assert!(!failure.request.to_string().contains("bad-secret"));
    }

    #[tokio::test]
    async fn test_client_credentials_empty_body_is_invalid_credentials() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/access_token"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let config = ClientConfig::new(mock_server.uri()).with_credentials("id", "secret");
        let auth = ClientCredentialsAuthenticator::new(reqwest::Client::new(), &config);

        let err = auth.fetch_token().await.expect_err("empty");
        assert!(matches!(err, BookerError::InvalidCredentials(_)));
    }
}
