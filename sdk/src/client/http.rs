//! HTTP client implementation.
//!
//! Provides the request executor: every call is stamped with the current
//! access token, classified, retried at most once, and unwrapped from the
//! vendor envelope.

use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::classify::{classify, Outcome};
use super::config::ClientConfig;
use super::envelope::unwrap_envelope;
use super::request::{to_json_body, RequestDescriptor};
use super::token::{Authenticator, ClientCredentialsAuthenticator, TokenManager, TokenStore};
use super::transport;
use crate::diagnostics::{IssueLogger, NoopIssueLogger};
use crate::error::{BookerError, Result};
use crate::types::{map_resources, Mapped, Resource, ResourceKind};

/// HTTP client for the Booker REST API.
pub struct BookerClient {
    config: ClientConfig,
    http: reqwest::Client,
    tokens: TokenManager,
    issues: Arc<dyn IssueLogger>,
}

impl BookerClient {
    /// Creates a new client that authenticates with the configured client
    /// credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = Self::build_http(&config)?;
        let authenticator = Arc::new(ClientCredentialsAuthenticator::new(http.clone(), &config));
        Self::assemble(config, http, authenticator)
    }

    /// Creates a new client that obtains tokens from `authenticator`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn with_authenticator(
        config: ClientConfig,
        authenticator: Arc<dyn Authenticator>,
    ) -> Result<Self> {
        let http = Self::build_http(&config)?;
        Self::assemble(config, http, authenticator)
    }

    /// Creates a new client from environment configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    fn build_http(config: &ClientConfig) -> Result<reqwest::Client> {
        config.validate()?;

        reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(BookerError::Http)
    }

    fn assemble(
        config: ClientConfig,
        http: reqwest::Client,
        authenticator: Arc<dyn Authenticator>,
    ) -> Result<Self> {
        let tokens = TokenManager::new(authenticator).with_token(
            config.access_token.clone(),
            config.access_token_expires_at,
        );

        Ok(Self {
            config,
            http,
            tokens,
            issues: Arc::new(NoopIssueLogger),
        })
    }

    /// Sets the store notified of every new access token.
    #[must_use]
    pub fn with_token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.tokens = self.tokens.with_store(store);
        self
    }

    /// Sets the hook that receives recoverable issues.
    #[must_use]
    pub fn with_issue_logger(mut self, logger: Arc<dyn IssueLogger>) -> Self {
        self.issues = logger;
        self
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the token manager.
    #[must_use]
    pub const fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    pub(crate) fn issues(&self) -> &dyn IssueLogger {
        self.issues.as_ref()
    }

    /// Returns a usable access token, fetching one if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if a new token cannot be obtained.
    pub async fn access_token(&self) -> Result<String> {
        self.tokens.current_token().await
    }

    /// GET `path` and map the payload into `R` records.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or a record does not fit `R`.
    pub async fn get<R: Resource>(
        &self,
        path: &str,
        query: Map<String, Value>,
    ) -> Result<Mapped<R>> {
        let kind = R::kind();
        let payload = self
            .execute(Method::GET, path, Some(query), None, Some(&kind))
            .await?;
        map_resources(payload)
    }

    /// GET `path` and return the unwrapped payload as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get_raw(&self, path: &str, query: Map<String, Value>) -> Result<Value> {
        self.execute(Method::GET, path, Some(query), None, None)
            .await
    }

    /// POST `body` to `path` and map the payload into `R` records.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be encoded, the request fails or
    /// a record does not fit `R`.
    pub async fn post<R: Resource, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Mapped<R>> {
        self.write_typed(Method::POST, path, body).await
    }

    /// POST `body` to `path` and return the unwrapped payload as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be encoded or the request fails.
    pub async fn post_raw<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        self.write_raw(Method::POST, path, body).await
    }

    /// PUT `body` to `path` and map the payload into `R` records.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be encoded, the request fails or
    /// a record does not fit `R`.
    pub async fn put<R: Resource, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Mapped<R>> {
        self.write_typed(Method::PUT, path, body).await
    }

    /// PUT `body` to `path` and return the unwrapped payload as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be encoded or the request fails.
    pub async fn put_raw<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        self.write_raw(Method::PUT, path, body).await
    }

    async fn write_typed<R: Resource, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Mapped<R>> {
        let body = to_json_body(body)?;
        let kind = R::kind();
        let payload = self
            .execute(method, path, None, Some(body), Some(&kind))
            .await?;
        map_resources(payload)
    }

    async fn write_raw<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Value> {
        let body = to_json_body(body)?;
        self.execute(method, path, None, Some(body), None).await
    }

    /// Sends `params` the way `method` expects them: as the query string
    /// for GET, as the JSON body otherwise.
    pub(crate) async fn send_params(
        &self,
        method: &Method,
        path: &str,
        params: Map<String, Value>,
        kind: Option<&ResourceKind>,
    ) -> Result<Value> {
        if *method == Method::GET {
            self.execute(method.clone(), path, Some(params), None, kind)
                .await
        } else {
            self.execute(method.clone(), path, None, Some(Value::Object(params)), kind)
                .await
        }
    }

    /// Executes one logical request and returns the unwrapped payload.
    ///
    /// At most one extra attempt is made. It follows a rejected token (after
    /// a refresh), an empty response, a vendor error, or a timeout on an
    /// idempotent call. Rejected client credentials abort immediately.
    ///
    /// # Errors
    ///
    /// Returns [`BookerError::InvalidCredentials`] on rejected credentials
    /// and [`BookerError::Api`] when the retry fails too.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        query: Option<Map<String, Value>>,
        body: Option<Value>,
        kind: Option<&ResourceKind>,
    ) -> Result<Value> {
        let request = RequestDescriptor::new(method, path, self.config.timeout)
            .with_query(query)
            .with_body(body);

        let first = match self.attempt(&request).await {
            Ok((_, outcome)) => Some(outcome),
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) if self.may_retry(&request, &err) => {
                warn!("{} {} failed, retrying once: {}", request.method, request.path, err);
                tokio::time::sleep(self.config.retry_delay).await;
                None
            }
            Err(err) => return Err(err),
        };

        match first {
            Some(Outcome::Usable(body)) => return Ok(unwrap_envelope(body, kind)),
            Some(Outcome::RefreshAndRetry) => {
                info!("Access token rejected on {}, refreshing", request.path);
                self.tokens.refresh().await?;
            }
            Some(Outcome::Empty) => {
                debug!("Empty response from {}, retrying once", request.path);
            }
            None => {}
        }

        match self.attempt(&request).await {
            Ok((_, Outcome::Usable(body))) => Ok(unwrap_envelope(body, kind)),
            Ok((stamped, Outcome::RefreshAndRetry)) => {
                self.tokens.refresh().await?;
                Err(BookerError::api(stamped, None))
            }
            Ok((stamped, Outcome::Empty)) => Err(BookerError::api(stamped, None)),
            Err(BookerError::Timeout) => Err(BookerError::api(request, None)),
            Err(err) => Err(err),
        }
    }

    /// One full cycle: stamp the token, send, classify.
    async fn attempt(&self, request: &RequestDescriptor) -> Result<(RequestDescriptor, Outcome)> {
        let token = self.tokens.current_token().await?;
        let stamped = request.with_access_token(&token);

        if self.config.debug {
            info!("BOOKER API REQUEST: {}", stamped);
        } else {
            debug!("{} {}", stamped.method, stamped.path);
        }

        let response = transport::send(&self.http, &self.config.base_url, &stamped).await?;

        if self.config.debug {
            info!("BOOKER API RESPONSE: {}", response);
        }

        let outcome = classify(&stamped, response)?;
        Ok((stamped, outcome))
    }

    fn may_retry(&self, request: &RequestDescriptor, err: &BookerError) -> bool {
        if matches!(err, BookerError::Timeout) {
            return request.is_idempotent() || self.config.retry_post_on_timeout;
        }
        err.is_retryable()
    }
}
