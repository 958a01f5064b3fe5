//! Request descriptors and decoded vendor responses.
//!
//! A [`RequestDescriptor`] is built once per logical call and re-stamped with
//! the current access token before every attempt. A [`VendorResponse`] is
//! the decoded body of whatever the server sent back, kept around so errors
//! can carry it for diagnostics.

use std::fmt;
use std::time::Duration;

use reqwest::{Method, Url};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{BookerError, Result};

/// Name of the parameter that carries the access token.
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Content type sent with every request.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

const REDACTED: &str = "[redacted]";

const SECRET_PARAMS: [&str; 2] = [ACCESS_TOKEN_PARAM, "client_secret"];

/// Everything needed to issue (and re-issue) one HTTP call.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    /// HTTP method.
    pub method: Method,

    /// Path relative to the configured base URL.
    pub path: String,

    /// Query parameters, attached for GET-style calls.
    pub query: Option<Map<String, Value>>,

    /// JSON body, attached for POST/PUT calls.
    pub body: Option<Value>,

    /// Fixed per-call timeout.
    pub timeout: Duration,
}

impl RequestDescriptor {
    /// Creates a descriptor with no query and no body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            body: None,
            timeout,
        }
    }

    /// Attaches query parameters. Empty maps are dropped.
    #[must_use]
    pub fn with_query(mut self, query: Option<Map<String, Value>>) -> Self {
        self.query = query.filter(|q| !q.is_empty());
        self
    }

    /// Attaches a JSON body. `null` bodies are dropped.
    #[must_use]
    pub fn with_body(mut self, body: Option<Value>) -> Self {
        self.body = body.filter(|b| !b.is_null());
        self
    }

    /// Returns true for methods that can be replayed after an ambiguous failure.
    #[must_use]
    pub fn is_idempotent(&self) -> bool {
        self.method == Method::GET || self.method == Method::PUT
    }

    /// Returns a copy carrying `token`.
    ///
    /// GET calls get it as a query parameter. Calls with an object body get
    /// it as a body field. Any earlier token is overwritten.
    #[must_use]
    pub fn with_access_token(&self, token: &str) -> Self {
        let mut stamped = self.clone();

        match stamped.body.as_mut() {
            Some(Value::Object(body)) if stamped.method != Method::GET => {
                body.insert(ACCESS_TOKEN_PARAM.to_string(), Value::from(token));
            }
            _ => {
                stamped
                    .query
                    .get_or_insert_with(Map::new)
                    .insert(ACCESS_TOKEN_PARAM.to_string(), Value::from(token));
            }
        }

        stamped
    }

    /// Builds the absolute URL, query string included.
    ///
    /// # Errors
    ///
    /// Returns [`BookerError::InvalidConfig`] if the joined URL does not parse.
    pub fn url(&self, base_url: &str) -> Result<Url> {
        let raw = format!("{}{}", base_url, self.path);
        let mut url = Url::parse(&raw)
            .map_err(|e| BookerError::InvalidConfig(format!("invalid url {}: {}", raw, e)))?;

        if let Some(query) = &self.query {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, &query_value(value));
            }
        }

        Ok(url)
    }

    /// Encodes the body, if any.
    ///
    /// # Errors
    ///
    /// Returns [`BookerError::Serialization`] if encoding fails.
    pub fn encoded_body(&self) -> Result<Option<Vec<u8>>> {
        self.body
            .as_ref()
            .map(|b| serde_json::to_vec(b).map_err(|e| BookerError::Serialization(e.to_string())))
            .transpose()
    }
}

impl fmt::Display for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)?;
        if let Some(query) = &self.query {
            write!(f, " query={}", Value::Object(redact(query)))?;
        }
        match &self.body {
            Some(Value::Object(body)) => write!(f, " body={}", Value::Object(redact(body)))?,
            Some(other) => write!(f, " body={}", other)?,
            None => {}
        }
        write!(f, " timeout={}s", self.timeout.as_secs())
    }
}

/// Copy of `params` with the access token and client secret masked.
#[must_use]
pub fn redact(params: &Map<String, Value>) -> Map<String, Value> {
    params
        .iter()
        .map(|(k, v)| {
            if SECRET_PARAMS.contains(&k.as_str()) {
                (k.clone(), Value::from(REDACTED))
            } else {
                (k.clone(), v.clone())
            }
        })
        .collect()
}

/// Copy of `params` without the access token at all.
#[must_use]
pub fn without_token(params: &Map<String, Value>) -> Map<String, Value> {
    params
        .iter()
        .filter(|(k, _)| k.as_str() != ACCESS_TOKEN_PARAM)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Encodes a request body as JSON.
///
/// # Errors
///
/// Returns [`BookerError::Serialization`] if `body` cannot be encoded.
pub fn to_json_body<B: Serialize + ?Sized>(body: &B) -> Result<Value> {
    serde_json::to_value(body).map_err(|e| BookerError::Serialization(e.to_string()))
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Decoded response as received from the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorResponse {
    /// HTTP status code.
    pub status: u16,

    /// Decoded body. Non-JSON bodies are kept as a string.
    pub body: Value,
}

impl VendorResponse {
    /// Creates a response from a status and raw body text.
    #[must_use]
    pub fn from_text(status: u16, text: &str) -> Self {
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
        };
        Self { status, body }
    }

    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns true when the server sent nothing usable back.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match &self.body {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Vendor error marker, from `error` or `ErrorMessage`.
    #[must_use]
    pub fn vendor_error(&self) -> Option<&str> {
        ["error", "ErrorMessage"]
            .iter()
            .filter_map(|key| self.body.get(key))
            .find_map(|v| v.as_str().filter(|s| !s.is_empty()))
    }

    /// Vendor error description, from `error_description`.
    #[must_use]
    pub fn error_description(&self) -> Option<&str> {
        self.body.get("error_description").and_then(Value::as_str)
    }

    /// Internal fault code at `Fault.Detail.InternalErrorFault.ErrorCode`.
    ///
    /// The vendor sends it either as a number or as a numeric string.
    #[must_use]
    pub fn fault_code(&self) -> Option<i64> {
        let code = self
            .body
            .pointer("/Fault/Detail/InternalErrorFault/ErrorCode")?;
        match code {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for VendorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.body)
    }
}
