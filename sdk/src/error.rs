//! SDK error types.
//!
//! Every failure the pipeline can surface is one [`BookerError`] variant.
//! Vendor-side failures carry an [`ApiFailure`] with the request that was
//! sent and whatever the server answered.

use std::fmt;

use crate::client::request::{RequestDescriptor, VendorResponse};

/// Result alias used across the SDK.
pub type Result<T> = std::result::Result<T, BookerError>;

/// Details of a failed vendor call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiFailure {
    /// The request as last attempted.
    pub request: RequestDescriptor,

    /// The server response, if one arrived.
    pub response: Option<VendorResponse>,

    /// Vendor error marker (`error` or `ErrorMessage`).
    pub error: Option<String>,

    /// Vendor error description (`error_description`).
    pub description: Option<String>,
}

impl ApiFailure {
    /// Builds a failure from a request and an optional response.
    #[must_use]
    pub fn new(request: RequestDescriptor, response: Option<VendorResponse>) -> Self {
        let error = response
            .as_ref()
            .and_then(VendorResponse::vendor_error)
            .map(str::to_string);
        let description = response
            .as_ref()
            .and_then(VendorResponse::error_description)
            .map(str::to_string);

        Self {
            request,
            response,
            error,
            description,
        }
    }

    /// Internal fault code embedded in the response body, if any.
    #[must_use]
    pub fn fault_code(&self) -> Option<i64> {
        self.response.as_ref().and_then(VendorResponse::fault_code)
    }

    /// HTTP status of the response, if one arrived.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.response.as_ref().map(|r| r.status)
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.error, &self.description) {
            (Some(error), Some(description)) => write!(f, "{}: {}", error, description)?,
            (Some(error), None) => write!(f, "{}", error)?,
            _ => match &self.response {
                Some(response) => write!(f, "status {}", response.status)?,
                None => write!(f, "no response")?,
            },
        }
        write!(f, " ({})", self.request)
    }
}

/// SDK errors.
#[derive(Debug, thiserror::Error)]
pub enum BookerError {
    /// The vendor rejected the client credentials. Never retried.
    #[error("invalid API credentials: {0}")]
    InvalidCredentials(Box<ApiFailure>),

    /// Any other vendor-reported failure, unsuccessful status or exhausted retry.
    #[error("API error: {0}")]
    Api(Box<ApiFailure>),

    /// The request timed out.
    #[error("request timeout")]
    Timeout,

    /// Transport failure other than a timeout.
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// Pagination parameters were rejected before any I/O.
    #[error("params must include valid PageSize, PageNumber and UsePaging")]
    InvalidPagination,

    /// A page result was not a sequence.
    #[error("Result from paginated request to {path} with params: {params} is not a collection")]
    NotACollection {
        /// Requested path.
        path: String,
        /// Page parameters, serialized as JSON.
        params: String,
    },

    /// A record could not be mapped into its resource type.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// A request body could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The token persistence callback failed.
    #[error("token store error: {0}")]
    TokenStore(String),
}

impl BookerError {
    /// Creates a generic API error.
    #[must_use]
    pub fn api(request: RequestDescriptor, response: Option<VendorResponse>) -> Self {
        Self::Api(Box::new(ApiFailure::new(request, response)))
    }

    /// Creates an invalid-credentials error.
    #[must_use]
    pub fn invalid_credentials(request: RequestDescriptor, response: Option<VendorResponse>) -> Self {
        Self::InvalidCredentials(Box::new(ApiFailure::new(request, response)))
    }

    /// Returns true if the error must abort without any retry.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::InvalidCredentials(_))
    }

    /// Returns true if one more attempt is allowed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Api(_) | Self::Timeout)
    }

    /// Vendor failure details, for `Api` and `InvalidCredentials`.
    #[must_use]
    pub fn failure(&self) -> Option<&ApiFailure> {
        match self {
            Self::Api(failure) | Self::InvalidCredentials(failure) => Some(failure),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for BookerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::Method;
    use serde_json::json;

    use super::*;

    fn request() -> RequestDescriptor {
        RequestDescriptor::new(Method::GET, "/locations", Duration::from_secs(120))
    }

    #[test]
    fn test_api_failure_reads_vendor_fields() {
        let response = VendorResponse {
            status: 401,
            body: json!({"error": "invalid_client", "error_description": "unknown id"}),
        };
        let failure = ApiFailure::new(request(), Some(response));
        assert_eq!(failure.error.as_deref(), Some("invalid_client"));
        assert_eq!(failure.description.as_deref(), Some("unknown id"));
        assert_eq!(failure.status(), Some(401));
    }

    #[test]
    fn test_error_display() {
        let err = BookerError::api(
            request(),
            Some(VendorResponse {
                status: 400,
                body: json!({"error": "bad_request"}),
            }),
        );
        assert_eq!(
            err.to_string(),
            "API error: bad_request (GET /locations timeout=120s)"
        );

        let err = BookerError::api(request(), None);
        assert_eq!(
            err.to_string(),
            "API error: no response (GET /locations timeout=120s)"
        );
    }

    #[test]
    fn test_pagination_error_messages() {
        assert_eq!(
            BookerError::InvalidPagination.to_string(),
            "params must include valid PageSize, PageNumber and UsePaging"
        );

        let err = BookerError::NotACollection {
            path: "/appointments".to_string(),
            params: r#"{"PageNumber":1}"#.to_string(),
        };
        assert_eq!(
            err.to_string(),
            r#"Result from paginated request to /appointments with params: {"PageNumber":1} is not a collection"#
        );
    }

    #[test]
    fn test_error_classes() {
        assert!(BookerError::invalid_credentials(request(), None).is_fatal());
        assert!(!BookerError::invalid_credentials(request(), None).is_retryable());
        assert!(BookerError::api(request(), None).is_retryable());
        assert!(BookerError::Timeout.is_retryable());
        assert!(!BookerError::InvalidPagination.is_retryable());
    }

    #[test]
    fn test_fault_code_through_error() {
        let err = BookerError::api(
            request(),
            Some(VendorResponse {
                status: 500,
                body: json!({"Fault": {"Detail": {"InternalErrorFault": {"ErrorCode": 100000}}}}),
            }),
        );
        assert_eq!(err.failure().and_then(ApiFailure::fault_code), Some(100_000));
    }
}
