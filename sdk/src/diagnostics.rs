//! Issue reporting hook.
//!
//! Recoverable problems (currently: skipped pages) are reported through an
//! [`IssueLogger`] injected into the client. The default drops them; wire in
//! [`TracingIssueLogger`] or any closure to forward them to an error tracker.

use serde::Serialize;
use tracing::warn;

use crate::error::ApiFailure;

/// Context attached to a reported issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IssueContext {
    /// Vendor error marker.
    pub booker_error: Option<String>,

    /// Vendor error description.
    pub booker_error_description: Option<String>,

    /// The failed request, token redacted.
    pub booker_request: String,

    /// The response, if one arrived.
    pub booker_response: String,
}

impl From<&ApiFailure> for IssueContext {
    fn from(failure: &ApiFailure) -> Self {
        Self {
            booker_error: failure.error.clone(),
            booker_error_description: failure.description.clone(),
            booker_request: failure.request.to_string(),
            booker_response: failure
                .response
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        }
    }
}

/// Receives recoverable issues.
pub trait IssueLogger: Send + Sync {
    /// Reports one issue.
    fn log_issue(&self, message: &str, context: &IssueContext);
}

impl<F> IssueLogger for F
where
    F: Fn(&str, &IssueContext) + Send + Sync,
{
    fn log_issue(&self, message: &str, context: &IssueContext) {
        self(message, context);
    }
}

/// Drops every issue.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopIssueLogger;

impl IssueLogger for NoopIssueLogger {
    fn log_issue(&self, _message: &str, _context: &IssueContext) {}
}

/// Forwards issues to `tracing` at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingIssueLogger;

impl IssueLogger for TracingIssueLogger {
    fn log_issue(&self, message: &str, context: &IssueContext) {
        warn!(
            booker_error = context.booker_error.as_deref().unwrap_or_default(),
            booker_error_description = context
                .booker_error_description
                .as_deref()
                .unwrap_or_default(),
            booker_request = %context.booker_request,
            booker_response = %context.booker_response,
            "{}",
            message
        );
    }
}
