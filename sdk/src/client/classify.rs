//! Response classification.
//!
//! Turns a decoded response into either a usable body, a request to refresh
//! the token and replay, or one of the error categories.

use serde_json::Value;

use super::request::{RequestDescriptor, VendorResponse};
use crate::error::{BookerError, Result};

/// Vendor marker for rejected client credentials.
pub const INVALID_CLIENT: &str = "invalid_client";

/// Vendor marker for an expired or revoked access token.
pub const INVALID_ACCESS_TOKEN: &str = "invalid access token";

/// What the caller should do with a response.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The body can be unwrapped and returned.
    Usable(Value),

    /// The server answered successfully with nothing in it.
    Empty,

    /// The token was rejected; fetch a new one and replay the request once.
    RefreshAndRetry,
}

/// Classifies `response` to `request`.
///
/// # Errors
///
/// Returns [`BookerError::InvalidCredentials`] for the `invalid_client`
/// marker and [`BookerError::Api`] for any other vendor error or an
/// unsuccessful status.
pub fn classify(request: &RequestDescriptor, response: VendorResponse) -> Result<Outcome> {
    match response.vendor_error() {
        Some(INVALID_CLIENT) => {
            return Err(BookerError::invalid_credentials(
                request.clone(),
                Some(response),
            ))
        }
        Some(INVALID_ACCESS_TOKEN) => return Ok(Outcome::RefreshAndRetry),
        Some(_) => return Err(BookerError::api(request.clone(), Some(response))),
        None => {}
    }

    if !response.is_success() {
        return Err(BookerError::api(request.clone(), Some(response)));
    }

    if response.is_empty() {
        return Ok(Outcome::Empty);
    }

    Ok(Outcome::Usable(response.body))
}
