//! Single HTTP round trip.

use reqwest::header::CONTENT_TYPE;

use super::request::{RequestDescriptor, VendorResponse, JSON_CONTENT_TYPE};
use crate::error::Result;

/// Issues `request` once and decodes whatever comes back.
///
/// Non-2xx statuses are not errors here; the classifier decides.
///
/// # Errors
///
/// Returns [`crate::BookerError::Timeout`] on timeout and
/// [`crate::BookerError::Http`] on any other transport failure.
pub(crate) async fn send(
    http: &reqwest::Client,
    base_url: &str,
    request: &RequestDescriptor,
) -> Result<VendorResponse> {
    let url = request.url(base_url)?;

    let mut builder = http
        .request(request.method.clone(), url)
        .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
        .timeout(request.timeout);

    if let Some(body) = request.encoded_body()? {
        builder = builder.body(body);
    }

    let response = builder.send().await?;
    let status = response.status().as_u16();
    let text = response.text().await?;

    Ok(VendorResponse::from_text(status, &text))
}
