//! Relay forwarding to the internal service's `/sms/received` endpoint.

use reqwest::Client;
use tracing::info;

use super::ForwardError;
use crate::web::SmsEvent;

/// Relay a received SMS to the internal service endpoint.
///
/// The body carries the extracted fields exactly as received; the response
/// status is logged but never checked for success.
pub async fn relay_sms(
    client: &Client,
    base_url: &str,
    event: &SmsEvent,
) -> Result<(), ForwardError> {
    let url = format!("{}/sms/received", base_url.trim_end_matches('/'));

    let response = client
        .post(&url)
        .json(event)
        .send()
        .await
        .map_err(ForwardError::Relay)?;

    info!(
        url = %url,
        status_code = response.status().as_u16(),
        "relay_forwarded"
    );

    Ok(())
}
