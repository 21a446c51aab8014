//! Shared blocking HTTP plumbing for the live fetchers.

use std::time::Duration;

use reqwest::blocking::Client;

use super::{FetchError, Platform};
use crate::sanitize::{redact_url, truncate_body};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = concat!("reelmap/", env!("CARGO_PKG_VERSION"));

/// Creates an HTTP client with connect and request timeouts.
pub fn create_http_client(timeout_secs: u64) -> Result<Client, FetchError> {
    Client::builder()
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
        .timeout(Duration::from_secs(timeout_secs.max(1)))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| FetchError::Client(e.to_string()))
}

/// GETs `url` with `query` and decodes a JSON body.
///
/// Any transport failure, non-success status or undecodable body is
/// `FetchFailed`. The URL is redacted before it appears in an error.
pub(crate) fn get_json(
    client: &Client,
    platform: Platform,
    url: &str,
    query: &[(&str, &str)],
) -> Result<serde_json::Value, FetchError> {
    let failed = |reason: String| FetchError::FetchFailed { platform, reason };

    let response = client
        .get(url)
        .query(query)
        .send()
        .map_err(|e| failed(format!("request to {} failed: {}", redact_url(url), e.without_url())))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(failed(format!(
            "{} returned {}: {}",
            redact_url(url),
            status,
            truncate_body(&body)
        )));
    }

    response
        .json::<serde_json::Value>()
        .map_err(|e| failed(format!("invalid JSON from {}: {}", redact_url(url), e.without_url())))
}
