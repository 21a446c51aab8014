//! Content fetcher error types.

use thiserror::Error;

use super::Platform;

#[derive(Error, Debug)]
pub enum FetchError {
    /// The URL is not a URL of the platform the fetcher serves.
    #[error("Invalid {platform} URL: {url}")]
    InvalidUrl { platform: Platform, url: String },

    /// The URL looks right but carries no usable video identifier.
    #[error("No {platform} video identifier in URL: {url}")]
    IdentifierNotFound { platform: Platform, url: String },

    /// Network or API failure while retrieving metadata. Not retried.
    #[error("Fetching {platform} metadata failed: {reason}")]
    FetchFailed { platform: Platform, reason: String },

    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}
