//! Geocoder error types.
//!
//! "Not found" is an outcome, not an error; see
//! [`GeocodeOutcome`](super::GeocodeOutcome).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("Geocode query is empty")]
    InvalidQuery,

    #[error("Geocoder is not configured: {0}")]
    Configuration(String),
}

/// One failed request to the geocoding service. Retried by the geocoder.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    Decode(String),
}
