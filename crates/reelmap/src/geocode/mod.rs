//! Venue name plus location hint to coordinates.
//!
//! [`Geocoder`] is the seam the pipeline depends on; [`GoogleGeocoder`]
//! is the live implementation with retry and backoff.

pub mod backoff;
pub mod error;
pub mod google;
pub mod transport;

use std::fmt;

use serde::Serialize;

use crate::geo::GeoPoint;

pub use backoff::{RetryPolicy, Sleeper, ThreadSleeper};
pub use error::{GeocodeError, TransportError};
pub use google::GoogleGeocoder;
pub use transport::{GeocodeRequest, GeocodeResponse, GeocodeTransport, HttpTransport};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodeResult {
    /// The query as given, not the service's own name for the place.
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub place_id: String,
    pub types: Vec<String>,
}

impl GeocodeResult {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotFoundReason {
    ZeroResults,
    RetriesExhausted { attempts: u32, last_error: String },
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFoundReason::ZeroResults => write!(f, "no results"),
            NotFoundReason::RetriesExhausted {
                attempts,
                last_error,
            } => write!(f, "gave up after {attempts} attempts: {last_error}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeOutcome {
    Found(GeocodeResult),
    NotFound { reason: NotFoundReason },
}

pub trait Geocoder: Send + Sync {
    /// Resolves `query`, optionally narrowed by `hint_location`.
    ///
    /// Fails only on an empty query or a missing credential; a place the
    /// service cannot find is [`GeocodeOutcome::NotFound`].
    fn geocode(
        &self,
        query: &str,
        hint_location: Option<&str>,
    ) -> Result<GeocodeOutcome, GeocodeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_reason_display() {
        assert_eq!(NotFoundReason::ZeroResults.to_string(), "no results");
        let reason = NotFoundReason::RetriesExhausted {
            attempts: 3,
            last_error: "OVER_QUERY_LIMIT".to_string(),
        };
        assert_eq!(
            reason.to_string(),
            "gave up after 3 attempts: OVER_QUERY_LIMIT"
        );
    }
}
