use thiserror::Error;

use crate::db::DatabaseError;
use crate::fetcher::FetchError;
use crate::geocode::GeocodeError;

/// Failures while processing one source.
///
/// Inside an item every variant ends as status `error` with the message
/// stored on the source. Only a failure to record that status escapes
/// the item.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Source {0} not found")]
    SourceNotFound(i64),

    #[error("{0}")]
    Fetch(#[from] FetchError),

    #[error("{0}")]
    Geocode(#[from] GeocodeError),

    #[error("Geocoder returned invalid coordinates ({lat}, {lng})")]
    InvalidCoordinates { lat: f64, lng: f64 },

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Failed to serialize fetched content: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to build pipeline: {0}")]
    Setup(String),
}
