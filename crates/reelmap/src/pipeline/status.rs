//! Source lifecycle status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Processing status of a source.
///
/// ```text
/// queued -> processing -> processed
///                      -> extraction_failed
///                      -> geocode_failed
///                      -> error
/// ```
///
/// Everything except `Queued` and `Processing` is terminal; re-queuing
/// is an operator action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    Queued,
    Processing,
    Processed,
    ExtractionFailed,
    GeocodeFailed,
    Error,
}

impl SourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceStatus::Queued => "queued",
            SourceStatus::Processing => "processing",
            SourceStatus::Processed => "processed",
            SourceStatus::ExtractionFailed => "extraction_failed",
            SourceStatus::GeocodeFailed => "geocode_failed",
            SourceStatus::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, SourceStatus::Queued | SourceStatus::Processing)
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            SourceStatus::ExtractionFailed | SourceStatus::GeocodeFailed | SourceStatus::Error
        )
    }
}

impl fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(SourceStatus::Queued),
            "processing" => Ok(SourceStatus::Processing),
            "processed" => Ok(SourceStatus::Processed),
            "extraction_failed" => Ok(SourceStatus::ExtractionFailed),
            "geocode_failed" => Ok(SourceStatus::GeocodeFailed),
            "error" => Ok(SourceStatus::Error),
            other => Err(format!("unknown source status '{}'", other)),
        }
    }
}
