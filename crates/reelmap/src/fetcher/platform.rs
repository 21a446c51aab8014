//! Platform tag detection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

/// The social platform a source URL belongs to.
///
/// Decided once when the source is enqueued and stored on the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Tiktok,
    Unknown,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Youtube => "youtube",
            Platform::Tiktok => "tiktok",
            Platform::Unknown => "unknown",
        }
    }

    /// Detects the platform from a URL's host. Anything unparseable or
    /// unrecognised is `Unknown`.
    pub fn detect(raw_url: &str) -> Self {
        let Ok(url) = Url::parse(raw_url.trim()) else {
            return Platform::Unknown;
        };
        let Some(host) = url.host_str().map(|h| h.to_ascii_lowercase()) else {
            return Platform::Unknown;
        };

        if host_matches(&host, "youtube.com") || host_matches(&host, "youtu.be") {
            Platform::Youtube
        } else if host_matches(&host, "tiktok.com") {
            Platform::Tiktok
        } else {
            Platform::Unknown
        }
    }
}

/// True when `host` is `domain` or one of its subdomains.
pub(crate) fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "youtube" => Ok(Platform::Youtube),
            "tiktok" => Ok(Platform::Tiktok),
            "unknown" => Ok(Platform::Unknown),
            other => Err(format!("unknown platform '{}'", other)),
        }
    }
}
