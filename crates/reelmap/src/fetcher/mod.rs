//! Platform content fetchers.
//!
//! Every platform implements [`ContentFetcher`]: URL validation,
//! identifier extraction and a metadata fetch. The [`FetcherRegistry`]
//! maps the platform tag stored on a source to its fetcher; unknown
//! platforms fall back to [`NullFetcher`].

pub mod error;
pub mod http;
pub mod null;
pub mod platform;
pub mod stub;
pub mod tiktok;
pub mod youtube;

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{FetchConfig, FetchMode};

pub use error::FetchError;
pub use null::NullFetcher;
pub use platform::Platform;
pub use stub::StubFetcher;
pub use tiktok::TiktokFetcher;
pub use youtube::YoutubeFetcher;

/// Metadata retrieved for one source.
///
/// Serialized as-is into `sources.raw_data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchedContent {
    pub platform_id: Option<String>,
    pub title: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    /// The untouched API response, when there was one.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub raw: serde_json::Value,
}

impl FetchedContent {
    /// Title and description joined for text analysis.
    pub fn analysis_text(&self) -> String {
        format!("{} {}", self.title, self.description)
            .trim()
            .to_string()
    }
}

pub trait ContentFetcher: Send + Sync {
    fn platform(&self) -> Platform;

    /// True when `url` belongs to this fetcher's platform.
    fn validate_url(&self, url: &str) -> bool;

    /// The platform-native video identifier, if one can be read from `url`.
    fn extract_id(&self, url: &str) -> Option<String>;

    fn fetch(&self, url: &str) -> Result<FetchedContent, FetchError>;

    /// Validates `url` and extracts its identifier, mapping each failure
    /// to its error.
    fn identify(&self, url: &str) -> Result<String, FetchError> {
        if !self.validate_url(url) {
            return Err(FetchError::InvalidUrl {
                platform: self.platform(),
                url: url.to_string(),
            });
        }
        self.extract_id(url)
            .ok_or_else(|| FetchError::IdentifierNotFound {
                platform: self.platform(),
                url: url.to_string(),
            })
    }
}

/// Closed mapping from platform tag to fetcher.
#[derive(Clone)]
pub struct FetcherRegistry {
    fetchers: HashMap<Platform, Arc<dyn ContentFetcher>>,
    fallback: Arc<dyn ContentFetcher>,
}

impl FetcherRegistry {
    /// A registry with only the null fallback.
    pub fn empty() -> Self {
        Self {
            fetchers: HashMap::new(),
            fallback: Arc::new(NullFetcher),
        }
    }

    /// Builds the registry for the configured fetch mode.
    pub fn from_config(config: &FetchConfig) -> Result<Self, FetchError> {
        let registry = match config.mode {
            FetchMode::Stub => Self::empty()
                .with(Arc::new(StubFetcher::new(Platform::Youtube)))
                .with(Arc::new(StubFetcher::new(Platform::Tiktok))),
            FetchMode::Live => {
                let client = http::create_http_client(config.timeout_secs)?;
                let youtube_key = config
                    .youtube_api_key()
                    .map_err(|e| FetchError::Client(e.to_string()))?;
                if youtube_key.is_none() {
                    tracing::info!("No YouTube API key configured, using oEmbed metadata only");
                }
                Self::empty()
                    .with(Arc::new(YoutubeFetcher::new(client.clone(), youtube_key)))
                    .with(Arc::new(TiktokFetcher::new(client)))
            }
        };
        Ok(registry)
    }

    /// Registers `fetcher` for its platform, replacing any previous one.
    pub fn with(mut self, fetcher: Arc<dyn ContentFetcher>) -> Self {
        self.fetchers.insert(fetcher.platform(), fetcher);
        self
    }

    pub fn get(&self, platform: Platform) -> &dyn ContentFetcher {
        self.fetchers
            .get(&platform)
            .map(|f| f.as_ref())
            .unwrap_or(self.fallback.as_ref())
    }
}

impl Default for FetcherRegistry {
    fn default() -> Self {
        Self::empty()
    }
}
