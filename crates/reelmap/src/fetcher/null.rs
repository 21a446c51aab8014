//! Fallback for platforms without a fetcher.

use super::{ContentFetcher, FetchError, FetchedContent, Platform};

/// Returns empty metadata for any URL. The pipeline then analyses the URL
/// text on its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFetcher;

impl ContentFetcher for NullFetcher {
    fn platform(&self) -> Platform {
        Platform::Unknown
    }

    fn validate_url(&self, url: &str) -> bool {
        url::Url::parse(url.trim()).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
    }

    fn extract_id(&self, _url: &str) -> Option<String> {
        None
    }

    fn fetch(&self, _url: &str) -> Result<FetchedContent, FetchError> {
        Ok(FetchedContent::default())
    }
}
