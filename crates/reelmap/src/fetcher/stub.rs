//! Canned metadata for development runs without network access.

use super::{tiktok, youtube, ContentFetcher, FetchError, FetchedContent, Platform};

/// Serves fixed titles and descriptions chosen by keywords in the URL.
///
/// URL validation and id extraction are the real ones, so invalid URLs
/// still fail the way they would in live mode.
#[derive(Debug, Clone, Copy)]
pub struct StubFetcher {
    platform: Platform,
}

impl StubFetcher {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

impl ContentFetcher for StubFetcher {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn validate_url(&self, url: &str) -> bool {
        match self.platform {
            Platform::Youtube => youtube::is_youtube_url(url),
            Platform::Tiktok => tiktok::is_tiktok_url(url),
            Platform::Unknown => url::Url::parse(url).is_ok(),
        }
    }

    fn extract_id(&self, url: &str) -> Option<String> {
        match self.platform {
            Platform::Youtube => youtube::extract_video_id(url),
            Platform::Tiktok => tiktok::extract_video_id(url),
            Platform::Unknown => None,
        }
    }

    fn fetch(&self, url: &str) -> Result<FetchedContent, FetchError> {
        let video_id = self.identify(url)?;
        let (title, description, thumbnail) = canned(self.platform, url);
        Ok(FetchedContent {
            platform_id: Some(video_id),
            title: title.to_string(),
            description: description.to_string(),
            thumbnail_url: Some(thumbnail.to_string()),
            raw: serde_json::Value::Null,
        })
    }
}

fn canned(platform: Platform, url: &str) -> (&'static str, &'static str, &'static str) {
    let url = url.to_lowercase();
    match platform {
        Platform::Youtube if url.contains("pizza") => (
            "BEST Pizza in New York City",
            "We visited Joe's Pizza in NYC and it was amazing! The classic slice is perfect.",
            "https://example.com/pizza.jpg",
        ),
        Platform::Youtube if url.contains("burger") => (
            "Ultimate Burger Guide: Los Angeles",
            "In-N-Out Burger is a California institution. Double-double animal style!",
            "https://example.com/burger.jpg",
        ),
        Platform::Youtube => (
            "Amazing Street Food Tour",
            "Exploring the best food trucks in Austin, Texas. BBQ heaven!",
            "https://example.com/food.jpg",
        ),
        _ => (
            "Food Review",
            "Trying out this restaurant downtown",
            "https://example.com/generic.jpg",
        ),
    }
}
