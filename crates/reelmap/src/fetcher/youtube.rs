//! YouTube metadata via the Data API, or oEmbed when no key is set.

use reqwest::blocking::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use url::Url;

use super::http::get_json;
use super::platform::host_matches;
use super::{ContentFetcher, FetchError, FetchedContent, Platform};

const DATA_API_URL: &str = "https://www.googleapis.com/youtube/v3/videos";
const OEMBED_URL: &str = "https://www.youtube.com/oembed";

/// Path prefixes that carry the video id as the next segment.
const ID_PATH_PREFIXES: &[&str] = &["shorts", "embed", "live", "v"];

pub struct YoutubeFetcher {
    client: Client,
    api_key: Option<SecretString>,
}

impl YoutubeFetcher {
    pub fn new(client: Client, api_key: Option<SecretString>) -> Self {
        Self { client, api_key }
    }

    fn fetch_data_api(&self, video_id: &str, key: &SecretString) -> Result<FetchedContent, FetchError> {
        let body = get_json(
            &self.client,
            Platform::Youtube,
            DATA_API_URL,
            &[("part", "snippet"), ("id", video_id), ("key", key.expose_secret())],
        )?;
        parse_data_api_response(video_id, body).ok_or_else(|| FetchError::FetchFailed {
            platform: Platform::Youtube,
            reason: format!("video {} not found", video_id),
        })
    }

    fn fetch_oembed(&self, url: &str, video_id: &str) -> Result<FetchedContent, FetchError> {
        let body = get_json(
            &self.client,
            Platform::Youtube,
            OEMBED_URL,
            &[("url", url), ("format", "json")],
        )?;
        Ok(parse_oembed_response(video_id, body))
    }
}

impl ContentFetcher for YoutubeFetcher {
    fn platform(&self) -> Platform {
        Platform::Youtube
    }

    fn validate_url(&self, url: &str) -> bool {
        is_youtube_url(url)
    }

    fn extract_id(&self, url: &str) -> Option<String> {
        extract_video_id(url)
    }

    fn fetch(&self, url: &str) -> Result<FetchedContent, FetchError> {
        let video_id = self.identify(url)?;
        tracing::debug!(video_id = %video_id, "Fetching YouTube metadata");
        match &self.api_key {
            Some(key) => self.fetch_data_api(&video_id, key),
            None => self.fetch_oembed(url, &video_id),
        }
    }
}

pub fn is_youtube_url(raw: &str) -> bool {
    Url::parse(raw.trim())
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
        .is_some_and(|h| host_matches(&h, "youtube.com") || host_matches(&h, "youtu.be"))
}

/// Reads the video id from `watch?v=`, `/shorts/`, `/embed/`, `/live/`
/// and `youtu.be/` URLs.
pub fn extract_video_id(raw: &str) -> Option<String> {
    if !is_youtube_url(raw) {
        return None;
    }
    let url = Url::parse(raw.trim()).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    let candidate = if host_matches(&host, "youtu.be") {
        segments.first().map(|s| s.to_string())
    } else {
        match segments.as_slice() {
            ["watch", ..] => url
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned()),
            [prefix, id, ..] if ID_PATH_PREFIXES.contains(prefix) => Some(id.to_string()),
            _ => None,
        }
    };

    candidate.filter(|id| is_valid_id(id))
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Picks title, description and best thumbnail out of a
/// `videos?part=snippet` response. `None` when the video wasn't returned.
pub(crate) fn parse_data_api_response(video_id: &str, body: Value) -> Option<FetchedContent> {
    let snippet = body.get("items")?.as_array()?.first()?.get("snippet")?.clone();
    let text = |key: &str| {
        snippet
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let thumbnail_url = ["maxres", "high", "medium", "default"]
        .iter()
        .find_map(|size| snippet.pointer(&format!("/thumbnails/{}/url", size)))
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(FetchedContent {
        platform_id: Some(video_id.to_string()),
        title: text("title"),
        description: text("description"),
        thumbnail_url,
        raw: body,
    })
}

/// oEmbed carries only the title and thumbnail, never a description.
pub(crate) fn parse_oembed_response(video_id: &str, body: Value) -> FetchedContent {
    let text = |key: &str| body.get(key).and_then(Value::as_str).map(str::to_string);
    FetchedContent {
        platform_id: Some(video_id.to_string()),
        title: text("title").unwrap_or_default(),
        description: String::new(),
        thumbnail_url: text("thumbnail_url"),
        raw: body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_urls() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?t=42",
        ] {
            assert!(is_youtube_url(url), "{url}");
            assert_eq!(extract_video_id(url).as_deref(), Some("dQw4w9WgXcQ"), "{url}");
        }
    }

    #[test]
    fn test_invalid_urls() {
        assert!(!is_youtube_url("https://vimeo.com/123"));
        assert!(!is_youtube_url("ftp://youtube.com/watch?v=x"));
        assert!(!is_youtube_url("youtube.com/watch?v=x"));
        assert!(extract_video_id("https://vimeo.com/123").is_none());
    }

    #[test]
    fn test_youtube_url_without_id() {
        assert!(is_youtube_url("https://www.youtube.com/feed/trending"));
        assert!(extract_video_id("https://www.youtube.com/feed/trending").is_none());
        assert!(extract_video_id("https://www.youtube.com/watch").is_none());
        assert!(extract_video_id("https://youtu.be/").is_none());
        assert!(extract_video_id("https://www.youtube.com/watch?v=bad%20id").is_none());
    }

    #[test]
    fn test_parse_data_api_response() {
        let body = json!({
            "items": [{
                "id": "abc",
                "snippet": {
                    "title": "BEST Pizza in New York City",
                    "description": "We visited Joe's Pizza in NYC",
                    "thumbnails": {
                        "default": { "url": "https://i.ytimg.com/vi/abc/default.jpg" },
                        "high": { "url": "https://i.ytimg.com/vi/abc/hqdefault.jpg" }
                    }
                }
            }]
        });
        let content = parse_data_api_response("abc", body).unwrap();
        assert_eq!(content.title, "BEST Pizza in New York City");
        assert_eq!(content.description, "We visited Joe's Pizza in NYC");
        assert_eq!(
            content.thumbnail_url.as_deref(),
            Some("https://i.ytimg.com/vi/abc/hqdefault.jpg")
        );
        assert_eq!(content.platform_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_parse_data_api_empty_items() {
        assert!(parse_data_api_response("abc", json!({ "items": [] })).is_none());
    }

    #[test]
    fn test_parse_oembed_response() {
        let body = json!({
            "title": "Joe's Pizza review",
            "author_name": "Food Channel",
            "thumbnail_url": "https://i.ytimg.com/vi/abc/hqdefault.jpg"
        });
        let content = parse_oembed_response("abc", body);
        assert_eq!(content.title, "Joe's Pizza review");
        assert!(content.description.is_empty());
        assert!(content.thumbnail_url.is_some());
    }
}
