//! TikTok metadata via the public oEmbed endpoint.

use reqwest::blocking::Client;
use serde_json::Value;
use url::Url;

use super::http::get_json;
use super::platform::host_matches;
use super::{ContentFetcher, FetchError, FetchedContent, Platform};

const OEMBED_URL: &str = "https://www.tiktok.com/oembed";

pub struct TiktokFetcher {
    client: Client,
}

impl TiktokFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl ContentFetcher for TiktokFetcher {
    fn platform(&self) -> Platform {
        Platform::Tiktok
    }

    fn validate_url(&self, url: &str) -> bool {
        is_tiktok_url(url)
    }

    fn extract_id(&self, url: &str) -> Option<String> {
        extract_video_id(url)
    }

    fn fetch(&self, url: &str) -> Result<FetchedContent, FetchError> {
        let video_id = self.identify(url)?;
        tracing::debug!(video_id = %video_id, "Fetching TikTok metadata");
        let body = get_json(&self.client, Platform::Tiktok, OEMBED_URL, &[("url", url)])?;
        Ok(parse_oembed_response(&video_id, body))
    }
}

pub fn is_tiktok_url(raw: &str) -> bool {
    Url::parse(raw.trim())
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
        .is_some_and(|h| host_matches(&h, "tiktok.com"))
}

/// Numeric id from `/@user/video/<id>`, or the short code from
/// `vm.tiktok.com/<code>` and `tiktok.com/t/<code>` share links.
pub fn extract_video_id(raw: &str) -> Option<String> {
    if !is_tiktok_url(raw) {
        return None;
    }
    let url = Url::parse(raw.trim()).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    if host == "vm.tiktok.com" || host == "vt.tiktok.com" {
        return segments
            .first()
            .filter(|code| is_short_code(code))
            .map(|code| code.to_string());
    }

    match segments.as_slice() {
        [user, "video", id, ..] if user.starts_with('@') && is_numeric_id(id) => {
            Some(id.to_string())
        }
        ["t", code, ..] if is_short_code(code) => Some(code.to_string()),
        _ => None,
    }
}

fn is_numeric_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= 32 && id.chars().all(|c| c.is_ascii_digit())
}

fn is_short_code(code: &str) -> bool {
    !code.is_empty() && code.len() <= 32 && code.chars().all(|c| c.is_ascii_alphanumeric())
}

/// The caption comes back as the oEmbed title; there is no separate
/// description.
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
