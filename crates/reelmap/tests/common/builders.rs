//! Builders for test data.

#![allow(dead_code)]

use reelmap::db::place_repo::NewPlace;
use reelmap::fetcher::FetchedContent;
use reelmap::geo::GeoPoint;
use reelmap::geocode::{GeocodeOutcome, GeocodeResult};
use reelmap::places::slugify;

pub const JOES_NYC: (f64, f64) = (40.7305, -74.0021);
pub const JOES_LA: (f64, f64) = (34.0522, -118.2437);

/// Fetched metadata with a title and description.
pub fn content(title: &str, description: &str) -> FetchedContent {
    FetchedContent {
        platform_id: Some("abc123".to_string()),
        title: title.to_string(),
        description: description.to_string(),
        thumbnail_url: Some("https://i.ytimg.com/vi/abc123/hqdefault.jpg".to_string()),
        raw: serde_json::Value::Null,
    }
}

/// The canonical pizza video.
pub fn joes_pizza_video() -> FetchedContent {
    content(
        "BEST Pizza in New York City",
        "We visited Joe's Pizza in NYC and it was amazing! The classic slice is perfect.",
    )
}

/// Builder for a successful geocoder answer.
pub struct FoundBuilder {
    result: GeocodeResult,
}

impl FoundBuilder {
    pub fn new(name: &str, (lat, lng): (f64, f64)) -> Self {
        Self {
            result: GeocodeResult {
                name: name.to_string(),
                address: String::new(),
                lat,
                lng,
                place_id: format!("pid-{}", slugify(name)),
                types: vec!["restaurant".to_string()],
            },
        }
    }

    pub fn address(mut self, address: &str) -> Self {
        self.result.address = address.to_string();
        self
    }

    pub fn place_id(mut self, place_id: &str) -> Self {
        self.result.place_id = place_id.to_string();
        self
    }

    pub fn build(self) -> GeocodeOutcome {
        GeocodeOutcome::Found(self.result)
    }
}

pub fn found(name: &str, at: (f64, f64)) -> FoundBuilder {
    FoundBuilder::new(name, at)
}

/// A place row to insert directly.
pub fn new_place(name: &str, (lat, lng): (f64, f64)) -> NewPlace {
    NewPlace {
        name: name.to_string(),
        slug: slugify(name),
        point: Some(GeoPoint::new(lat, lng)),
        ..Default::default()
    }
}

/// `origin` moved `meters` due north.
pub fn north_of((lat, lng): (f64, f64), meters: f64) -> (f64, f64) {
    (lat + meters / 111_195.0, lng)
}
