//! WGS84 points, bounding boxes and great-circle distance.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Lower bound for meters per degree of latitude, so boxes err on the large side.
const METERS_PER_DEGREE: f64 = 111_000.0;

/// A single WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns true when both coordinates are finite and inside WGS84 range.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Great-circle distance to `other` in meters (haversine).
    pub fn distance_m(&self, other: &GeoPoint) -> f64 {
        haversine_m(self.lat, self.lng, other.lat, other.lng)
    }
}

/// Haversine distance between two lat/lng points in meters.
pub fn haversine_m(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlng = (lng2 - lng1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// Axis-aligned box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Box that contains every point within `radius_m` of `center`.
    ///
    /// Slightly larger than the circle so it can be used as a coarse
    /// prefilter before an exact distance check.
    pub fn around(center: GeoPoint, radius_m: f64) -> Self {
        let dlat = radius_m / METERS_PER_DEGREE;
        let cos_lat = center.lat.to_radians().cos().abs().max(1e-6);
        let dlng = (radius_m / (METERS_PER_DEGREE * cos_lat)).min(180.0);
        Self {
            min_lng: center.lng - dlng,
            min_lat: center.lat - dlat,
            max_lng: center.lng + dlng,
            max_lat: center.lat + dlat,
        }
    }

    /// Pieces of this box inside the valid longitude range.
    ///
    /// A box from [`around`](Self::around) near ±180° reaches past the
    /// antimeridian; the overhang comes back as a second box on the other
    /// side. Latitudes are clamped to ±90°.
    pub fn split_at_antimeridian(&self) -> Vec<BoundingBox> {
        let min_lat = self.min_lat.max(-90.0);
        let max_lat = self.max_lat.min(90.0);
        let part = |min_lng: f64, max_lng: f64| BoundingBox {
            min_lng,
            min_lat,
            max_lng,
            max_lat,
        };

        if self.max_lng - self.min_lng >= 360.0 {
            vec![part(-180.0, 180.0)]
        } else if self.min_lng < -180.0 {
            vec![part(-180.0, self.max_lng), part(self.min_lng + 360.0, 180.0)]
        } else if self.max_lng > 180.0 {
            vec![part(self.min_lng, 180.0), part(-180.0, self.max_lng - 360.0)]
        } else {
            vec![part(self.min_lng, self.max_lng)]
        }
    }

    /// Parses `minLng,minLat,maxLng,maxLat`.
    pub fn parse(raw: &str) -> Option<Self> {
        let parts: Vec<f64> = raw
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .ok()?;
        let [min_lng, min_lat, max_lng, max_lat] = parts.as_slice() else {
            return None;
        };
        let bbox = Self {
            min_lng: *min_lng,
            min_lat: *min_lat,
            max_lng: *max_lng,
            max_lat: *max_lat,
        };
        let corners_valid = GeoPoint::new(bbox.min_lat, bbox.min_lng).is_valid()
            && GeoPoint::new(bbox.max_lat, bbox.max_lng).is_valid();
        (corners_valid && bbox.min_lng <= bbox.max_lng && bbox.min_lat <= bbox.max_lat)
            .then_some(bbox)
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat)
            && (self.min_lng..=self.max_lng).contains(&point.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_zero() {
        assert_eq!(haversine_m(40.7, -74.0, 40.7, -74.0), 0.0);
    }

    #[test]
    fn test_haversine_known_distance() {
        // Times Square to Empire State Building, roughly 1.1 km.
        let d = haversine_m(40.7580, -73.9855, 40.7484, -73.9857);
        assert!((1000.0..1200.0).contains(&d), "got {d}");
    }

    #[test]
    fn test_fifty_meters_north() {
        let a = GeoPoint::new(40.7306, -73.9866);
        let b = GeoPoint::new(40.7306 + 50.0 / 111_195.0, -73.9866);
        let d = a.distance_m(&b);
        assert!((d - 50.0).abs() < 0.5, "got {d}");
    }

    #[test]
    fn test_bbox_around_contains_radius() {
        let center = GeoPoint::new(40.7306, -73.9866);
        let bbox = BoundingBox::around(center, 100.0);
        let east = GeoPoint::new(40.7306, -73.9866 + 99.0 / (111_195.0 * 40.7306f64.to_radians().cos()));
        assert!(bbox.contains(&center));
        assert!(bbox.contains(&east));
        assert!(!bbox.contains(&GeoPoint::new(40.75, -73.9866)));
    }

    #[test]
    fn test_bbox_split_inside_range_is_unchanged() {
        let bbox = BoundingBox::around(GeoPoint::new(40.7306, -73.9866), 100.0);
        assert_eq!(bbox.split_at_antimeridian(), vec![bbox]);
    }

    #[test]
    fn test_bbox_split_across_antimeridian() {
        // Suva sits just west of the dateline.
        let center = GeoPoint::new(-18.0, 179.9995);
        let parts = BoundingBox::around(center, 200.0).split_at_antimeridian();
        assert_eq!(parts.len(), 2);

        let across = GeoPoint::new(-18.0, -179.9995);
        assert!(center.distance_m(&across) < 200.0);
        assert!(parts.iter().any(|p| p.contains(&center)));
        assert!(parts.iter().any(|p| p.contains(&across)));
        assert!(parts
            .iter()
            .all(|p| p.min_lng >= -180.0 && p.max_lng <= 180.0));
    }

    #[test]
    fn test_bbox_split_near_pole_covers_all_longitudes() {
        let parts = BoundingBox::around(GeoPoint::new(89.99999, 10.0), 5_000.0)
            .split_at_antimeridian();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].min_lng, -180.0);
        assert_eq!(parts[0].max_lng, 180.0);
        assert_eq!(parts[0].max_lat, 90.0);
    }

    #[test]
    fn test_bbox_parse() {
        let bbox = BoundingBox::parse("-74.1, 40.6,-73.9,40.8").unwrap();
        assert_eq!(bbox.min_lng, -74.1);
        assert_eq!(bbox.max_lat, 40.8);
    }

    #[test]
    fn test_bbox_parse_rejects_bad_input() {
        assert!(BoundingBox::parse("").is_none());
        assert!(BoundingBox::parse("1,2,3").is_none());
        assert!(BoundingBox::parse("a,b,c,d").is_none());
        assert!(BoundingBox::parse("10,10,0,0").is_none());
        assert!(BoundingBox::parse("-200,0,0,10").is_none());
    }

    #[test]
    fn test_point_validity() {
        assert!(GeoPoint::new(0.0, 0.0).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, f64::NAN).is_valid());
    }
}
