//! Read-side queries for the map: listing and detail.

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::db::place_repo::{self, PlaceFilter, PlaceRow, PlaceWithCount};
use crate::db::review_repo::{self, ReviewWithSource};
use crate::db::{Database, DatabaseError};
use crate::fetcher::Platform;
use crate::geo::BoundingBox;

/// Page size when the caller doesn't pass one.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid bbox '{0}', expected 'minLng,minLat,maxLng,maxLat'")]
    InvalidBoundingBox(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Listing request as it arrives from a caller.
#[derive(Debug, Clone, Default)]
pub struct PlaceQuery {
    /// `minLng,minLat,maxLng,maxLat`.
    pub bbox: Option<String>,
    pub q: Option<String>,
    pub before_id: Option<i64>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceSummary {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PlaceRow> for PlaceSummary {
    fn from(row: PlaceRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            address: row.address,
            city: row.city,
            state: row.state,
            country: row.country,
            postal_code: row.postal_code,
            lat: row.latitude,
            lng: row.longitude,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceListItem {
    #[serde(flatten)]
    pub place: PlaceSummary,
    pub review_count: u64,
}

/// One page of places, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacePage {
    pub places: Vec<PlaceListItem>,
    /// Pass as `before_id` to fetch the next page. `None` on the last page.
    pub next_cursor: Option<i64>,
    pub limit: u32,
}

impl PlacePage {
    /// Renders the page as a GeoJSON FeatureCollection for map clients.
    ///
    /// Places without coordinates get a `null` geometry.
    pub fn to_geojson(&self) -> Value {
        let features: Vec<Value> = self
            .places
            .iter()
            .map(|item| {
                let p = &item.place;
                let geometry = match (p.lng, p.lat) {
                    (Some(lng), Some(lat)) => json!({ "type": "Point", "coordinates": [lng, lat] }),
                    _ => Value::Null,
                };
                json!({
                    "type": "Feature",
                    "geometry": geometry,
                    "properties": {
                        "id": p.id,
                        "name": p.name,
                        "slug": p.slug,
                        "address": p.address,
                        "city": p.city,
                        "state": p.state,
                        "country": p.country,
                        "review_count": item.review_count,
                    }
                })
            })
            .collect();

        json!({
            "type": "FeatureCollection",
            "features": features,
            "metadata": {
                "limit": self.limit,
                "next_cursor": self.next_cursor,
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceSummary {
    pub id: i64,
    pub url: String,
    pub platform: Platform,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewSummary {
    pub id: i64,
    pub title: Option<String>,
    pub thumbnail_url: Option<String>,
    pub created_at: String,
    pub source: SourceSummary,
}

impl From<ReviewWithSource> for ReviewSummary {
    fn from(r: ReviewWithSource) -> Self {
        Self {
            id: r.review.id,
            title: r.review.title,
            thumbnail_url: r.review.thumbnail_url,
            created_at: r.review.created_at,
            source: SourceSummary {
                id: r.review.source_id,
                url: r.source_url,
                platform: r.source_platform,
            },
        }
    }
}

/// A place with every review that references it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceDetail {
    #[serde(flatten)]
    pub place: PlaceSummary,
    pub reviews: Vec<ReviewSummary>,
}

/// Loads the detail view for an already-fetched place row.
pub(crate) fn load_detail(
    conn: &rusqlite::Connection,
    row: PlaceRow,
) -> Result<PlaceDetail, DatabaseError> {
    let reviews = review_repo::list_for_place(conn, row.id)?
        .into_iter()
        .map(ReviewSummary::from)
        .collect();
    Ok(PlaceDetail {
        place: row.into(),
        reviews,
    })
}

/// Read-only access to places for map and detail views.
#[derive(Clone)]
pub struct PlaceCatalog {
    db: Database,
}

impl PlaceCatalog {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Lists places filtered by bounding box and text, paginated by
    /// descending id.
    pub fn list(&self, query: &PlaceQuery) -> Result<PlacePage, CatalogError> {
        let bounds = match query.bbox.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
            Some(raw) => Some(
                BoundingBox::parse(raw)
                    .ok_or_else(|| CatalogError::InvalidBoundingBox(raw.to_string()))?,
            ),
            None => None,
        };
        let limit = query
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, place_repo::MAX_PAGE_SIZE);

        let filter = PlaceFilter {
            bounds,
            search: query.q.clone(),
            before_id: query.before_id,
            limit: Some(limit),
        };
        let rows = self.db.with_conn(|conn| place_repo::list(conn, &filter))?;

        let next_cursor = if rows.len() as u32 == limit {
            rows.last().map(|r| r.place.id)
        } else {
            None
        };
        let places = rows
            .into_iter()
            .map(|PlaceWithCount { place, review_count }| PlaceListItem {
                place: place.into(),
                review_count,
            })
            .collect();

        Ok(PlacePage {
            places,
            next_cursor,
            limit,
        })
    }

    /// Place detail by id.
    pub fn detail(&self, id: i64) -> Result<Option<PlaceDetail>, CatalogError> {
        let detail = self.db.with_conn(|conn| match place_repo::find_by_id(conn, id)? {
            Some(row) => Ok(Some(load_detail(conn, row)?)),
            None => Ok(None),
        })?;
        Ok(detail)
    }

    /// Place detail by slug.
    pub fn detail_by_slug(&self, slug: &str) -> Result<Option<PlaceDetail>, CatalogError> {
        let detail = self.db.with_conn(|conn| match place_repo::find_by_slug(conn, slug)? {
            Some(row) => Ok(Some(load_detail(conn, row)?)),
            None => Ok(None),
        })?;
        Ok(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::place_repo::NewPlace;
    use crate::db::source_repo;
    use crate::geo::GeoPoint;

    const NOW: &str = "2026-01-01T00:00:00Z";

    fn seeded_catalog() -> (PlaceCatalog, Database) {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            let joes = place_repo::insert(
                conn,
                &NewPlace {
                    name: "Joe's Pizza".to_string(),
                    slug: "joe-s-pizza".to_string(),
                    city: Some("New York".to_string()),
                    point: Some(GeoPoint::new(40.7306, -73.9866)),
                    ..Default::default()
                },
                NOW,
            )?;
            place_repo::insert(
                conn,
                &NewPlace {
                    name: "Taco Stand".to_string(),
                    slug: "taco-stand".to_string(),
                    city: Some("Los Angeles".to_string()),
                    point: Some(GeoPoint::new(34.05, -118.24)),
                    ..Default::default()
                },
                NOW,
            )?;
            let source = source_repo::insert(conn, "https://youtu.be/abc", Platform::Youtube, NOW)?;
            review_repo::insert_if_absent(conn, source, joes.id, Some("Best slice"), None, NOW)?;
            Ok(())
        })
        .unwrap();
        (PlaceCatalog::new(db.clone()), db)
    }

    #[test]
    fn test_list_defaults() {
        let (catalog, _db) = seeded_catalog();
        let page = catalog.list(&PlaceQuery::default()).unwrap();
        assert_eq!(page.places.len(), 2);
        assert_eq!(page.limit, DEFAULT_PAGE_SIZE);
        assert!(page.next_cursor.is_none());
        assert_eq!(page.places[0].place.name, "Taco Stand");
        assert_eq!(page.places[1].review_count, 1);
    }

    #[test]
    fn test_list_next_cursor() {
        let (catalog, _db) = seeded_catalog();
        let page = catalog
            .list(&PlaceQuery { limit: Some(1), ..Default::default() })
            .unwrap();
        assert_eq!(page.places.len(), 1);
        let cursor = page.next_cursor.unwrap();

        let next = catalog
            .list(&PlaceQuery { limit: Some(1), before_id: Some(cursor), ..Default::default() })
            .unwrap();
        assert_eq!(next.places[0].place.name, "Joe's Pizza");
    }

    #[test]
    fn test_list_rejects_bad_bbox() {
        let (catalog, _db) = seeded_catalog();
        let err = catalog
            .list(&PlaceQuery { bbox: Some("1,2".to_string()), ..Default::default() })
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidBoundingBox(_)));
    }

    #[test]
    fn test_list_bbox_filter() {
        let (catalog, _db) = seeded_catalog();
        let page = catalog
            .list(&PlaceQuery {
                bbox: Some("-74.1,40.6,-73.9,40.8".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(page.places.len(), 1);
        assert_eq!(page.places[0].place.slug, "joe-s-pizza");
    }

    #[test]
    fn test_geojson_shape() {
        let (catalog, _db) = seeded_catalog();
        let geojson = catalog.list(&PlaceQuery::default()).unwrap().to_geojson();
        assert_eq!(geojson["type"], "FeatureCollection");
        let feature = &geojson["features"][1];
        assert_eq!(feature["geometry"]["type"], "Point");
        assert_eq!(feature["geometry"]["coordinates"][0], -73.9866);
        assert_eq!(feature["properties"]["review_count"], 1);
    }

    #[test]
    fn test_detail_includes_reviews() {
        let (catalog, _db) = seeded_catalog();
        let detail = catalog.detail_by_slug("joe-s-pizza").unwrap().unwrap();
        assert_eq!(detail.reviews.len(), 1);
        assert_eq!(detail.reviews[0].source.url, "https://youtu.be/abc");

        let by_id = catalog.detail(detail.place.id).unwrap().unwrap();
        assert_eq!(by_id, detail);

        assert!(catalog.detail(999).unwrap().is_none());
        assert!(catalog.detail_by_slug("missing").unwrap().is_none());
    }
}
