//! Place repository — CRUD operations for the `places` table.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::DatabaseError;
use crate::geo::{BoundingBox, GeoPoint};

/// Hard cap on a single listing page.
pub const MAX_PAGE_SIZE: u32 = 200;

/// A place row from the database.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub external_place_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl PlaceRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            slug: row.get("slug")?,
            address: row.get("address")?,
            city: row.get("city")?,
            state: row.get("state")?,
            country: row.get("country")?,
            postal_code: row.get("postal_code")?,
            latitude: row.get("latitude")?,
            longitude: row.get("longitude")?,
            external_place_id: row.get("external_place_id")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// The stored point, if the place has coordinates.
    pub fn point(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
            _ => None,
        }
    }
}

/// Values for a new place. `slug` is the preferred slug; see [`insert`].
#[derive(Debug, Clone, Default)]
pub struct NewPlace {
    pub name: String,
    pub slug: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub postal_code: Option<String>,
    pub point: Option<GeoPoint>,
    pub external_place_id: Option<String>,
}

/// Listing filter. Results are ordered by descending id.
#[derive(Debug, Clone, Default)]
pub struct PlaceFilter {
    pub bounds: Option<BoundingBox>,
    /// Case-insensitive substring over name, address and city.
    pub search: Option<String>,
    /// Keyset cursor: only ids strictly below this one.
    pub before_id: Option<i64>,
    pub limit: Option<u32>,
}

/// A place together with how many reviews reference it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceWithCount {
    pub place: PlaceRow,
    pub review_count: u64,
}

/// Inserts a new place and returns the stored row.
///
/// If `new.slug` is already taken the stored slug becomes
/// `{slug}-{id}` where `id` is the new row's id, with a further `-2`,
/// `-3`, ... if another place already owns that. Call inside a
/// transaction so the temporary slug is never visible.
pub fn insert(conn: &Connection, new: &NewPlace, now: &str) -> Result<PlaceRow, DatabaseError> {
    let taken = slug_exists(conn, &new.slug)?;
    let initial_slug = if taken {
        format!("{}-pending-{}", new.slug, uuid::Uuid::new_v4())
    } else {
        new.slug.clone()
    };

    conn.execute(
        "INSERT INTO places (name, slug, address, city, state, country, postal_code,
         latitude, longitude, external_place_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
        params![
            new.name,
            initial_slug,
            new.address,
            new.city,
            new.state,
            new.country,
            new.postal_code,
            new.point.map(|p| p.lat),
            new.point.map(|p| p.lng),
            new.external_place_id,
            now,
        ],
    )?;
    let id = conn.last_insert_rowid();

    if taken {
        let final_slug = free_suffixed_slug(conn, &new.slug, id)?;
        log::debug!("Slug '{}' taken, using '{}'", new.slug, final_slug);
        conn.execute(
            "UPDATE places SET slug = ?2 WHERE id = ?1",
            params![id, final_slug],
        )?;
    }

    find_by_id(conn, id)?.ok_or(DatabaseError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
}

/// First free slug of the form `{slug}-{id}`, then `{slug}-{id}-2`, `{slug}-{id}-3`, ...
///
/// Another place may already own `{slug}-{id}` when its own name ends in
/// that number ("Joe's Pizza 3").
fn free_suffixed_slug(conn: &Connection, slug: &str, id: i64) -> Result<String, DatabaseError> {
    let base = format!("{}-{}", slug, id);
    if !slug_exists(conn, &base)? {
        return Ok(base);
    }
    let mut n = 2u32;
    loop {
        let candidate = format!("{}-{}", base, n);
        if !slug_exists(conn, &candidate)? {
            return Ok(candidate);
        }
        n += 1;
    }
}

/// Returns true if a place already uses `slug`.
pub fn slug_exists(conn: &Connection, slug: &str) -> Result<bool, DatabaseError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM places WHERE slug = ?1)",
        params![slug],
        |r| r.get(0),
    )?;
    Ok(exists)
}

/// Finds a place by its id.
pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<PlaceRow>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT * FROM places WHERE id = ?1",
            params![id],
            PlaceRow::from_row,
        )
        .optional()?;
    Ok(row)
}

/// Finds a place by its slug.
pub fn find_by_slug(conn: &Connection, slug: &str) -> Result<Option<PlaceRow>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT * FROM places WHERE slug = ?1",
            params![slug],
            PlaceRow::from_row,
        )
        .optional()?;
    Ok(row)
}

/// All places with coordinates inside `bounds`, lowest id first.
pub fn find_in_bounds(
    conn: &Connection,
    bounds: &BoundingBox,
) -> Result<Vec<PlaceRow>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT * FROM places
         WHERE latitude BETWEEN ?1 AND ?2 AND longitude BETWEEN ?3 AND ?4
         ORDER BY id ASC",
    )?;
    let rows = stmt
        .query_map(
            params![bounds.min_lat, bounds.max_lat, bounds.min_lng, bounds.max_lng],
            PlaceRow::from_row,
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Lists places matching the filter with their review counts.
pub fn list(conn: &Connection, filter: &PlaceFilter) -> Result<Vec<PlaceWithCount>, DatabaseError> {
    let mut conditions = Vec::new();
    let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(bounds) = filter.bounds {
        let n = param_values.len();
        conditions.push(format!(
            "p.latitude BETWEEN ?{} AND ?{} AND p.longitude BETWEEN ?{} AND ?{}",
            n + 1,
            n + 2,
            n + 3,
            n + 4
        ));
        param_values.push(Box::new(bounds.min_lat));
        param_values.push(Box::new(bounds.max_lat));
        param_values.push(Box::new(bounds.min_lng));
        param_values.push(Box::new(bounds.max_lng));
    }
    if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let n = param_values.len() + 1;
        conditions.push(format!(
            "(instr(lower(p.name), ?{n}) > 0
              OR instr(lower(COALESCE(p.address, '')), ?{n}) > 0
              OR instr(lower(COALESCE(p.city, '')), ?{n}) > 0)"
        ));
        param_values.push(Box::new(term.to_lowercase()));
    }
    if let Some(before_id) = filter.before_id {
        conditions.push(format!("p.id < ?{}", param_values.len() + 1));
        param_values.push(Box::new(before_id));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let limit = filter.limit.unwrap_or(50).clamp(1, MAX_PAGE_SIZE) as i64;
    param_values.push(Box::new(limit));
    let query_sql = format!(
        "SELECT p.*, (SELECT COUNT(*) FROM reviews r WHERE r.place_id = p.id) AS review_count
         FROM places p {} ORDER BY p.id DESC LIMIT ?{}",
        where_clause,
        param_values.len()
    );

    let params_ref: Vec<&dyn rusqlite::types::ToSql> =
        param_values.iter().map(|p| p.as_ref()).collect();
    let mut stmt = conn.prepare(&query_sql)?;
    let rows = stmt
        .query_map(params_ref.as_slice(), |row| {
            Ok(PlaceWithCount {
                place: PlaceRow::from_row(row)?,
                review_count: row.get("review_count")?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Total number of places.
pub fn count(conn: &Connection) -> Result<u64, DatabaseError> {
    let count: u64 = conn.query_row("SELECT COUNT(*) FROM places", [], |r| r.get(0))?;
    Ok(count)
}
