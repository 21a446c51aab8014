//! Review repository — the `reviews` table linking sources to places.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::DatabaseError;
use crate::fetcher::Platform;

/// A review row from the database.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRow {
    pub id: i64,
    pub source_id: i64,
    pub place_id: i64,
    pub title: Option<String>,
    pub thumbnail_url: Option<String>,
    pub created_at: String,
}

impl ReviewRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            source_id: row.get("source_id")?,
            place_id: row.get("place_id")?,
            title: row.get("title")?,
            thumbnail_url: row.get("thumbnail_url")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// A review joined with the URL and platform of its source.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewWithSource {
    pub review: ReviewRow,
    pub source_url: String,
    pub source_platform: Platform,
}

/// Inserts a review unless one already links `source_id` to `place_id`.
///
/// Returns the stored row and whether it was created by this call.
/// Existing reviews are left untouched.
pub fn insert_if_absent(
    conn: &Connection,
    source_id: i64,
    place_id: i64,
    title: Option<&str>,
    thumbnail_url: Option<&str>,
    now: &str,
) -> Result<(ReviewRow, bool), DatabaseError> {
    let inserted = conn.execute(
        "INSERT INTO reviews (source_id, place_id, title, thumbnail_url, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT (source_id, place_id) DO NOTHING",
        params![source_id, place_id, title, thumbnail_url, now],
    )?;

    let row = conn.query_row(
        "SELECT * FROM reviews WHERE source_id = ?1 AND place_id = ?2",
        params![source_id, place_id],
        ReviewRow::from_row,
    )?;
    Ok((row, inserted > 0))
}

/// The review written by the most recent processing run of a source, if any.
pub fn find_by_source(conn: &Connection, source_id: i64) -> Result<Option<ReviewRow>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT * FROM reviews WHERE source_id = ?1 ORDER BY id DESC LIMIT 1",
            params![source_id],
            ReviewRow::from_row,
        )
        .optional()?;
    Ok(row)
}

/// All reviews of a place with their source summaries, newest first.
pub fn list_for_place(
    conn: &Connection,
    place_id: i64,
) -> Result<Vec<ReviewWithSource>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT r.*, s.url AS source_url, s.platform AS source_platform
         FROM reviews r JOIN sources s ON s.id = r.source_id
         WHERE r.place_id = ?1
         ORDER BY r.id DESC",
    )?;
    let rows = stmt
        .query_map(params![place_id], |row| {
            let platform: String = row.get("source_platform")?;
            Ok(ReviewWithSource {
                review: ReviewRow::from_row(row)?,
                source_url: row.get("source_url")?,
                source_platform: platform.parse().unwrap_or(Platform::Unknown),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{place_repo, source_repo, Database};

    const NOW: &str = "2026-01-01T00:00:00Z";

    fn seeded() -> (Database, i64, i64) {
        let db = Database::open_in_memory().expect("Failed to create test database");
        let (source_id, place_id) = db
            .with_conn(|conn| {
                let source_id =
                    source_repo::insert(conn, "https://youtu.be/abc", Platform::Youtube, NOW)?;
                let place = place_repo::insert(
                    conn,
                    &place_repo::NewPlace {
                        name: "Joe's Pizza".to_string(),
                        slug: "joe-s-pizza".to_string(),
                        ..Default::default()
                    },
                    NOW,
                )?;
                Ok((source_id, place.id))
            })
            .unwrap();
        (db, source_id, place_id)
    }

    #[test]
    fn test_insert_and_find_by_source() {
        let (db, source_id, place_id) = seeded();
        db.with_conn(|conn| {
            let (row, created) =
                insert_if_absent(conn, source_id, place_id, Some("Best slice"), None, NOW)?;
            assert!(created);
            assert_eq!(row.title.as_deref(), Some("Best slice"));

            let found = find_by_source(conn, source_id)?.unwrap();
            assert_eq!(found.id, row.id);
            assert_eq!(found.place_id, place_id);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_insert_twice_keeps_first() {
        let (db, source_id, place_id) = seeded();
        db.with_conn(|conn| {
            let (first, _) = insert_if_absent(conn, source_id, place_id, Some("First"), None, NOW)?;
            let (second, created) =
                insert_if_absent(conn, source_id, place_id, Some("Second"), None, "later")?;

            assert!(!created);
            assert_eq!(second.id, first.id);
            assert_eq!(second.title.as_deref(), Some("First"));
            assert_eq!(list_for_place(conn, place_id)?.len(), 1);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_list_for_place_includes_source() {
        let (db, source_id, place_id) = seeded();
        db.with_conn(|conn| {
            insert_if_absent(conn, source_id, place_id, Some("t"), Some("https://img/1.jpg"), NOW)?;
            let reviews = list_for_place(conn, place_id)?;
            assert_eq!(reviews.len(), 1);
            assert_eq!(reviews[0].source_url, "https://youtu.be/abc");
            assert_eq!(reviews[0].source_platform, Platform::Youtube);
            assert_eq!(reviews[0].review.thumbnail_url.as_deref(), Some("https://img/1.jpg"));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_find_by_source_returns_latest_place() {
        let (db, source_id, first_place) = seeded();
        db.with_conn(|conn| {
            let second_place = place_repo::insert(
                conn,
                &place_repo::NewPlace {
                    name: "Joe's Pizza".to_string(),
                    slug: "joe-s-pizza".to_string(),
                    ..Default::default()
                },
                NOW,
            )?
            .id;
            insert_if_absent(conn, source_id, first_place, None, None, NOW)?;
            insert_if_absent(conn, source_id, second_place, None, None, NOW)?;

            let found = find_by_source(conn, source_id)?.unwrap();
            assert_eq!(found.place_id, second_place);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_find_by_source_none() {
        let (db, source_id, _) = seeded();
        let found = db.with_conn(|conn| find_by_source(conn, source_id)).unwrap();
        assert!(found.is_none());
    }
}
