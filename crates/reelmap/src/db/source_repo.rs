//! Source repository — CRUD operations for the `sources` table.

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::DatabaseError;
use crate::fetcher::Platform;
use crate::pipeline::SourceStatus;

/// A source row from the database.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    pub id: i64,
    pub url: String,
    pub platform: Platform,
    pub status: SourceStatus,
    pub raw_data: Option<String>,
    pub error: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl SourceRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            url: row.get("url")?,
            platform: parse_column(row, "platform")?,
            status: parse_column(row, "status")?,
            raw_data: row.get("raw_data")?,
            error: row.get("error")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Reads a TEXT column and parses it with `FromStr`.
fn parse_column<T>(row: &Row<'_>, column: &'static str) -> Result<T, rusqlite::Error>
where
    T: std::str::FromStr<Err = String>,
{
    let idx = row.as_ref().column_index(column)?;
    let raw: String = row.get(idx)?;
    raw.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            Box::new(DatabaseError::InvalidValue {
                column,
                value: e,
            }),
        )
    })
}

/// Inserts a new `queued` source and returns its id.
pub fn insert(
    conn: &Connection,
    url: &str,
    platform: Platform,
    now: &str,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO sources (url, platform, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4)",
        params![url, platform.as_str(), SourceStatus::Queued.as_str(), now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Finds a source by its id.
pub fn find_by_id(conn: &Connection, id: i64) -> Result<Option<SourceRow>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT * FROM sources WHERE id = ?1",
            params![id],
            SourceRow::from_row,
        )
        .optional()?;
    Ok(row)
}

/// Finds a source by its URL.
pub fn find_by_url(conn: &Connection, url: &str) -> Result<Option<SourceRow>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT * FROM sources WHERE url = ?1",
            params![url],
            SourceRow::from_row,
        )
        .optional()?;
    Ok(row)
}

/// Ids of all sources in `status`, oldest first.
pub fn ids_with_status(conn: &Connection, status: SourceStatus) -> Result<Vec<i64>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT id FROM sources WHERE status = ?1 ORDER BY id ASC")?;
    let ids = stmt
        .query_map(params![status.as_str()], |r| r.get(0))?
        .collect::<Result<Vec<i64>, _>>()?;
    Ok(ids)
}

/// Counts sources with the given status.
pub fn count_by_status(conn: &Connection, status: SourceStatus) -> Result<u64, DatabaseError> {
    let count: u64 = conn.query_row(
        "SELECT COUNT(*) FROM sources WHERE status = ?1",
        params![status.as_str()],
        |r| r.get(0),
    )?;
    Ok(count)
}

/// Updates status, error text and updated_at of a source.
///
/// `error` is written as given, so passing `None` clears a previous error.
pub fn update_status(
    conn: &Connection,
    id: i64,
    status: SourceStatus,
    error: Option<&str>,
    updated_at: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE sources SET status = ?2, error = ?3, updated_at = ?4 WHERE id = ?1",
        params![id, status.as_str(), error, updated_at],
    )?;
    Ok(())
}

/// Stores the raw fetched payload.
pub fn store_raw_data(
    conn: &Connection,
    id: i64,
    raw_data: &str,
    updated_at: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE sources SET raw_data = ?2, updated_at = ?3 WHERE id = ?1",
        params![id, raw_data, updated_at],
    )?;
    Ok(())
}

/// Puts a source back into the queue and clears its error.
///
/// Returns false when the id does not exist.
pub fn requeue(conn: &Connection, id: i64, updated_at: &str) -> Result<bool, DatabaseError> {
    let changed = conn.execute(
        "UPDATE sources SET status = ?2, error = NULL, updated_at = ?3 WHERE id = ?1",
        params![id, SourceStatus::Queued.as_str(), updated_at],
    )?;
    Ok(changed > 0)
}
