//! Enqueue and lookup operations for callers outside the worker, such as
//! the CLI or an HTTP layer.

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::db::{now_rfc3339, place_repo, review_repo, source_repo, Database, DatabaseError};
use crate::fetcher::Platform;
use crate::pipeline::SourceStatus;
use crate::places::catalog::{load_detail, PlaceDetail};
use crate::worker::WorkerTrigger;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Invalid source URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Source {0} not found")]
    SourceNotFound(i64),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnqueueReceipt {
    pub source_id: i64,
    pub url: String,
    pub platform: Platform,
    pub status: SourceStatus,
    /// False when the URL was already known.
    pub created: bool,
    /// True when a worker run was requested.
    pub triggered: bool,
}

/// What is known about a source's place so far.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SourceLookup {
    /// No place linked yet. `status` tells whether one still might be.
    Pending {
        source_id: i64,
        status: SourceStatus,
        error: Option<String>,
    },
    Linked(PlaceDetail),
}

#[derive(Clone)]
pub struct IngestService {
    db: Database,
    trigger: Option<WorkerTrigger>,
}

impl IngestService {
    pub fn new(db: Database) -> Self {
        Self { db, trigger: None }
    }

    /// Lets `enqueue(.., run_now = true)` wake a running worker.
    pub fn with_trigger(mut self, trigger: WorkerTrigger) -> Self {
        self.trigger = Some(trigger);
        self
    }

    /// Records `url` as a queued source.
    ///
    /// A URL that is already known returns its existing source unchanged.
    /// With `run_now` a worker run is requested without waiting for it.
    pub fn enqueue(&self, url: &str, run_now: bool) -> Result<EnqueueReceipt, IngestError> {
        let url = validate_url(url)?;
        let platform = Platform::detect(&url);

        let (source, created) = self.db.with_transaction(|tx| {
            if let Some(existing) = source_repo::find_by_url(tx, &url)? {
                return Ok::<_, IngestError>((existing, false));
            }
            let id = source_repo::insert(tx, &url, platform, &now_rfc3339())?;
            let row = source_repo::find_by_id(tx, id)?.ok_or(IngestError::SourceNotFound(id))?;
            Ok((row, true))
        })?;

        if created {
            info!(source_id = source.id, platform = %platform, "Source queued");
        } else {
            info!(source_id = source.id, status = %source.status, "Source already known");
        }

        let triggered = run_now && self.request_run();

        Ok(EnqueueReceipt {
            source_id: source.id,
            url: source.url,
            platform: source.platform,
            status: source.status,
            created,
            triggered,
        })
    }

    /// The place a source resolved to, with all of that place's reviews.
    pub fn place_for_source(&self, source_id: i64) -> Result<SourceLookup, IngestError> {
        self.db.with_conn(|conn| {
            let source = source_repo::find_by_id(conn, source_id)?;
            let Some(source) = source else {
                return Ok(None);
            };
            let place = match review_repo::find_by_source(conn, source_id)? {
                Some(review) => place_repo::find_by_id(conn, review.place_id)?,
                None => None,
            };
            let lookup = match place {
                Some(row) => SourceLookup::Linked(load_detail(conn, row)?),
                None => SourceLookup::Pending {
                    source_id,
                    status: source.status,
                    error: source.error,
                },
            };
            Ok(Some(lookup))
        })?
        .ok_or(IngestError::SourceNotFound(source_id))
    }

    /// Puts a source back into the queue.
    pub fn requeue(&self, source_id: i64, run_now: bool) -> Result<EnqueueReceipt, IngestError> {
        let source = self.db.with_transaction(|tx| {
            if !source_repo::requeue(tx, source_id, &now_rfc3339())? {
                return Err(IngestError::SourceNotFound(source_id));
            }
            source_repo::find_by_id(tx, source_id)?.ok_or(IngestError::SourceNotFound(source_id))
        })?;
        info!(source_id, "Source re-queued");

        let triggered = run_now && self.request_run();
        Ok(EnqueueReceipt {
            source_id: source.id,
            url: source.url,
            platform: source.platform,
            status: source.status,
            created: false,
            triggered,
        })
    }

    fn request_run(&self) -> bool {
        match &self.trigger {
            Some(trigger) => trigger.trigger(),
            None => {
                warn!("Run requested but no worker is attached");
                false
            }
        }
    }
}

/// Accepts absolute http(s) URLs only. Returns the trimmed URL.
fn validate_url(raw: &str) -> Result<String, IngestError> {
    let trimmed = raw.trim();
    let invalid = |reason: &str| IngestError::InvalidUrl {
        url: trimmed.to_string(),
        reason: reason.to_string(),
    };
    let parsed = Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if parsed.host_str().unwrap_or_default().is_empty() {
        return Err(invalid("missing host"));
    }
    Ok(trimmed.to_string())
}
