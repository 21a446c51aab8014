use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use crate::config::Config;
use crate::db::source_repo::{self, SourceRow};
use crate::db::{now_rfc3339, place_repo, review_repo, Database};
use crate::dedup::{DuplicateResolver, MatchReason};
use crate::extract::{PlaceHint, TextExtractor};
use crate::fetcher::{FetchedContent, FetcherRegistry};
use crate::geocode::{GeocodeOutcome, GeocodeResult, Geocoder, GoogleGeocoder, NotFoundReason};
use crate::places::{parse_address, slugify};

use super::error::PipelineError;
use super::progress::{PipelineStep, ProgressEvent, ProgressReporter};
use super::status::SourceStatus;

/// Error text stored when the extractor finds no venue name.
const NO_NAME_FOUND: &str = "no venue name found in source text";

/// Result of processing one source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceOutcome {
    pub source_id: i64,
    pub status: SourceStatus,
    pub place_id: Option<i64>,
    /// Set when an existing place was reused.
    pub matched: Option<MatchReason>,
    pub review_created: bool,
    pub error: Option<String>,
}

impl SourceOutcome {
    fn failed(source_id: i64, status: SourceStatus, error: String) -> Self {
        Self {
            source_id,
            status,
            place_id: None,
            matched: None,
            review_created: false,
            error: Some(error),
        }
    }
}

/// Where the steps stopped. Anything not listed here is an error.
enum StepsOutcome {
    Linked(Linked),
    NoName,
    NotGeocoded(NotFoundReason),
}

struct Linked {
    place_id: i64,
    matched: Option<MatchReason>,
    review_created: bool,
}

pub struct Pipeline {
    db: Database,
    fetchers: FetcherRegistry,
    extractor: TextExtractor,
    geocoder: Arc<dyn Geocoder>,
    resolver: DuplicateResolver,
}

impl Pipeline {
    /// Production constructor: builds all sub-components from config.
    pub fn from_config(db: Database, config: &Config) -> Result<Self, PipelineError> {
        let fetchers = FetcherRegistry::from_config(&config.fetch)?;
        let geocoder = GoogleGeocoder::from_config(&config.geocoding)?;
        let resolver = DuplicateResolver::new(db.clone(), &config.dedup);
        Ok(Self::new(
            db,
            fetchers,
            TextExtractor::default(),
            Arc::new(geocoder),
            resolver,
        ))
    }

    /// Constructor with injected sub-components.
    pub fn new(
        db: Database,
        fetchers: FetcherRegistry,
        extractor: TextExtractor,
        geocoder: Arc<dyn Geocoder>,
        resolver: DuplicateResolver,
    ) -> Self {
        Self {
            db,
            fetchers,
            extractor,
            geocoder,
            resolver,
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Drives one source from `processing` to a terminal status.
    ///
    /// Failures of the item itself are recorded on the source and returned
    /// as an outcome with status `error`. `Err` means the source could not
    /// be loaded or its status could not be written.
    pub fn process_source(
        &self,
        source_id: i64,
        progress: &dyn ProgressReporter,
    ) -> Result<SourceOutcome, PipelineError> {
        let source = self
            .db
            .with_conn(|conn| source_repo::find_by_id(conn, source_id))?
            .ok_or(PipelineError::SourceNotFound(source_id))?;

        let _source_span = info_span!("source",
            source_id = source.id,
            platform = %source.platform,
        )
        .entered();

        // Step 1: Mark as processing
        self.set_status(source.id, SourceStatus::Processing, None, progress)?;

        let outcome = match self.run_steps(&source, progress) {
            Ok(StepsOutcome::Linked(linked)) => {
                info!(place_id = linked.place_id, matched = ?linked.matched, "Source processed");
                progress.report(ProgressEvent::Status {
                    source_id: source.id,
                    status: SourceStatus::Processed,
                    place_id: Some(linked.place_id),
                    error: None,
                });
                SourceOutcome {
                    source_id: source.id,
                    status: SourceStatus::Processed,
                    place_id: Some(linked.place_id),
                    matched: linked.matched,
                    review_created: linked.review_created,
                    error: None,
                }
            }
            Ok(StepsOutcome::NoName) => {
                info!("No venue name found");
                self.finish_failed(source.id, SourceStatus::ExtractionFailed, NO_NAME_FOUND.to_string(), progress)?
            }
            Ok(StepsOutcome::NotGeocoded(reason)) => {
                info!(reason = %reason, "Venue could not be geocoded");
                self.finish_failed(source.id, SourceStatus::GeocodeFailed, reason.to_string(), progress)?
            }
            Err(e) => {
                warn!(error = %e, "Source processing failed");
                self.finish_failed(source.id, SourceStatus::Error, e.to_string(), progress)?
            }
        };

        Ok(outcome)
    }

    /// Records `error` on a source after a failure outside
    /// [`process_source`](Self::process_source), e.g. a panic.
    pub fn mark_error(
        &self,
        source_id: i64,
        error: &str,
        progress: &dyn ProgressReporter,
    ) -> Result<SourceOutcome, PipelineError> {
        self.finish_failed(source_id, SourceStatus::Error, error.to_string(), progress)
    }

    fn run_steps(
        &self,
        source: &SourceRow,
        progress: &dyn ProgressReporter,
    ) -> Result<StepsOutcome, PipelineError> {
        // Steps 2+3: Fetch content and keep the raw payload
        let content = {
            let _step = info_span!("fetch").entered();
            progress.report(ProgressEvent::Step {
                source_id: source.id,
                step: PipelineStep::Fetch,
            });
            self.step_fetch(source)?
        };

        // Steps 4+5: Extract name and location hint
        let hint = {
            let _step = info_span!("extract").entered();
            progress.report(ProgressEvent::Step {
                source_id: source.id,
                step: PipelineStep::Extract,
            });
            self.step_extract(source, &content)
        };
        if !hint.has_name() {
            return Ok(StepsOutcome::NoName);
        }

        // Steps 6+7: Geocode
        let geocoded = {
            let _step = info_span!("geocode", name = %hint.name).entered();
            progress.report(ProgressEvent::Step {
                source_id: source.id,
                step: PipelineStep::Geocode,
            });
            match self.geocoder.geocode(&hint.name, hint.location())? {
                GeocodeOutcome::Found(result) => result,
                GeocodeOutcome::NotFound { reason } => return Ok(StepsOutcome::NotGeocoded(reason)),
            }
        };

        // Steps 8-11: Dedup, place, review and status in one transaction
        let linked = {
            let _step = info_span!("persist").entered();
            progress.report(ProgressEvent::Step {
                source_id: source.id,
                step: PipelineStep::Persist,
            });
            self.step_persist(source, &content, &geocoded)?
        };

        Ok(StepsOutcome::Linked(linked))
    }

    fn step_fetch(&self, source: &SourceRow) -> Result<FetchedContent, PipelineError> {
        let content = self.fetchers.get(source.platform).fetch(&source.url)?;
        let raw = serde_json::to_string(&content)?;
        self.db
            .with_conn(|conn| source_repo::store_raw_data(conn, source.id, &raw, &now_rfc3339()))?;
        debug!(title = %content.title, "Fetched content");
        Ok(content)
    }

    fn step_extract(&self, source: &SourceRow, content: &FetchedContent) -> PlaceHint {
        let mut text = content.analysis_text();
        if text.is_empty() {
            debug!("No title or description, analysing the URL");
            text = source.url.clone();
        }
        let hint = self.extractor.extract(&text);
        debug!(name = %hint.name, hint_location = %hint.hint_location, "Extracted place hint");
        hint
    }

    fn step_persist(
        &self,
        source: &SourceRow,
        content: &FetchedContent,
        geocoded: &GeocodeResult,
    ) -> Result<Linked, PipelineError> {
        let point = geocoded.point();
        if !point.is_valid() {
            return Err(PipelineError::InvalidCoordinates {
                lat: geocoded.lat,
                lng: geocoded.lng,
            });
        }

        self.db.with_transaction(|tx| {
            let now = now_rfc3339();

            let duplicate = self
                .resolver
                .find_duplicate_with(tx, point, Some(&geocoded.name))?;
            let (place, matched) = match duplicate {
                Some(found) => {
                    debug!(place_id = found.place.id, reason = ?found.reason, "Reusing existing place");
                    (found.place, Some(found.reason))
                }
                None => {
                    let parts = parse_address(&geocoded.address);
                    let new = place_repo::NewPlace {
                        name: geocoded.name.clone(),
                        slug: slugify(&geocoded.name),
                        address: non_empty(&geocoded.address),
                        city: parts.city,
                        state: parts.state,
                        country: parts.country,
                        postal_code: parts.postal_code,
                        point: Some(point),
                        external_place_id: non_empty(&geocoded.place_id),
                    };
                    let place = place_repo::insert(tx, &new, &now)?;
                    debug!(place_id = place.id, slug = %place.slug, "Created place");
                    (place, None)
                }
            };

            let (_, review_created) = review_repo::insert_if_absent(
                tx,
                source.id,
                place.id,
                non_empty(&content.title).as_deref(),
                content.thumbnail_url.as_deref(),
                &now,
            )?;

            source_repo::update_status(tx, source.id, SourceStatus::Processed, None, &now)?;

            Ok::<_, PipelineError>(Linked {
                place_id: place.id,
                matched,
                review_created,
            })
        })
    }

    fn set_status(
        &self,
        source_id: i64,
        status: SourceStatus,
        error: Option<&str>,
        progress: &dyn ProgressReporter,
    ) -> Result<(), PipelineError> {
        self.db.with_conn(|conn| {
            source_repo::update_status(conn, source_id, status, error, &now_rfc3339())
        })?;
        progress.report(ProgressEvent::Status {
            source_id,
            status,
            place_id: None,
            error: error.map(str::to_string),
        });
        Ok(())
    }

    fn finish_failed(
        &self,
        source_id: i64,
        status: SourceStatus,
        error: String,
        progress: &dyn ProgressReporter,
    ) -> Result<SourceOutcome, PipelineError> {
        self.set_status(source_id, status, Some(&error), progress)?;
        Ok(SourceOutcome::failed(source_id, status, error))
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
