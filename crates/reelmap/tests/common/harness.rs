//! Test harness for isolated pipeline runs.
//!
//! The `TestHarness` owns an in-memory database and a pipeline whose
//! fetcher and geocoder are scripted per test, so no test touches the
//! network.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use reelmap::config::DedupConfig;
use reelmap::db::place_repo::{self, PlaceRow};
use reelmap::db::source_repo::{self, SourceRow};
use reelmap::db::{review_repo, Database};
use reelmap::dedup::DuplicateResolver;
use reelmap::extract::TextExtractor;
use reelmap::fetcher::{ContentFetcher, FetchError, FetchedContent, FetcherRegistry, Platform};
use reelmap::geocode::{GeocodeError, GeocodeOutcome, Geocoder, NotFoundReason};
use reelmap::ingest::IngestService;
use reelmap::pipeline::{NoopProgress, Pipeline, SourceOutcome};
use reelmap::places::PlaceCatalog;
use reelmap::worker::{BatchReport, BatchWorker};

/// YouTube fetcher answering from a per-URL script. Unscripted URLs fail.
#[derive(Default)]
pub struct ScriptedFetcher {
    responses: Mutex<HashMap<String, FetchedContent>>,
}

impl ScriptedFetcher {
    pub fn respond(&self, url: &str, content: FetchedContent) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), content);
    }
}

impl ContentFetcher for ScriptedFetcher {
    fn platform(&self) -> Platform {
        Platform::Youtube
    }

    fn validate_url(&self, url: &str) -> bool {
        Platform::detect(url) == Platform::Youtube
    }

    fn extract_id(&self, url: &str) -> Option<String> {
        url.rsplit('=').next().map(str::to_string)
    }

    fn fetch(&self, url: &str) -> Result<FetchedContent, FetchError> {
        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::FetchFailed {
                platform: Platform::Youtube,
                reason: "HTTP 404 Not Found".to_string(),
            })
    }
}

/// Geocoder answering queued outcomes in call order. Once the queue is
/// empty every query comes back with zero results.
#[derive(Default)]
pub struct ScriptedGeocoder {
    outcomes: Mutex<VecDeque<GeocodeOutcome>>,
    queries: Mutex<Vec<(String, Option<String>)>>,
}

impl ScriptedGeocoder {
    pub fn push(&self, outcome: GeocodeOutcome) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    /// Every `(query, hint_location)` received so far.
    pub fn queries(&self) -> Vec<(String, Option<String>)> {
        self.queries.lock().unwrap().clone()
    }
}

impl Geocoder for ScriptedGeocoder {
    fn geocode(
        &self,
        query: &str,
        hint_location: Option<&str>,
    ) -> Result<GeocodeOutcome, GeocodeError> {
        self.queries
            .lock()
            .unwrap()
            .push((query.to_string(), hint_location.map(str::to_string)));
        Ok(self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(GeocodeOutcome::NotFound {
                reason: NotFoundReason::ZeroResults,
            }))
    }
}

/// Test harness providing an isolated pipeline for integration tests.
pub struct TestHarness {
    pub db: Database,
    pub fetcher: Arc<ScriptedFetcher>,
    pub geocoder: Arc<ScriptedGeocoder>,
    pipeline: Arc<Pipeline>,
    worker: BatchWorker,
}

impl TestHarness {
    /// Create a harness with default dedup settings.
    pub fn new() -> Self {
        Self::with_dedup(DedupConfig::default())
    }

    pub fn with_dedup(dedup: DedupConfig) -> Self {
        let db = Database::open_in_memory().expect("Failed to open in-memory database");
        let fetcher = Arc::new(ScriptedFetcher::default());
        let geocoder = Arc::new(ScriptedGeocoder::default());

        let pipeline = Arc::new(Pipeline::new(
            db.clone(),
            FetcherRegistry::empty().with(fetcher.clone()),
            TextExtractor::default(),
            geocoder.clone(),
            DuplicateResolver::new(db.clone(), &dedup),
        ));

        Self {
            db,
            fetcher,
            geocoder,
            worker: BatchWorker::new(Arc::clone(&pipeline)),
            pipeline,
        }
    }

    pub fn ingest(&self) -> IngestService {
        IngestService::new(self.db.clone())
    }

    pub fn catalog(&self) -> PlaceCatalog {
        PlaceCatalog::new(self.db.clone())
    }

    /// Scripts the fetcher for `url` and queues it. Returns the source id.
    pub fn add_source(&self, url: &str, content: FetchedContent) -> i64 {
        self.fetcher.respond(url, content);
        self.enqueue(url)
    }

    pub fn enqueue(&self, url: &str) -> i64 {
        self.ingest()
            .enqueue(url, false)
            .expect("Failed to enqueue source")
            .source_id
    }

    /// Runs one batch over everything queued.
    pub fn run_batch(&self) -> BatchReport {
        self.worker.run_once().expect("Batch aborted")
    }

    /// Processes a single source outside of a batch.
    pub fn process(&self, source_id: i64) -> SourceOutcome {
        self.pipeline
            .process_source(source_id, &NoopProgress)
            .expect("Failed to process source")
    }

    pub fn source(&self, id: i64) -> SourceRow {
        self.db
            .with_conn(|conn| source_repo::find_by_id(conn, id))
            .unwrap()
            .expect("source exists")
    }

    pub fn place_count(&self) -> u64 {
        self.db.with_conn(|conn| place_repo::count(conn)).unwrap()
    }

    pub fn place(&self, id: i64) -> PlaceRow {
        self.db
            .with_conn(|conn| place_repo::find_by_id(conn, id))
            .unwrap()
            .expect("place exists")
    }

    pub fn review_count(&self, place_id: i64) -> u64 {
        self.db
            .with_conn(|conn| review_repo::list_for_place(conn, place_id))
            .unwrap()
            .len() as u64
    }

    /// The place a source's review points at.
    pub fn place_of(&self, source_id: i64) -> Option<PlaceRow> {
        let review = self
            .db
            .with_conn(|conn| review_repo::find_by_source(conn, source_id))
            .unwrap()?;
        Some(self.place(review.place_id))
    }
}
