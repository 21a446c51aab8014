use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, info_span, warn};
use uuid::Uuid;

use crate::db::source_repo;
use crate::error::WorkerError;
use crate::pipeline::{NoopProgress, Pipeline, PipelineError, ProgressReporter, SourceStatus};

/// Per-status counts for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub run_id: String,
    pub attempted: usize,
    pub processed: usize,
    pub extraction_failed: usize,
    pub geocode_failed: usize,
    pub error: usize,
    /// Sources that vanished between listing and processing.
    pub skipped: usize,
}

impl BatchReport {
    fn record(&mut self, status: SourceStatus) {
        self.attempted += 1;
        match status {
            SourceStatus::Processed => self.processed += 1,
            SourceStatus::ExtractionFailed => self.extraction_failed += 1,
            SourceStatus::GeocodeFailed => self.geocode_failed += 1,
            SourceStatus::Error | SourceStatus::Queued | SourceStatus::Processing => {
                self.error += 1
            }
        }
    }
}

/// Processes every source queued when a batch starts, one at a time.
pub struct BatchWorker {
    pipeline: Arc<Pipeline>,
    progress: Arc<dyn ProgressReporter>,
    shutdown: Arc<AtomicBool>,
}

impl BatchWorker {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self {
            pipeline,
            progress: Arc::new(NoopProgress),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Stops the batch between items once `shutdown` is set.
    pub fn with_shutdown(mut self, shutdown: Arc<AtomicBool>) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Runs one batch.
    ///
    /// A failing or panicking source is marked `error` and the batch goes
    /// on. The batch stops with `Err` only when the queue cannot be read
    /// or a source's status cannot be written; earlier items stay
    /// committed.
    pub fn run_once(&self) -> Result<BatchReport, WorkerError> {
        let run_id = Uuid::new_v4().to_string();
        let _batch_span = info_span!("batch", run_id = %run_id).entered();

        let ids = self
            .pipeline
            .database()
            .with_conn(|conn| source_repo::ids_with_status(conn, SourceStatus::Queued))?;

        let mut report = BatchReport {
            run_id,
            ..Default::default()
        };
        if ids.is_empty() {
            return Ok(report);
        }
        info!("Processing {} queued sources", ids.len());

        for id in ids {
            if self.shutdown.load(Ordering::Relaxed) {
                info!("Shutdown requested, stopping batch");
                break;
            }

            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                self.pipeline.process_source(id, self.progress.as_ref())
            }));

            match result {
                Ok(Ok(outcome)) => report.record(outcome.status),
                Ok(Err(PipelineError::SourceNotFound(_))) => {
                    warn!(source_id = id, "Source disappeared before processing");
                    report.skipped += 1;
                }
                Ok(Err(e)) => {
                    error!(source_id = id, error = %e, "Stopping batch");
                    return Err(WorkerError::BatchAborted(e));
                }
                Err(payload) => {
                    let message = format!("processing panicked: {}", panic_message(payload.as_ref()));
                    error!(source_id = id, "{}", message);
                    let outcome =
                        self.pipeline
                            .mark_error(id, &message, self.progress.as_ref())?;
                    report.record(outcome.status);
                }
            }
        }

        info!(
            attempted = report.attempted,
            processed = report.processed,
            extraction_failed = report.extraction_failed,
            geocode_failed = report.geocode_failed,
            error = report.error,
            "Batch finished"
        );
        Ok(report)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::DedupConfig;
    use crate::db::Database;
    use crate::dedup::DuplicateResolver;
    use crate::extract::TextExtractor;
    use crate::fetcher::{FetcherRegistry, Platform, StubFetcher};
    use crate::geocode::{GeocodeError, GeocodeOutcome, GeocodeResult, Geocoder};

    const NOW: &str = "2026-01-01T00:00:00Z";

    /// Panics for one query, geocodes everything else.
    struct PanickyGeocoder;

    impl Geocoder for PanickyGeocoder {
        fn geocode(
            &self,
            query: &str,
            _hint_location: Option<&str>,
        ) -> Result<GeocodeOutcome, GeocodeError> {
            if query.contains("In-N-Out") {
                panic!("geocoder exploded");
            }
            Ok(GeocodeOutcome::Found(GeocodeResult {
                name: query.to_string(),
                address: "Somewhere, Austin, TX 78701, USA".to_string(),
                lat: 30.2672,
                lng: -97.7431,
                place_id: format!("pid-{query}"),
                types: vec![],
            }))
        }
    }

    fn worker(db: &Database) -> BatchWorker {
        let pipeline = Pipeline::new(
            db.clone(),
            FetcherRegistry::empty().with(Arc::new(StubFetcher::new(Platform::Youtube))),
            TextExtractor::default(),
            Arc::new(PanickyGeocoder),
            DuplicateResolver::new(db.clone(), &DedupConfig::default()),
        );
        BatchWorker::new(Arc::new(pipeline))
    }

    fn enqueue(db: &Database, url: &str) -> i64 {
        db.with_conn(|conn| source_repo::insert(conn, url, Platform::detect(url), NOW))
            .unwrap()
    }

    fn status(db: &Database, id: i64) -> SourceStatus {
        db.with_conn(|conn| source_repo::find_by_id(conn, id))
            .unwrap()
            .unwrap()
            .status
    }

    #[test]
    fn test_empty_queue() {
        let db = Database::open_in_memory().unwrap();
        let report = worker(&db).run_once().unwrap();
        assert_eq!(report.attempted, 0);
        assert!(!report.run_id.is_empty());
    }

    #[test]
    fn test_panic_is_isolated() {
        let db = Database::open_in_memory().unwrap();
        let burger = enqueue(&db, "https://www.youtube.com/watch?v=burger1");
        let pizza = enqueue(&db, "https://www.youtube.com/watch?v=pizza1");

        let report = worker(&db).run_once().unwrap();
        assert_eq!(report.attempted, 2);
        assert_eq!(report.error, 1);
        assert_eq!(report.processed, 1);
        assert_eq!(status(&db, burger), SourceStatus::Error);
        assert_eq!(status(&db, pizza), SourceStatus::Processed);

        let error = db
            .with_conn(|conn| source_repo::find_by_id(conn, burger))
            .unwrap()
            .unwrap()
            .error
            .unwrap();
        assert!(error.contains("geocoder exploded"), "{error}");
    }

    #[test]
    fn test_only_queued_sources_are_picked_up() {
        let db = Database::open_in_memory().unwrap();
        let done = enqueue(&db, "https://www.youtube.com/watch?v=pizza1");
        db.with_conn(|conn| {
            source_repo::update_status(conn, done, SourceStatus::Processed, None, NOW)
        })
        .unwrap();

        let report = worker(&db).run_once().unwrap();
        assert_eq!(report.attempted, 0);
    }

    #[test]
    fn test_shutdown_stops_before_next_item() {
        let db = Database::open_in_memory().unwrap();
        let id = enqueue(&db, "https://www.youtube.com/watch?v=pizza1");
        let shutdown = Arc::new(AtomicBool::new(true));

        let report = worker(&db).with_shutdown(shutdown).run_once().unwrap();
        assert_eq!(report.attempted, 0);
        assert_eq!(status(&db, id), SourceStatus::Queued);
    }
}
