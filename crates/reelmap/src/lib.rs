pub mod config;
pub mod db;
pub mod dedup;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod geo;
pub mod geocode;
pub mod ingest;
pub mod logging;
pub mod pipeline;
pub mod places;
pub mod sanitize;
pub mod secrets;
pub mod worker;

pub use config::{load_config, Config};
pub use db::{Database, DatabaseError};
pub use dedup::{DuplicateMatch, DuplicateResolver, MatchReason};
pub use error::{ConfigError, LoggingError, ReelmapError, Result, WorkerError};
pub use extract::{PlaceHint, TextExtractor};
pub use fetcher::{ContentFetcher, FetchedContent, FetcherRegistry, Platform};
pub use geo::{BoundingBox, GeoPoint};
pub use geocode::{GeocodeOutcome, GeocodeResult, Geocoder, GoogleGeocoder};
pub use ingest::{EnqueueReceipt, IngestError, IngestService, SourceLookup};
pub use pipeline::{Pipeline, PipelineError, SourceOutcome, SourceStatus};
pub use places::{PlaceCatalog, PlaceDetail, PlacePage, PlaceQuery};
pub use secrets::{resolve_secret, resolve_secret_optional, SecretError};
pub use worker::{BatchReport, BatchWorker, WorkerScheduler, WorkerTrigger};
