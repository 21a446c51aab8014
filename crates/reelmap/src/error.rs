use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReelmapError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crate::fetcher::FetchError),

    #[error("Geocode error: {0}")]
    Geocode(#[from] crate::geocode::GeocodeError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] crate::pipeline::PipelineError),

    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    #[error("Ingest error: {0}")]
    Ingest(#[from] crate::ingest::IngestError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] crate::places::CatalogError),

    #[error("Secret error: {0}")]
    Secret(#[from] crate::secrets::SecretError),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },
}

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Failed to spawn worker: {0}")]
    SpawnFailed(String),

    #[error("Failed to install signal handler: {0}")]
    SignalHandler(String),

    #[error("Batch aborted: {0}")]
    BatchAborted(#[from] crate::pipeline::PipelineError),

    #[error("Failed to list queued sources: {0}")]
    Database(#[from] crate::db::DatabaseError),
}

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

pub type Result<T> = std::result::Result<T, ReelmapError>;
