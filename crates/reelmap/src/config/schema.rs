use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::secrets::{resolve_secret_if_present, SecretError};
use secrecy::SecretString;

pub const DEFAULT_GEOCODE_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    /// SQLite file. Defaults to `~/.reelmap/data/reelmap.db`.
    #[serde(default)]
    pub database_path: Option<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    #[serde(default)]
    pub dedup: DedupConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            database_path: None,
            logging: LoggingConfig::default(),
            worker: WorkerConfig::default(),
            fetch: FetchConfig::default(),
            geocoding: GeocodingConfig::default(),
            dedup: DedupConfig::default(),
        }
    }
}

impl Config {
    /// The configured database path with `~` expanded, or the default path.
    pub fn resolved_database_path(&self) -> Option<PathBuf> {
        match self.database_path.as_deref().filter(|p| !p.is_empty()) {
            Some(path) => Some(PathBuf::from(crate::secrets::expand_home(path))),
            None => crate::db::default_database_path(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Pause between batches when running as a loop.
    #[serde(default = "default_idle_delay_secs")]
    pub idle_delay_secs: u64,
}

fn default_idle_delay_secs() -> u64 {
    30
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            idle_delay_secs: default_idle_delay_secs(),
        }
    }
}

/// How source metadata is obtained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// Call the platform APIs.
    #[default]
    Live,
    /// Serve canned metadata; no network access.
    Stub,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default)]
    pub mode: FetchMode,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub youtube_api_key: Option<String>,
    #[serde(default)]
    pub youtube_api_key_file: Option<String>,
    #[serde(default = "default_youtube_key_env_var")]
    pub youtube_api_key_env_var: Option<String>,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_youtube_key_env_var() -> Option<String> {
    Some("YOUTUBE_API_KEY".to_string())
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            mode: FetchMode::Live,
            timeout_secs: default_timeout_secs(),
            youtube_api_key: None,
            youtube_api_key_file: None,
            youtube_api_key_env_var: default_youtube_key_env_var(),
        }
    }
}

impl FetchConfig {
    /// YouTube Data API key, if one is configured and present.
    pub fn youtube_api_key(&self) -> Result<Option<SecretString>, SecretError> {
        resolve_secret_if_present(
            self.youtube_api_key.as_deref(),
            self.youtube_api_key_file.as_deref(),
            self.youtube_api_key_env_var.as_deref(),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    #[serde(default = "default_geocode_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_file: Option<String>,
    #[serde(default = "default_geocode_key_env_var")]
    pub api_key_env_var: Option<String>,
    /// Total attempts per query, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after each retry.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_geocode_endpoint() -> String {
    DEFAULT_GEOCODE_ENDPOINT.to_string()
}

fn default_geocode_key_env_var() -> Option<String> {
    Some("GOOGLE_KEY".to_string())
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    100
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            endpoint: default_geocode_endpoint(),
            api_key: None,
            api_key_file: None,
            api_key_env_var: default_geocode_key_env_var(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GeocodingConfig {
    /// Geocoding API key, if one is configured and present.
    pub fn api_key(&self) -> Result<Option<SecretString>, SecretError> {
        resolve_secret_if_present(
            self.api_key.as_deref(),
            self.api_key_file.as_deref(),
            self.api_key_env_var.as_deref(),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupConfig {
    #[serde(default = "default_radius_meters")]
    pub radius_meters: f64,
    /// Trigram similarity a name must exceed to count as the same place.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
}

fn default_radius_meters() -> f64 {
    100.0
}

fn default_similarity_threshold() -> f64 {
    0.4
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            radius_meters: default_radius_meters(),
            similarity_threshold: default_similarity_threshold(),
        }
    }
}
