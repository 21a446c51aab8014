use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.worker.idle_delay_secs == 0 {
        return Err(ConfigError::Validation {
            message: "worker.idle_delay_secs must be at least 1".to_string(),
        });
    }

    let geocoding = &config.geocoding;
    if geocoding.max_attempts == 0 {
        return Err(ConfigError::Validation {
            message: "geocoding.max_attempts must be at least 1".to_string(),
        });
    }
    if url::Url::parse(&geocoding.endpoint).is_err() {
        return Err(ConfigError::Validation {
            message: format!("geocoding.endpoint is not a valid URL: {}", geocoding.endpoint),
        });
    }

    let dedup = &config.dedup;
    if !(dedup.radius_meters.is_finite() && dedup.radius_meters > 0.0) {
        return Err(ConfigError::Validation {
            message: format!("dedup.radius_meters must be positive, got {}", dedup.radius_meters),
        });
    }
    if !(0.0..=1.0).contains(&dedup.similarity_threshold) {
        return Err(ConfigError::Validation {
            message: format!(
                "dedup.similarity_threshold must be within [0, 1], got {}",
                dedup.similarity_threshold
            ),
        });
    }

    if tracing_subscriber::EnvFilter::try_new(&config.logging.level).is_err() {
        return Err(ConfigError::Validation {
            message: format!("Invalid logging.level directive: {}", config.logging.level),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{FetchMode, LogFormat};

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = load_config_from_str(r#"{ "version": "1.0" }"#).unwrap();
        assert_eq!(config.worker.idle_delay_secs, 30);
        assert_eq!(config.geocoding.max_attempts, 3);
        assert_eq!(config.geocoding.initial_backoff_ms, 100);
        assert_eq!(config.geocoding.api_key_env_var.as_deref(), Some("GOOGLE_KEY"));
        assert_eq!(config.dedup.radius_meters, 100.0);
        assert_eq!(config.dedup.similarity_threshold, 0.4);
        assert_eq!(config.fetch.mode, FetchMode::Live);
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_load_full_config() {
        let config_json = r#"
        {
            "version": "1.0",
            "database_path": "/var/lib/reelmap/reelmap.db",
            "logging": { "level": "reelmap=debug", "format": "json" },
            "worker": { "idle_delay_secs": 5 },
            "fetch": { "mode": "stub", "timeout_secs": 3 },
            "geocoding": {
                "api_key_file": "/run/secrets/google",
                "max_attempts": 5,
                "initial_backoff_ms": 250
            },
            "dedup": { "radius_meters": 75, "similarity_threshold": 0.5 }
        }
        "#;

        let config = load_config_from_str(config_json).unwrap();
        assert_eq!(
            config.resolved_database_path().unwrap().to_str(),
            Some("/var/lib/reelmap/reelmap.db")
        );
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.worker.idle_delay_secs, 5);
        assert_eq!(config.fetch.mode, FetchMode::Stub);
        assert_eq!(config.geocoding.max_attempts, 5);
        assert_eq!(config.dedup.radius_meters, 75.0);
    }

    #[test]
    fn test_unsupported_version() {
        let err = load_config_from_str(r#"{ "version": "2.0" }"#).unwrap_err();
        assert!(matches!(err, ConfigError::SchemaValidation { .. } | ConfigError::Validation { .. }));
    }

    #[test]
    fn test_schema_rejects_unknown_fetch_mode() {
        let err =
            load_config_from_str(r#"{ "version": "1.0", "fetch": { "mode": "carrier-pigeon" } }"#)
                .unwrap_err();
        assert!(matches!(err, ConfigError::SchemaValidation { .. }));
    }

    #[test]
    fn test_schema_rejects_unknown_top_level_key() {
        let err = load_config_from_str(r#"{ "version": "1.0", "workers": 4 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::SchemaValidation { .. }));
    }

    #[test]
    fn test_rejects_zero_attempts() {
        let err = load_config_from_str(r#"{ "version": "1.0", "geocoding": { "max_attempts": 0 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::SchemaValidation { .. } | ConfigError::Validation { .. }));
    }

    #[test]
    fn test_rejects_threshold_out_of_range() {
        let err = load_config_from_str(
            r#"{ "version": "1.0", "dedup": { "similarity_threshold": 1.5 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::SchemaValidation { .. } | ConfigError::Validation { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let err = load_config_from_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::ParseJson(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reelmap.json");
        std::fs::write(&path, r#"{ "version": "1.0", "worker": { "idle_delay_secs": 12 } }"#)
            .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.worker.idle_delay_secs, 12);

        let missing = load_config(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(missing, ConfigError::ReadFile { .. }));
    }
}
