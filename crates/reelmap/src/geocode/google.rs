//! Geocoding against the Google Geocoding API.

use std::sync::Arc;

use secrecy::SecretString;
use tracing::{debug, info, warn};

use super::backoff::{RetryPolicy, Sleeper, ThreadSleeper};
use super::error::GeocodeError;
use super::transport::{GeocodeRequest, GeocodeResponse, GeocodeTransport, HttpTransport};
use super::{GeocodeOutcome, GeocodeResult, Geocoder, NotFoundReason};
use crate::config::GeocodingConfig;

/// Place types requested when the query does not already say it is about food.
const FOOD_TYPES: &str = "restaurant|food|cafe|meal_takeaway|bakery";

pub struct GoogleGeocoder {
    transport: Arc<dyn GeocodeTransport>,
    sleeper: Arc<dyn Sleeper>,
    api_key: Option<SecretString>,
    policy: RetryPolicy,
}

impl GoogleGeocoder {
    pub fn new(
        transport: Arc<dyn GeocodeTransport>,
        sleeper: Arc<dyn Sleeper>,
        api_key: Option<SecretString>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            sleeper,
            api_key,
            policy,
        }
    }

    /// Builds the live geocoder. A missing key is not an error here; it
    /// surfaces on the first query.
    pub fn from_config(config: &GeocodingConfig) -> Result<Self, GeocodeError> {
        let api_key = config
            .api_key()
            .map_err(|e| GeocodeError::Configuration(e.to_string()))?;
        if api_key.is_none() {
            warn!("No geocoding API key configured; every geocode will fail");
        }
        let transport = HttpTransport::new(config.endpoint.clone(), config.timeout_secs)
            .map_err(|e| GeocodeError::Configuration(e.to_string()))?;
        Ok(Self::new(
            Arc::new(transport),
            Arc::new(ThreadSleeper),
            api_key,
            RetryPolicy::from_config(config),
        ))
    }
}

impl Geocoder for GoogleGeocoder {
    fn geocode(
        &self,
        query: &str,
        hint_location: Option<&str>,
    ) -> Result<GeocodeOutcome, GeocodeError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GeocodeError::InvalidQuery);
        }
        let key = self
            .api_key
            .as_ref()
            .ok_or_else(|| GeocodeError::Configuration("missing geocoding API key".to_string()))?;

        let address = compose_query(query, hint_location);
        let types = needs_food_bias(&address).then_some(FOOD_TYPES);
        let request = GeocodeRequest {
            address: &address,
            types,
            key,
        };

        let mut last_error = String::new();
        for attempt in 1..=self.policy.max_attempts {
            match self.transport.send(&request) {
                Ok(response) => match interpret(response) {
                    Interpreted::Found(hit) => {
                        info!(query = %address, attempt, "Geocoded");
                        return Ok(GeocodeOutcome::Found(GeocodeResult {
                            name: query.to_string(),
                            ..hit
                        }));
                    }
                    Interpreted::ZeroResults => {
                        info!(query = %address, "Geocoder found no results");
                        return Ok(GeocodeOutcome::NotFound {
                            reason: NotFoundReason::ZeroResults,
                        });
                    }
                    Interpreted::Transient(error) => last_error = error,
                },
                Err(e) => last_error = e.to_string(),
            }

            if attempt < self.policy.max_attempts {
                let delay = self.policy.delay_after(attempt);
                debug!(attempt, delay_ms = delay.as_millis() as u64, error = %last_error, "Retrying geocode");
                self.sleeper.sleep(delay);
            }
        }

        warn!(
            query = %address,
            attempts = self.policy.max_attempts,
            error = %last_error,
            "Geocoding gave up"
        );
        Ok(GeocodeOutcome::NotFound {
            reason: NotFoundReason::RetriesExhausted {
                attempts: self.policy.max_attempts,
                last_error,
            },
        })
    }
}

enum Interpreted {
    Found(GeocodeResult),
    ZeroResults,
    Transient(String),
}

fn interpret(response: GeocodeResponse) -> Interpreted {
    match response.status.as_str() {
        "OK" => match response.results.into_iter().next() {
            Some(hit) => Interpreted::Found(GeocodeResult {
                name: String::new(),
                address: hit.formatted_address,
                lat: hit.geometry.location.lat,
                lng: hit.geometry.location.lng,
                place_id: hit.place_id,
                types: hit.types,
            }),
            None => Interpreted::ZeroResults,
        },
        "ZERO_RESULTS" => Interpreted::ZeroResults,
        status => Interpreted::Transient(match response.error_message {
            Some(message) => format!("{status}: {message}"),
            None => status.to_string(),
        }),
    }
}

/// `"{query}, {hint}"` when a hint is present.
pub fn compose_query(query: &str, hint_location: Option<&str>) -> String {
    match hint_location.map(str::trim).filter(|h| !h.is_empty()) {
        Some(hint) => format!("{query}, {hint}"),
        None => query.to_string(),
    }
}

fn needs_food_bias(address: &str) -> bool {
    let lower = address.to_lowercase();
    !lower.contains("restaurant") && !lower.contains("food")
}
