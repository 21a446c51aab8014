//! HTTP seam between the geocoder and the geocoding service.

use std::time::Duration;

use reqwest::blocking::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::TransportError;
use crate::sanitize::{redact_url, scrub_secret, truncate_body};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Parameters of one geocoding request.
pub struct GeocodeRequest<'a> {
    pub address: &'a str,
    /// `|`-separated place types to bias results toward.
    pub types: Option<&'a str>,
    pub key: &'a SecretString,
}

/// Body of a geocoding response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeHit>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeocodeHit {
    #[serde(default)]
    pub formatted_address: String,
    pub geometry: Geometry,
    #[serde(default)]
    pub place_id: String,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

pub trait GeocodeTransport: Send + Sync {
    fn send(&self, request: &GeocodeRequest<'_>) -> Result<GeocodeResponse, TransportError>;
}

/// Blocking reqwest transport.
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl GeocodeTransport for HttpTransport {
    fn send(&self, request: &GeocodeRequest<'_>) -> Result<GeocodeResponse, TransportError> {
        let key = request.key.expose_secret();
        let mut query = vec![("address", request.address), ("key", key)];
        if let Some(types) = request.types {
            query.push(("types", types));
        }

        tracing::debug!(endpoint = %redact_url(&self.endpoint), "Sending geocode request");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&query)
            .send()
            .map_err(|e| TransportError::Request(scrub_secret(&e.without_url().to_string(), key)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: scrub_secret(&truncate_body(&body), key),
            });
        }

        response
            .json::<GeocodeResponse>()
            .map_err(|e| TransportError::Decode(scrub_secret(&e.without_url().to_string(), key)))
    }
}
