use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::{
    Coordinates,
    error::{GeocodingError, truncate_body},
};

use super::{GeocodeResult, Geocoder};

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    api_key: String,
    base_url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
    results: Vec<GeocodeResult>,
}

impl GoogleGeocoder {
    pub fn new(
        api_key: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, GeocodingError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key,
            base_url,
            http,
        })
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn reverse(
        &self,
        coordinates: Coordinates,
        language: &str,
    ) -> Result<Vec<GeocodeResult>, GeocodingError> {
        let latlng = format!("{},{}", coordinates.latitude, coordinates.longitude);
        debug!(latlng = %latlng, language, "requesting reverse geocode");

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("language", language),
                ("latlng", latlng.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(GeocodingError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let parsed: GeocodeResponse = serde_json::from_str(&body)?;

        match parsed.status.as_deref() {
            None | Some("OK") | Some("ZERO_RESULTS") => Ok(parsed.results),
            Some(other) => Err(GeocodingError::Rejected {
                status: other.to_string(),
                message: parsed.error_message.unwrap_or_default(),
            }),
        }
    }
}
