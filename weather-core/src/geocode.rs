//! Reverse geocoding: turn shared coordinates into a city name.
//!
//! [`Geocoder`] is the provider seam; [`LocationResolver`] applies the
//! locality selection on top of whatever the provider returns.

use crate::{Config, Coordinates, error::GeocodingError, geocode::google::GoogleGeocoder};
use async_trait::async_trait;
use serde::Deserialize;
use std::{fmt::Debug, sync::Arc, time::Duration};
use tracing::debug;

pub mod google;

const LOCALITY: &str = "locality";

#[derive(Debug, Clone, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

/// One ranked candidate from the geocoding provider.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
}

#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Candidates for the coordinates, best match first.
    async fn reverse(
        &self,
        coordinates: Coordinates,
        language: &str,
    ) -> Result<Vec<GeocodeResult>, GeocodingError>;
}

#[derive(Debug, Clone)]
pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }

    /// Resolve coordinates to a city name.
    ///
    /// An address without a locality component resolves to an empty string,
    /// not an error.
    pub async fn resolve(
        &self,
        coordinates: Coordinates,
        language: &str,
    ) -> Result<String, GeocodingError> {
        let results = self.geocoder.reverse(coordinates, language).await?;
        let first = results.first().ok_or(GeocodingError::NoResults)?;
        let city = locality_name(first).unwrap_or_default().to_string();

        debug!(
            latitude = coordinates.latitude,
            longitude = coordinates.longitude,
            city = %city,
            "resolved location"
        );
        Ok(city)
    }
}

/// First component whose leading type tag is `locality`.
pub fn locality_name(result: &GeocodeResult) -> Option<&str> {
    result
        .address_components
        .iter()
        .find(|c| {
            c.types
                .first()
                .is_some_and(|t| t.eq_ignore_ascii_case(LOCALITY))
        })
        .map(|c| c.long_name.as_str())
}

/// Construct the geocoder from config.
pub fn geocoder_from_config(config: &Config) -> anyhow::Result<Arc<dyn Geocoder>> {
    let api_key = config.geocoding_api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for the geocoding provider.\n\
                 Hint: run `weather-bot configure` or set GEOCODING_API_KEY."
        )
    })?;

    let geocoder = GoogleGeocoder::new(
        api_key.to_owned(),
        config.geocoding_base_url().to_string(),
        Duration::from_secs(config.request_timeout_secs),
    )?;

    Ok(Arc::new(geocoder))
}
