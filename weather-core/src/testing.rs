//! In-memory collaborators shared by the unit tests.

use async_trait::async_trait;
use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::sync::mpsc;

use crate::{
    error::{GeocodingError, ProviderError, TransportError},
    geocode::{AddressComponent, GeocodeResult, Geocoder},
    model::{Coordinates, CurrentWeather, Forecast, ForecastCity, UnitSystem, WeatherCondition},
    provider::WeatherProvider,
    router::{ChatTransport, OutboundMessage},
};

pub type WeatherCall = (String, String, String, UnitSystem);

#[derive(Debug, Default)]
pub struct FakeWeather {
    failing: AtomicBool,
    delays: Mutex<HashMap<String, Duration>>,
    calls: Mutex<Vec<WeatherCall>>,
}

impl FakeWeather {
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn delay_for(&self, city: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(city.to_string(), delay);
    }

    pub fn calls(&self) -> Vec<WeatherCall> {
        self.calls.lock().unwrap().clone()
    }

    async fn record(
        &self,
        endpoint: &str,
        city: &str,
        language: &str,
        units: UnitSystem,
    ) -> Result<(), ProviderError> {
        self.calls.lock().unwrap().push((
            endpoint.to_string(),
            city.to_string(),
            language.to_string(),
            units,
        ));

        let delay = self.delays.lock().unwrap().get(city).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(ProviderError::Status {
                status: 500,
                body: "internal error".into(),
            });
        }
        Ok(())
    }
}

pub fn sample(city: &str, time: &str) -> CurrentWeather {
    CurrentWeather {
        city_name: city.to_string(),
        temperature: 15.4,
        min_temperature: 13.6,
        max_temperature: 17.5,
        humidity: 60,
        pressure_hpa: 1013.0,
        conditions: vec![WeatherCondition {
            description: "clear sky".into(),
        }],
        sample_time_text: time.to_string(),
    }
}

#[async_trait]
impl WeatherProvider for FakeWeather {
    async fn current_weather(
        &self,
        city: &str,
        language: &str,
        units: UnitSystem,
    ) -> Result<CurrentWeather, ProviderError> {
        self.record("weather", city, language, units).await?;
        Ok(sample(city, "2024-05-01 12:00:00"))
    }

    async fn forecast(
        &self,
        city: &str,
        language: &str,
        units: UnitSystem,
    ) -> Result<Forecast, ProviderError> {
        self.record("forecast", city, language, units).await?;
        Ok(Forecast {
            city: ForecastCity {
                name: city.to_string(),
                country: "FR".into(),
            },
            samples: vec![
                sample(city, "2024-05-01 12:00:00"),
                sample(city, "2024-05-01 15:00:00"),
            ],
        })
    }
}

/// Geocoder answering from a queue of scripted responses.
#[derive(Debug, Default)]
pub struct FakeGeocoder {
    responses: Mutex<VecDeque<Result<Vec<GeocodeResult>, GeocodingError>>>,
}

impl FakeGeocoder {
    pub fn push(&self, response: Result<Vec<GeocodeResult>, GeocodingError>) {
        self.responses.lock().unwrap().push_back(response);
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn reverse(
        &self,
        _coordinates: Coordinates,
        _language: &str,
    ) -> Result<Vec<GeocodeResult>, GeocodingError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(GeocodingError::NoResults))
    }
}

pub fn locality(name: &str) -> GeocodeResult {
    GeocodeResult {
        address_components: vec![AddressComponent {
            long_name: name.to_string(),
            types: vec!["locality".into(), "political".into()],
        }],
    }
}

#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<OutboundMessage>>,
    reject_markup: AtomicBool,
    reject_all: AtomicBool,
    watcher: Mutex<Option<mpsc::UnboundedSender<OutboundMessage>>>,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Fail every message carrying reply markup.
    pub fn reject_markup(&self) {
        self.reject_markup.store(true, Ordering::SeqCst);
    }

    /// Fail every message while set.
    pub fn reject_all(&self, reject: bool) {
        self.reject_all.store(reject, Ordering::SeqCst);
    }

    pub fn watch(&self) -> mpsc::UnboundedReceiver<OutboundMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.watcher.lock().unwrap() = Some(tx);
        rx
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send(&self, message: &OutboundMessage) -> Result<(), TransportError> {
        if self.reject_all.load(Ordering::SeqCst) {
            return Err(TransportError("chat unavailable".into()));
        }
        if message.markup.is_some() && self.reject_markup.load(Ordering::SeqCst) {
            return Err(TransportError("keyboard rejected".into()));
        }

        self.sent.lock().unwrap().push(message.clone());
        if let Some(tx) = self.watcher.lock().unwrap().as_ref() {
            let _ = tx.send(message.clone());
        }
        Ok(())
    }
}
