use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::{
    error::{ParseError, ProviderError, truncate_body},
    model::{CurrentWeather, Forecast, ForecastCity, UnitSystem, WeatherCondition},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "http://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(
        api_key: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn fetch(
        &self,
        endpoint: &str,
        city: &str,
        language: &str,
        units: UnitSystem,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(endpoint, city, language, units = %units, "requesting weather provider");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("APPID", self.api_key.as_str()),
                ("lang", language),
                ("units", units.as_str()),
                ("q", city),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(
        &self,
        city: &str,
        language: &str,
        units: UnitSystem,
    ) -> Result<CurrentWeather, ProviderError> {
        let body = self.fetch("weather", city, language, units).await?;
        Ok(parse_current(&body)?)
    }

    async fn forecast(
        &self,
        city: &str,
        language: &str,
        units: UnitSystem,
    ) -> Result<Forecast, ProviderError> {
        let body = self.fetch("forecast", city, language, units).await?;
        Ok(parse_forecast(&body)?)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: i64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: Option<i64>,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: Option<i64>,
    dt_txt: Option<String>,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

pub(crate) fn parse_current(body: &str) -> Result<CurrentWeather, ParseError> {
    let parsed: OwCurrentResponse = serde_json::from_str(body)?;
    let sample_time_text = sample_time(None, parsed.dt);
    into_sample(parsed.name, parsed.main, parsed.weather, sample_time_text)
}

pub(crate) fn parse_forecast(body: &str) -> Result<Forecast, ParseError> {
    let parsed: OwForecastResponse = serde_json::from_str(body)?;

    let samples = parsed
        .list
        .into_iter()
        .map(|entry| {
            let sample_time_text = sample_time(entry.dt_txt, entry.dt);
            into_sample(parsed.city.name.clone(), entry.main, entry.weather, sample_time_text)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Forecast {
        city: ForecastCity {
            name: parsed.city.name,
            country: parsed.city.country,
        },
        samples,
    })
}

fn into_sample(
    city_name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    sample_time_text: String,
) -> Result<CurrentWeather, ParseError> {
    let humidity = u8::try_from(main.humidity)
        .ok()
        .filter(|h| *h <= 100)
        .ok_or_else(|| ParseError::InvalidField {
            field: "main.humidity",
            reason: format!("{} is outside 0..=100", main.humidity),
        })?;

    Ok(CurrentWeather {
        city_name,
        temperature: main.temp,
        min_temperature: main.temp_min,
        max_temperature: main.temp_max,
        humidity,
        pressure_hpa: main.pressure,
        conditions: weather
            .into_iter()
            .map(|w| WeatherCondition { description: w.description })
            .collect(),
        sample_time_text,
    })
}

fn sample_time(dt_txt: Option<String>, dt: Option<i64>) -> String {
    dt_txt
        .or_else(|| {
            dt.and_then(|ts| DateTime::from_timestamp(ts, 0))
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        })
        .unwrap_or_default()
}
