use crate::{
    Config, CurrentWeather, Forecast, UnitSystem, error::ProviderError,
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc, time::Duration};

pub mod openweather;

/// Weather data source. One outbound request per call, no retries.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_weather(
        &self,
        city: &str,
        language: &str,
        units: UnitSystem,
    ) -> Result<CurrentWeather, ProviderError>;

    async fn forecast(
        &self,
        city: &str,
        language: &str,
        units: UnitSystem,
    ) -> Result<Forecast, ProviderError>;
}

/// Construct the weather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config.weather_api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for the weather provider.\n\
                 Hint: run `weather-bot configure` or set WEATHER_API_KEY."
        )
    })?;

    let provider = OpenWeatherProvider::new(
        api_key.to_owned(),
        config.weather_base_url().to_string(),
        Duration::from_secs(config.request_timeout_secs),
    )?;

    Ok(Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("No API key configured"));
    }

    #[test]
    fn provider_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.weather.api_key = Some("KEY".to_string());

        assert!(provider_from_config(&cfg).is_ok());
    }
}
