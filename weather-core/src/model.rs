use serde::{Deserialize, Serialize};
use std::fmt;

/// Telegram-style numeric chat identifier.
pub type ChatId = i64;

/// Factor converting the provider's hPa into mmHg for display.
pub const HPA_TO_MMHG: f64 = 0.750_063_755_419_21;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherCondition {
    pub description: String,
}

/// One weather sample: either the current observation or a forecast interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub city_name: String,
    pub temperature: f64,
    pub min_temperature: f64,
    pub max_temperature: f64,
    /// Relative humidity, always within 0..=100.
    pub humidity: u8,
    pub pressure_hpa: f64,
    pub conditions: Vec<WeatherCondition>,
    pub sample_time_text: String,
}

impl CurrentWeather {
    pub fn pressure_mmhg(&self) -> i64 {
        (self.pressure_hpa * HPA_TO_MMHG).round() as i64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastCity {
    pub name: String,
    pub country: String,
}

/// Forecast samples in the chronological order the provider returned them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub city: ForecastCity,
    pub samples: Vec<CurrentWeather>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    /// Token sent to the weather provider's `units` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for UnitSystem {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial."
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(pressure_hpa: f64) -> CurrentWeather {
        CurrentWeather {
            city_name: "Paris".into(),
            temperature: 15.4,
            min_temperature: 14.0,
            max_temperature: 16.0,
            humidity: 60,
            pressure_hpa,
            conditions: vec![],
            sample_time_text: String::new(),
        }
    }

    #[test]
    fn pressure_is_converted_to_mmhg_and_rounded() {
        assert_eq!(sample(1013.0).pressure_mmhg(), 760);
        assert_eq!(sample(1000.0).pressure_mmhg(), 750);
        assert_eq!(sample(0.0).pressure_mmhg(), 0);
    }

    #[test]
    fn unit_system_parses_case_insensitively() {
        assert_eq!(UnitSystem::try_from("Imperial").unwrap(), UnitSystem::Imperial);
        assert_eq!(UnitSystem::try_from("metric").unwrap(), UnitSystem::Metric);
        assert!(UnitSystem::try_from("kelvin").is_err());
    }

    #[test]
    fn default_unit_system_is_metric() {
        assert_eq!(UnitSystem::default(), UnitSystem::Metric);
    }
}
