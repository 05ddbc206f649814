use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{
    geocode::google, locale::DEFAULT_LANGUAGE, model::UnitSystem, provider::openweather,
    session::SessionState,
};

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for one external provider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    /// Overrides the provider's public endpoint (e.g. for a proxy).
    pub base_url: Option<String>,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// bot_token = "123:abc"
/// default_language = "en"
/// default_units = "metric"
///
/// [weather]
/// api_key = "..."
/// base_url = "http://api.openweathermap.org/data/2.5"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bot_token: Option<String>,
    pub default_language: String,
    pub default_units: UnitSystem,
    pub request_timeout_secs: u64,
    pub log_file: Option<String>,
    pub weather: ProviderConfig,
    pub geocoding: ProviderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot_token: None,
            default_language: DEFAULT_LANGUAGE.to_string(),
            default_units: UnitSystem::default(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_file: None,
            weather: ProviderConfig::default(),
            geocoding: ProviderConfig::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, use defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-bot", "weather-bot")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Override fields from process environment variables.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Override fields from `lookup`; empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(token) = get("BOT_TOKEN") {
            self.bot_token = Some(token);
        }
        if let Some(key) = get("WEATHER_API_KEY") {
            self.weather.api_key = Some(key);
        }
        if let Some(key) = get("GEOCODING_API_KEY") {
            self.geocoding.api_key = Some(key);
        }
        if let Some(language) = get("WEATHER_LANGUAGE") {
            self.default_language = language.to_lowercase();
        }
        if let Some(units) = get("WEATHER_UNITS") {
            self.default_units = UnitSystem::try_from(units.as_str())
                .context("Invalid WEATHER_UNITS")?;
        }
        if let Some(path) = get("LOG_FILE") {
            self.log_file = Some(path);
        }
        Ok(())
    }

    pub fn bot_token(&self) -> Option<&str> {
        non_empty(self.bot_token.as_deref())
    }

    pub fn weather_api_key(&self) -> Option<&str> {
        non_empty(self.weather.api_key.as_deref())
    }

    pub fn geocoding_api_key(&self) -> Option<&str> {
        non_empty(self.geocoding.api_key.as_deref())
    }

    pub fn weather_base_url(&self) -> &str {
        non_empty(self.weather.base_url.as_deref()).unwrap_or(openweather::DEFAULT_BASE_URL)
    }

    pub fn geocoding_base_url(&self) -> &str {
        non_empty(self.geocoding.base_url.as_deref()).unwrap_or(google::DEFAULT_BASE_URL)
    }

    /// Session state new chats start with.
    pub fn session_defaults(&self) -> SessionState {
        SessionState {
            resolved_city: None,
            language: self.default_language.clone(),
            unit_system: self.default_units,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
