//! Localized message templates.
//!
//! Templates are looked up by ([language], [`MessageKey`]) and carry
//! positional slots (`{0}`, `{1}`, ...). A [`Templates`] value is the
//! explicit localization context handed to the formatter and router.

use anyhow::{Context, Result};
use std::{
    collections::{BTreeMap, HashMap},
    fmt::{Display, Write},
};

pub const DEFAULT_LANGUAGE: &str = "en";

const BUILTIN_BUNDLES: &[(&str, &str)] = &[
    ("en", include_str!("../locales/en.toml")),
    ("ru", include_str!("../locales/ru.toml")),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    Start,
    Help,
    UnknownCommand,
    LocationGetError,
    WeatherGetError,
    ForecastGetError,
    CurrentWeatherFormat,
    ForecastItemFormat,
    ForecastFormat,
    LocationPrompt,
    LocationButton,
    UnitsSet,
    UnitsUsage,
    LanguageSet,
    LanguageUsage,
}

impl MessageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKey::Start => "start",
            MessageKey::Help => "help",
            MessageKey::UnknownCommand => "unknown_command",
            MessageKey::LocationGetError => "location_get_error",
            MessageKey::WeatherGetError => "weather_get_error",
            MessageKey::ForecastGetError => "forecast_get_error",
            MessageKey::CurrentWeatherFormat => "current_weather_format",
            MessageKey::ForecastItemFormat => "forecast_item_format",
            MessageKey::ForecastFormat => "forecast_format",
            MessageKey::LocationPrompt => "location_prompt",
            MessageKey::LocationButton => "location_button",
            MessageKey::UnitsSet => "units_set",
            MessageKey::UnitsUsage => "units_usage",
            MessageKey::LanguageSet => "language_set",
            MessageKey::LanguageUsage => "language_usage",
        }
    }

    pub const fn all() -> &'static [MessageKey] {
        &[
            MessageKey::Start,
            MessageKey::Help,
            MessageKey::UnknownCommand,
            MessageKey::LocationGetError,
            MessageKey::WeatherGetError,
            MessageKey::ForecastGetError,
            MessageKey::CurrentWeatherFormat,
            MessageKey::ForecastItemFormat,
            MessageKey::ForecastFormat,
            MessageKey::LocationPrompt,
            MessageKey::LocationButton,
            MessageKey::UnitsSet,
            MessageKey::UnitsUsage,
            MessageKey::LanguageSet,
            MessageKey::LanguageUsage,
        ]
    }
}

type Bundle = HashMap<String, String>;

/// All template bundles known to the process, keyed by language code.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    bundles: BTreeMap<String, Bundle>,
}

impl Catalog {
    /// Bundles compiled into the binary.
    pub fn builtin() -> Result<Self> {
        let mut catalog = Self::default();
        for (language, source) in BUILTIN_BUNDLES {
            let bundle: Bundle = toml::from_str(source)
                .with_context(|| format!("Failed to parse built-in '{language}' templates"))?;
            catalog.insert(language, bundle);
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, language: &str, bundle: HashMap<String, String>) {
        self.bundles.insert(language.to_lowercase(), bundle);
    }

    pub fn supports(&self, language: &str) -> bool {
        self.bundles.contains_key(&language.to_lowercase())
    }

    pub fn languages(&self) -> Vec<&str> {
        self.bundles.keys().map(String::as_str).collect()
    }

    /// Templates for `language`, falling back to English per key.
    pub fn templates(&self, language: &str) -> Templates<'_> {
        Templates {
            primary: self.bundles.get(&language.to_lowercase()),
            fallback: self.bundles.get(DEFAULT_LANGUAGE),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Templates<'a> {
    primary: Option<&'a Bundle>,
    fallback: Option<&'a Bundle>,
}

impl<'a> Templates<'a> {
    /// Raw template; the key name itself when no bundle defines it.
    pub fn get(&self, key: MessageKey) -> &'a str {
        self.primary
            .and_then(|b| b.get(key.as_str()))
            .or_else(|| self.fallback.and_then(|b| b.get(key.as_str())))
            .map(String::as_str)
            .unwrap_or(key.as_str())
    }

    pub fn render(&self, key: MessageKey, args: &[&dyn Display]) -> String {
        render(self.get(key), args)
    }
}

/// Substitute `{N}` slots with `args[N]`. Unknown slots are left as written.
pub fn render(template: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let slot = after
            .find('}')
            .and_then(|close| after[..close].parse::<usize>().ok().map(|idx| (idx, close)))
            .and_then(|(idx, close)| args.get(idx).map(|arg| (arg, close)));

        match slot {
            Some((arg, close)) => {
                let _ = write!(out, "{arg}");
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
