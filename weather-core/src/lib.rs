//! Core library for the weather chat assistant.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Weather and geocoding provider clients
//! - Localized templates and response formatting
//! - Per-chat sessions, command routing and per-chat task queues
//!
//! It is used by `weather-bot`, but knows nothing about the messaging
//! platform beyond the [`ChatTransport`] trait.

pub mod config;
pub mod error;
pub mod format;
pub mod geocode;
pub mod locale;
pub mod model;
pub mod provider;
pub mod queue;
pub mod router;
pub mod session;

#[cfg(test)]
mod testing;

pub use config::{Config, ProviderConfig};
pub use error::{GeocodingError, ParseError, ProviderError, TransportError};
pub use format::{format_current_weather, format_forecast};
pub use geocode::{
    AddressComponent, GeocodeResult, Geocoder, LocationResolver, geocoder_from_config,
};
pub use locale::{Catalog, MessageKey, Templates};
pub use model::{
    ChatId, Coordinates, CurrentWeather, Forecast, ForecastCity, UnitSystem, WeatherCondition,
};
pub use provider::{WeatherProvider, provider_from_config};
pub use queue::ChatQueues;
pub use router::{ChatTransport, CommandRouter, InboundEvent, OutboundMessage, ReplyMarkup};
pub use session::{SessionState, SessionStore};
