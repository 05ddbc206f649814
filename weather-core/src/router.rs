//! Command routing: one inbound chat event in, at most one reply out.
//!
//! Every failure below this layer is logged and turned into a localized
//! error reply; nothing propagates back to the event loop.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::{
    error::TransportError,
    format::{format_current_weather, format_forecast},
    geocode::LocationResolver,
    locale::{Catalog, MessageKey, Templates},
    model::{ChatId, Coordinates, UnitSystem},
    provider::WeatherProvider,
    session::{SessionState, SessionStore},
};

/// Inbound update from the messaging platform.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub chat_id: ChatId,
    pub message_id: i32,
    pub text: Option<String>,
    pub location: Option<Coordinates>,
}

impl InboundEvent {
    pub fn text(chat_id: ChatId, message_id: i32, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            message_id,
            text: Some(text.into()),
            location: None,
        }
    }

    pub fn location(chat_id: ChatId, message_id: i32, coordinates: Coordinates) -> Self {
        Self {
            chat_id,
            message_id,
            text: None,
            location: Some(coordinates),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyMarkup {
    /// Single button asking the platform for the user's current location.
    RequestLocation { label: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub chat_id: ChatId,
    pub text: String,
    pub reply_to: Option<i32>,
    pub markup: Option<ReplyMarkup>,
}

impl OutboundMessage {
    pub fn reply(event: &InboundEvent, text: String) -> Self {
        Self {
            chat_id: event.chat_id,
            text,
            reply_to: Some(event.message_id),
            markup: None,
        }
    }
}

/// Outbound side of the messaging platform.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<(), TransportError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Weather,
    Forecast,
    Location,
    Units,
    Language,
    Unknown,
}

const COMMANDS: &[(&str, Command)] = &[
    ("/start", Command::Start),
    ("/help", Command::Help),
    ("/weather", Command::Weather),
    ("/forecast", Command::Forecast),
    ("/location", Command::Location),
    ("/units", Command::Units),
    ("/language", Command::Language),
];

/// Split text into a command and its optional argument.
///
/// The token is the first word, compared exactly after dropping a
/// `@botname` suffix. Anything else is [`Command::Unknown`]. Returns `None`
/// when the suffix names a bot other than `bot_username`.
pub fn parse_command<'a>(
    text: &'a str,
    bot_username: Option<&str>,
) -> Option<(Command, Option<&'a str>)> {
    let trimmed = text.trim();
    let (token, rest) = trimmed
        .split_once(char::is_whitespace)
        .unwrap_or((trimmed, ""));

    let token = match (token.split_once('@'), bot_username) {
        (Some((_, addressee)), Some(me)) if !addressee.eq_ignore_ascii_case(me) => return None,
        (Some((name, _)), _) => name,
        (None, _) => token,
    };

    let command = COMMANDS
        .iter()
        .find(|(literal, _)| *literal == token)
        .map_or(Command::Unknown, |(_, command)| *command);

    let argument = Some(rest.trim()).filter(|a| !a.is_empty());
    Some((command, argument))
}

pub struct CommandRouter {
    weather: Arc<dyn WeatherProvider>,
    resolver: LocationResolver,
    sessions: Arc<SessionStore>,
    catalog: Arc<Catalog>,
    transport: Arc<dyn ChatTransport>,
    bot_username: Option<String>,
}

impl CommandRouter {
    pub fn new(
        weather: Arc<dyn WeatherProvider>,
        resolver: LocationResolver,
        sessions: Arc<SessionStore>,
        catalog: Arc<Catalog>,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        Self {
            weather,
            resolver,
            sessions,
            catalog,
            transport,
            bot_username: None,
        }
    }

    /// Ignore `/command@other` addressed to a different bot.
    pub fn with_bot_username(mut self, username: impl Into<String>) -> Self {
        self.bot_username = Some(username.into());
        self
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Process one event and deliver the reply, if any.
    pub async fn dispatch(&self, event: &InboundEvent) {
        let Some(reply) = self.handle(event).await else {
            return;
        };

        let Err(e) = self.transport.send(&reply).await else {
            return;
        };
        error!(chat_id = event.chat_id, operation = "send", error = %e, "Cannot send message");

        if reply.markup.is_some() {
            let language = self.sessions.get(event.chat_id).language;
            let fallback = OutboundMessage::reply(
                event,
                self.catalog
                    .templates(&language)
                    .get(MessageKey::LocationGetError)
                    .to_string(),
            );
            if let Err(e) = self.transport.send(&fallback).await {
                error!(
                    chat_id = event.chat_id,
                    operation = "send_location_error",
                    error = %e,
                    "Cannot send location error message"
                );
            }
        }
    }

    /// Compute the reply for an event. Location-only events and commands
    /// addressed to another bot produce none.
    pub async fn handle(&self, event: &InboundEvent) -> Option<OutboundMessage> {
        if let Some(coordinates) = event.location {
            self.on_location(event.chat_id, coordinates).await;
        }

        let text = event.text.as_deref()?;
        let Some((command, argument)) = parse_command(text, self.bot_username.as_deref()) else {
            debug!(chat_id = event.chat_id, "Command addressed to another bot");
            return None;
        };
        Some(self.on_text(event, command, argument).await)
    }

    async fn on_location(&self, chat_id: ChatId, coordinates: Coordinates) {
        let language = self.sessions.get(chat_id).language;

        match self.resolver.resolve(coordinates, &language).await {
            Ok(city) if city.is_empty() => {
                warn!(
                    chat_id,
                    latitude = coordinates.latitude,
                    longitude = coordinates.longitude,
                    "No locality found for shared location, keeping previous city"
                );
            }
            Ok(city) => {
                info!(chat_id, city = %city, "Location resolved");
                self.sessions.update(chat_id, |s| s.resolved_city = Some(city));
            }
            Err(e) => {
                error!(chat_id, operation = "geocode", error = %e, "Cannot get location data");
            }
        }
    }

    async fn on_text(
        &self,
        event: &InboundEvent,
        command: Command,
        argument: Option<&str>,
    ) -> OutboundMessage {
        let session = self.sessions.get(event.chat_id);
        let templates = self.catalog.templates(&session.language);

        info!(chat_id = event.chat_id, command = ?command, "Dispatching command");

        match command {
            Command::Start => reply(event, &templates, MessageKey::Start),
            Command::Help => reply(event, &templates, MessageKey::Help),
            Command::Unknown => reply(event, &templates, MessageKey::UnknownCommand),
            Command::Weather => {
                let city = argument.or(session.city());
                let text = self
                    .current_weather_text(event.chat_id, &session, city, &templates)
                    .await;
                OutboundMessage::reply(event, text)
            }
            Command::Forecast => {
                let city = argument.or(session.city());
                let text = self.forecast_text(event.chat_id, &session, city, &templates).await;
                OutboundMessage::reply(event, text)
            }
            Command::Location => OutboundMessage {
                markup: Some(ReplyMarkup::RequestLocation {
                    label: templates.get(MessageKey::LocationButton).to_string(),
                }),
                ..reply(event, &templates, MessageKey::LocationPrompt)
            },
            Command::Units => self.set_units(event, argument, &templates),
            Command::Language => self.set_language(event, argument, &templates),
        }
    }

    async fn current_weather_text(
        &self,
        chat_id: ChatId,
        session: &SessionState,
        city: Option<&str>,
        templates: &Templates<'_>,
    ) -> String {
        let Some(city) = city else {
            warn!(chat_id, operation = "weather", "No city resolved for chat");
            return templates.get(MessageKey::WeatherGetError).to_string();
        };

        match self
            .weather
            .current_weather(city, &session.language, session.unit_system)
            .await
        {
            Ok(weather) => format_current_weather(&weather, templates),
            Err(e) => {
                error!(chat_id, operation = "weather", city, error = %e, "Weather error");
                templates.get(MessageKey::WeatherGetError).to_string()
            }
        }
    }

    async fn forecast_text(
        &self,
        chat_id: ChatId,
        session: &SessionState,
        city: Option<&str>,
        templates: &Templates<'_>,
    ) -> String {
        let Some(city) = city else {
            warn!(chat_id, operation = "forecast", "No city resolved for chat");
            return templates.get(MessageKey::ForecastGetError).to_string();
        };

        match self
            .weather
            .forecast(city, &session.language, session.unit_system)
            .await
        {
            Ok(forecast) => format_forecast(&forecast, templates),
            Err(e) => {
                error!(chat_id, operation = "forecast", city, error = %e, "Forecast error");
                templates.get(MessageKey::ForecastGetError).to_string()
            }
        }
    }

    fn set_units(
        &self,
        event: &InboundEvent,
        argument: Option<&str>,
        templates: &Templates<'_>,
    ) -> OutboundMessage {
        let Some(units) = argument.and_then(|a| UnitSystem::try_from(a).ok()) else {
            return reply(event, templates, MessageKey::UnitsUsage);
        };

        self.sessions.update(event.chat_id, |s| s.unit_system = units);
        info!(chat_id = event.chat_id, units = %units, "Units changed");
        OutboundMessage::reply(event, templates.render(MessageKey::UnitsSet, &[&units]))
    }

    fn set_language(
        &self,
        event: &InboundEvent,
        argument: Option<&str>,
        templates: &Templates<'_>,
    ) -> OutboundMessage {
        let Some(language) = argument
            .map(str::to_lowercase)
            .filter(|l| self.catalog.supports(l))
        else {
            let supported = self.catalog.languages().join(", ");
            return OutboundMessage::reply(
                event,
                templates.render(MessageKey::LanguageUsage, &[&supported]),
            );
        };

        self.sessions
            .update(event.chat_id, |s| s.language = language.clone());
        info!(chat_id = event.chat_id, language = %language, "Language changed");

        let text = self
            .catalog
            .templates(&language)
            .render(MessageKey::LanguageSet, &[&language]);
        OutboundMessage::reply(event, text)
    }
}

fn reply(event: &InboundEvent, templates: &Templates<'_>, key: MessageKey) -> OutboundMessage {
    OutboundMessage::reply(event, templates.get(key).to_string())
}
