use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select, Text};
use std::sync::Arc;
use teloxide::prelude::Requester;
use tracing::info;
use weather_core::{
    Catalog, ChatQueues, CommandRouter, Config, LocationResolver, SessionStore, UnitSystem,
    geocoder_from_config, provider_from_config,
};

use crate::{logger, telegram};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-bot", version, about = "Weather assistant for Telegram")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the bot and process chat updates until interrupted.
    Run,

    /// Interactively store the bot token, API keys and defaults.
    Configure,

    /// Print the location of the config file.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Run => run_bot().await,
            Command::Configure => configure(),
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

/// File config with environment overrides (`.env` included).
fn load_config() -> anyhow::Result<Config> {
    let _ = dotenvy::dotenv();
    let mut config = Config::load()?;
    config.apply_env()?;
    Ok(config)
}

async fn run_bot() -> anyhow::Result<()> {
    let config = load_config()?;
    logger::init_tracing(config.log_file.as_deref())?;

    let token = config.bot_token().ok_or_else(|| {
        anyhow::anyhow!(
            "No bot token configured.\n\
             Hint: run `weather-bot configure` or set BOT_TOKEN."
        )
    })?;

    let weather = provider_from_config(&config)?;
    let geocoder = geocoder_from_config(&config)?;
    let catalog = Catalog::builtin()?;
    if !catalog.supports(&config.default_language) {
        tracing::warn!(
            language = %config.default_language,
            "No templates for default language, English will be used"
        );
    }

    let bot = teloxide::Bot::new(token);
    let me = bot.get_me().await.context("Failed to reach the Telegram Bot API")?;
    info!(username = ?me.user.username, "Connected to Telegram");

    let mut router = CommandRouter::new(
        weather,
        LocationResolver::new(geocoder),
        Arc::new(SessionStore::new(config.session_defaults())),
        Arc::new(catalog),
        Arc::new(telegram::TelegramTransport::new(bot.clone())),
    );
    if let Some(username) = me.user.username {
        router = router.with_bot_username(username);
    }
    let queues = Arc::new(ChatQueues::new(Arc::new(router)));

    info!(
        language = %config.default_language,
        units = %config.default_units,
        timeout_secs = config.request_timeout_secs,
        "Starting weather bot"
    );
    telegram::run(bot, queues).await;
    info!("Weather bot stopped");
    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    if let Some(token) = secret("Telegram bot token:", config.bot_token())? {
        config.bot_token = Some(token);
    }
    if let Some(key) = secret("OpenWeather API key:", config.weather_api_key())? {
        config.weather.api_key = Some(key);
    }
    if let Some(key) = secret("Google Geocoding API key:", config.geocoding_api_key())? {
        config.geocoding.api_key = Some(key);
    }

    config.default_language = Text::new("Default language:")
        .with_default(&config.default_language)
        .prompt()?
        .trim()
        .to_lowercase();

    let units = Select::new(
        "Default units:",
        vec![UnitSystem::Metric.as_str(), UnitSystem::Imperial.as_str()],
    )
    .with_starting_cursor(usize::from(config.default_units == UnitSystem::Imperial))
    .prompt()?;
    config.default_units = UnitSystem::try_from(units)?;

    config.save().context("Failed to save configuration")?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

/// Prompt for a secret; empty input keeps the current value.
fn secret(prompt: &str, current: Option<&str>) -> anyhow::Result<Option<String>> {
    let help = if current.is_some() {
        "Leave empty to keep the current value"
    } else {
        "Not configured yet"
    };

    let value = Password::new(prompt)
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_help_message(help)
        .prompt()?;

    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_string()))
}
