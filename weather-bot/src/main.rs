//! Binary crate for the `weather-bot` Telegram assistant.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - Logging setup and the Telegram transport

use clap::Parser;

mod cli;
mod logger;
mod telegram;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    cmd.run().await
}
