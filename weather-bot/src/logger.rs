use anyhow::Context;
use std::{fs::OpenOptions, io, sync::Arc};
use tracing_subscriber::{
    EnvFilter, Registry, fmt::writer::MakeWriterExt, layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Install the global tracing subscriber.
///
/// Level comes from `RUST_LOG` (default `info`). With `log_file` set, the
/// same formatted output is appended to that file as well as stdout.
pub fn init_tracing(log_file: Option<&str>) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = Registry::default().with(env_filter);

    let result = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {path}"))?;
            let writer = io::stdout.and(Arc::new(file));

            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false)
                        .with_target(true)
                        .with_thread_ids(true),
                )
                .try_init()
        }
        None => registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {e}"))
}
