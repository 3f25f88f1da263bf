//! Logging setup
//!
//! `RUST_LOG` overrides the default `smq=info` filter.

use anyhow::Result;
use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "smq=info";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Development: pretty formatting with colors
    Pretty,
    /// Production: JSON structured logging
    Json,
}

/// Install the global subscriber (logs go to stderr; stdin carries requests)
pub fn init_logging(format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?,
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init()?,
    }

    Ok(())
}
