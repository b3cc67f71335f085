//! Tracing setup.
//!
//! The terminal is owned by the UI, so logs go to a file or nowhere.  The
//! level comes from `RUST_LOG`, defaulting to `info` for this crate and
//! `warn` for everything else.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "headline_gate=info,warn";

/// Install the global subscriber, appending to `log_file` if one is given.
pub fn init(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .try_init()
        .context("installing tracing subscriber")?;

    tracing::info!(path = %path.display(), "logging started");
    Ok(())
}
