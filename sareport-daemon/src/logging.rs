//! Log output for the sareport daemon.
//!
//! The poller, processor and consumer log one event per report, keyed by
//! `test_id` (the report file name) and, once a report is archived, `result`
//! and `archived`. `log_format = "json"` writes those events as one JSON object
//! per line for a log shipper. `"pretty"` is meant for running the daemon in
//! a terminal while watching a test directory.

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use sareport_core::config::GeneralConfig;

/// Output format selected by `general.log_format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    /// One JSON object per event, with event fields nested under `fields`.
    Json,
    /// Multi-line, colored output with source locations.
    Pretty,
}

impl LogFormat {
    fn from_config(value: &str) -> Result<Self> {
        match value {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(anyhow!(
                "unknown log format '{other}', expected 'json' or 'pretty'"
            )),
        }
    }
}

/// Installs the global subscriber for the daemon process.
///
/// Call once from `main` after the config is loaded. A `RUST_LOG` value
/// overrides `general.log_level`, so a single pipeline stage can be raised
/// to `debug` without editing the config file
/// (e.g. `RUST_LOG=info,sareport_pipeline::collector=debug`).
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let format = LogFormat::from_config(&config.log_format)?;
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
    }
    .map_err(|e| anyhow!("failed to install {format:?} log subscriber: {e}"))
}
