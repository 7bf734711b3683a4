//! Structured logging bootstrap.
//!
//! Logs go to stderr so they never interleave with the status label on stdout.
//! `TIM_LOG` takes an `EnvFilter` directive and wins over the configured level.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "TIM_LOG";

/// Installs the global `tracing` subscriber.
///
/// Fails if a subscriber is already installed.
pub fn init(default_directive: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(anyhow::Error::msg)
}
