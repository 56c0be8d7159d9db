//! Structured logging setup
//!
//! The library only emits `tracing` events; binaries and test harnesses call
//! [`init_logging`] once to install a subscriber.

use crate::error::{ObsError, Result};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a stderr subscriber filtered at `level` for this crate.
///
/// `RUST_LOG` takes precedence over `level` when set. Quiet mode uses the
/// compact format. Fails if a global subscriber is
/// already installed.
pub fn init_logging(level: &str, quiet: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("obs_processor={}", level)));

    let installed = if quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    installed.map_err(|e| ObsError::configuration(format!("Logging already initialized: {}", e)))?;

    debug!("Logging initialized at level: {}", level);
    Ok(())
}
