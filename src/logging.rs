//! Structured logging setup.

use crate::cli::Args;
use crate::error::{MergeError, Result};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber for a merge run.
///
/// `RUST_LOG` takes precedence over the `-v`/`-q` flags. Quiet mode drops the
/// timer and uses the compact formatter. Fails if a subscriber is already set.
pub fn setup_logging(args: &Args) -> Result<()> {
    let log_level = args.get_log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tmax_merge={}", log_level)));

    let installed = if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
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
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    installed.map_err(|error| {
        MergeError::configuration(format!("Cannot install log subscriber: {}", error))
    })?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}
