// Logging module - Logging infrastructure
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use std::io;

/// Build the filter: `RUST_LOG` wins, otherwise `level` (or debug when verbose)
pub fn build_filter(level: &str, verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { level };
        EnvFilter::new(format!("sppcom={},warn", level))
    })
}

/// Initialize logging system.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_logging(level: &str, verbose: bool) -> bool {
    let installed = tracing_subscriber::registry()
        .with(build_filter(level, verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(verbose)
                .with_level(true)
                .with_thread_ids(false)
                .with_file(verbose)
                .with_line_number(verbose),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!("SppCom logging system initialized");
    }
    installed
}
