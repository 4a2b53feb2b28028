//! Tracing subscriber setup.
//!
//! Logs go to stderr so report/fetch output on stdout stays pipeable.
//! `RUST_LOG` overrides the default filter.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_TARGET: &str = "cpi_dash";

/// Filter used when `RUST_LOG` is unset.
///
/// The TUI owns the terminal, so it logs nothing unless asked to.
pub fn default_filter(verbose: u8, tui: bool) -> String {
    if tui {
        return "off".to_string();
    }
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    format!("{DEFAULT_TARGET}={level}")
}

/// Install the global subscriber. Safe to call more than once.
pub fn init(verbose: u8, tui: bool) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbose, tui)));

    let format_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(format_layer)
        .try_init();
}
