//! Tracing subscriber setup for the CLI.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. Logs go to stderr so stdout stays parseable.
///
/// `RUST_LOG` wins when set; otherwise `verbose` selects `debug`, else `warn`.
pub fn init(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    // A subscriber may already be installed (e.g. by a test harness).
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
