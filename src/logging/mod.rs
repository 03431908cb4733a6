// Logging setup
//
// RUST_LOG wins when set; otherwise `info`, or `debug` when asked for.

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. Calling it again is a no-op.
pub fn init(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
