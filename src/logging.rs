//! Tracing subscriber setup for the binary

use tracing_subscriber::EnvFilter;

/// Install a stderr `fmt` subscriber.
///
/// `RUST_LOG` wins when set; otherwise verbosity picks the crate's level.
pub fn init(verbosity: u8) {
    let default_level = match verbosity {
        0 => "omnilink=info",
        1 => "omnilink=debug",
        _ => "omnilink=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into());

    // a subscriber may already be installed (tests, embedding apps)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
