use tracing_subscriber::EnvFilter;

/// Installs a stderr subscriber. `RUST_LOG` wins when set; otherwise the
/// level follows the `-v` count (0 = warn, 1 = debug, 2+ = trace).
pub fn init(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (tests driving main twice) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
