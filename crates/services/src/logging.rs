use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber for the process.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` is used
/// (e.g. `"info,services=debug"`). Returns `false` if a global subscriber
/// was already installed.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
