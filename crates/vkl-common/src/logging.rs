use tracing_subscriber::{fmt, EnvFilter};

/// Initialize structured logging with environment filter.
/// Set VKL_LOG=debug (or trace, info, warn, error) for verbosity control.
///
/// The layer lives inside someone else's process, so an already installed
/// global subscriber is left alone.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env("VKL_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .try_init();
}
