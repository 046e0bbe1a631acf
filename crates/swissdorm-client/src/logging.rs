use tracing_subscriber::{fmt, EnvFilter};

pub const DEFAULT_FILTER: &str = "swissdorm_client=debug,swissdorm_store=info,warn";

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence, then `filter`, then [`DEFAULT_FILTER`].
/// Calling this again after a subscriber is installed does nothing.
pub fn init(filter: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        filter
            .and_then(|f| EnvFilter::try_new(f).ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
    });

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
