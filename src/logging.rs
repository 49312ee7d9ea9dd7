/// Tracing setup for the app.
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const DEFAULT_LOG_FILTER: &str = "toss=info";

/// Parse a filter directive, falling back to the default on garbage
fn filter_from(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Initialize tracing with stderr output.
///
/// `RUST_LOG` wins over the configured directive.
pub fn init_logging(configured: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| filter_from(configured));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .init();
}
