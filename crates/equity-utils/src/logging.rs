//! Logging and tracing utilities

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info";

/// Initialize tracing subscriber with default configuration
pub fn init_tracing() {
    init_tracing_with_default(DEFAULT_FILTER);
}

/// Initialize tracing with a fallback filter used when `RUST_LOG` is unset.
///
/// Logs go to stderr so the report on stdout stays clean when piped.
/// Calling this twice is harmless; the second call is ignored.
pub fn init_tracing_with_default(default_filter: &str) {
    let _ = tracing_subscriber::registry()
        .with(filter_from_env(default_filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn filter_from_env(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_does_not_panic() {
        init_tracing_with_default("warn");
        init_tracing();
    }

    #[test]
    fn test_fallback_filter_parses() {
        let filter = EnvFilter::new("warn,equity_valuation=debug");
        assert!(filter.to_string().contains("equity_valuation=debug"));
    }
}
