//! Tracing setup shared by both binaries.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "shelterlens=debug,info";

/// Install the global fmt subscriber. `RUST_LOG` wins over the default.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
