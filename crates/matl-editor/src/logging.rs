//! Tracing setup for the editor binary

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "matl_editor=debug,matl_renderer=info";

/// Install the global subscriber. Honors `RUST_LOG`.
pub fn init() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
