use serde::Serialize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs the fmt subscriber. `default_filter` applies when `RUST_LOG` is unset.
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Per-invocation figures logged by the handler once the page is rendered.
#[derive(Debug, Default, Clone, Serialize)]
pub struct InvocationMetrics {
    pub object_bytes: usize,
    pub row_bytes: usize,
    pub object_read_ms: u128,
    pub query_ms: u128,
    pub total_ms: u128,
}
