//! Logging bootstrap for DCIS services.
//!
//! Centralizes `tracing` subscriber setup. Log level comes from the
//! `RUST_LOG` environment variable, defaulting to `info`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize human-readable log output.
///
/// # Example
/// ```no_run
/// dcis_core::logging::init();
/// tracing::info!("service started");
/// ```
pub fn init() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_target(true))
        .init();
}

/// Initialize JSON log output for aggregation pipelines.
pub fn init_json() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().json().with_target(true))
        .init();
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}
