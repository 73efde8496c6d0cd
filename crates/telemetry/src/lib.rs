//! Logging and tracing bootstrap.

use biblio_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::EnvFilter;

/// Initialize the tracing/logging pipeline.
///
/// Honors `RUST_LOG` when set; defaults to `info` for the service crates.
/// Safe to call more than once (later calls are no-ops), which keeps tests
/// that build their own subscribers from panicking.
pub fn init(settings: &TelemetrySettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,biblio=info,tower_http=info"));

    let result = match settings.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .try_init(),
    };

    if result.is_ok() {
        tracing::info!(target: "biblio-telemetry", format = ?settings.log_format, "telemetry initialized");
    }
}
