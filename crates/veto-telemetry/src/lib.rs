//! # Veto Telemetry
//!
//! Logging and metrics export for processes hosting veto-bus registries.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use veto_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let _guard = init_telemetry(TelemetryConfig::from_env()).expect("Failed to init telemetry");
//!     // Registrations, fires and vetoes are now logged
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `VB_SERVICE_NAME` | `veto-bus` | Service name in the startup log |
//! | `VB_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `VB_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `VB_JSON_LOGS` | `false` | JSON formatted logs |
//! | `VB_METRICS_ENABLED` | `false` | Expose Prometheus text |

mod config;
mod logging;
mod metrics;

pub use config::TelemetryConfig;
pub use metrics::gather_metrics;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    #[error("Failed to export Prometheus metrics: {0}")]
    Metrics(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Install the global subscriber described by `config`.
///
/// Returns a guard to hold for the lifetime of the application. Only one
/// subscriber can be installed per process; a second call fails with
/// [`TelemetryError::SubscriberInit`].
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    logging::init_logging(&config)?;

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        metrics_enabled = config.metrics_enabled,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard { config })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    config: TelemetryConfig,
}

impl TelemetryGuard {
    /// The configuration telemetry was started with.
    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    /// Prometheus text, or `None` when metrics are disabled.
    pub fn metrics_text(&self) -> Result<Option<String>, TelemetryError> {
        if !self.config.metrics_enabled {
            return Ok(None);
        }
        gather_metrics().map(Some)
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.config.service_name, "Shutting down telemetry");
    }
}
