//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to the startup log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full
    /// `EnvFilter` directive
    pub log_level: String,

    /// Whether to write logs to stdout at all
    pub console_output: bool,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,

    /// Whether hosts should expose [`gather_metrics`](crate::gather_metrics)
    pub metrics_enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "veto-bus".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            metrics_enabled: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `VB_SERVICE_NAME`: Service name (default: veto-bus)
    /// - `VB_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `VB_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `VB_JSON_LOGS`: Enable JSON logs (default: false)
    /// - `VB_METRICS_ENABLED`: Expose Prometheus metrics (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            service_name: lookup("VB_SERVICE_NAME").unwrap_or(defaults.service_name),

            log_level: lookup("VB_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            console_output: lookup("VB_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.console_output),

            json_logs: lookup("VB_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.json_logs),

            metrics_enabled: lookup("VB_METRICS_ENABLED")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.metrics_enabled),
        }
    }

    /// Development defaults at the given level.
    pub fn with_level(level: impl Into<String>) -> Self {
        Self {
            log_level: level.into(),
            ..Self::default()
        }
    }
}
