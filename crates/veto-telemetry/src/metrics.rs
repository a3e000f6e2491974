//! Prometheus text export.
//!
//! Dispatch counters register themselves in the default Prometheus registry
//! when `veto-bus` is built with its `metrics` feature; this module renders
//! whatever that registry holds.

use crate::TelemetryError;
use prometheus::{Encoder, TextEncoder};

/// Encode the default registry in the Prometheus text format.
pub fn gather_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
}
