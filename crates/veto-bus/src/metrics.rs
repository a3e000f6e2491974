//! # Dispatch Metrics
//!
//! Prometheus counters for fires, vetoes and compensations.
//!
//! Enable with the `metrics` feature:
//! ```toml
//! veto-bus = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `vetobus_changes_fired_total` - Events that reached at least one registry level
//! - `vetobus_changes_vetoed_total` - Vetoes raised, at any level
//! - `vetobus_compensations_total` - Compensation passes run
//! - `vetobus_compensation_failures_total` - Compensating listeners that panicked
//! - `vetobus_listeners_notified_total` - Listener invocations in the proposal phase
//! - `vetobus_listeners_registered` - Registrations currently held, across all registries

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_gauge, IntCounter, IntGauge};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Events fired through a registry level
    pub static ref CHANGES_FIRED: IntCounter = register_int_counter!(
        "vetobus_changes_fired_total",
        "Total number of vetoable changes fired"
    )
    .expect("Failed to create CHANGES_FIRED metric");

    /// Vetoes raised by listeners
    pub static ref CHANGES_VETOED: IntCounter = register_int_counter!(
        "vetobus_changes_vetoed_total",
        "Total number of vetoable changes rejected by a listener"
    )
    .expect("Failed to create CHANGES_VETOED metric");

    /// Compensation passes
    pub static ref COMPENSATIONS: IntCounter = register_int_counter!(
        "vetobus_compensations_total",
        "Total number of compensation passes run after a veto"
    )
    .expect("Failed to create COMPENSATIONS metric");

    /// Compensating listeners that panicked
    pub static ref COMPENSATION_FAILURES: IntCounter = register_int_counter!(
        "vetobus_compensation_failures_total",
        "Total number of compensating listeners that failed"
    )
    .expect("Failed to create COMPENSATION_FAILURES metric");

    /// Listener invocations during proposal
    pub static ref LISTENERS_NOTIFIED: IntCounter = register_int_counter!(
        "vetobus_listeners_notified_total",
        "Total number of listener invocations while proposing changes"
    )
    .expect("Failed to create LISTENERS_NOTIFIED metric");

    /// Live registrations
    pub static ref LISTENERS_REGISTERED: IntGauge = register_int_gauge!(
        "vetobus_listeners_registered",
        "Number of listener registrations currently held"
    )
    .expect("Failed to create LISTENERS_REGISTERED metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record an event fired at one registry level
#[cfg(feature = "metrics")]
pub fn record_change_fired() {
    CHANGES_FIRED.inc();
}

/// Record a veto
#[cfg(feature = "metrics")]
pub fn record_change_vetoed() {
    CHANGES_VETOED.inc();
}

/// Record a completed compensation pass
#[cfg(feature = "metrics")]
pub fn record_compensation() {
    COMPENSATIONS.inc();
}

/// Record a compensating listener that panicked
#[cfg(feature = "metrics")]
pub fn record_compensation_failure() {
    COMPENSATION_FAILURES.inc();
}

/// Record listener invocations
#[cfg(feature = "metrics")]
pub fn record_listeners_notified(count: usize) {
    LISTENERS_NOTIFIED.inc_by(count as u64);
}

/// Record a registration
#[cfg(feature = "metrics")]
pub fn record_listener_registered() {
    LISTENERS_REGISTERED.inc();
}

/// Record a removal
#[cfg(feature = "metrics")]
pub fn record_listener_removed() {
    LISTENERS_REGISTERED.dec();
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_change_fired() {}

#[cfg(not(feature = "metrics"))]
pub fn record_change_vetoed() {}

#[cfg(not(feature = "metrics"))]
pub fn record_compensation() {}

#[cfg(not(feature = "metrics"))]
pub fn record_compensation_failure() {}

#[cfg(not(feature = "metrics"))]
pub fn record_listeners_notified(_count: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_listener_registered() {}

#[cfg(not(feature = "metrics"))]
pub fn record_listener_removed() {}
