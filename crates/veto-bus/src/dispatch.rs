//! # Vetoable Dispatch
//!
//! Propose a change to a registry's listeners; confirm it or compensate.
//!
//! ```text
//! Proposed ──all accept──▶ Accepted ──▶ forward to named child
//!    │
//!    └──veto at k──▶ Vetoed ──re-notify 0..k with reversed event──▶ Compensated
//! ```
//!
//! Compensation happens once, at the level where the veto was raised. A veto
//! from the named child propagates through the parent untouched.

use crate::listener::SharedListener;
use crate::metrics;
use crate::registry::ListenerRegistry;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;
use tracing::{debug, info, warn};
use veto_types::{ChangeEvent, VetoSignal};

/// Coordinator misuse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Operation not allowed in the current state.
    #[error("Invalid state transition: {from:?} -> {to}")]
    InvalidTransition {
        /// Current state
        from: ChangeState,
        /// Attempted state
        to: &'static str,
    },
}

/// Phase of a single proposed change against one listener set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeState {
    /// Built, no listener invoked yet.
    Proposed,
    /// Every listener accepted.
    Accepted,
    /// A listener vetoed; accepted prefix not yet told.
    Vetoed,
    /// Accepted prefix re-notified with the reversed event.
    Compensated,
}

impl ChangeState {
    /// No further transitions possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Accepted | Self::Compensated)
    }
}

/// Result of proposing a change.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Verdict {
    /// All listeners accepted.
    Accepted,
    /// A listener rejected the change.
    Rejected(VetoSignal),
}

impl Verdict {
    /// `Ok(())` for accepted, `Err(veto)` for rejected.
    pub fn into_result(self) -> Result<(), VetoSignal> {
        match self {
            Self::Accepted => Ok(()),
            Self::Rejected(veto) => Err(veto),
        }
    }
}

/// Drives one event through one snapshotted listener list.
pub struct ChangeCoordinator<'a> {
    event: &'a ChangeEvent,
    listeners: Vec<SharedListener>,
    /// Listeners that returned `Ok` before the veto (or all of them).
    accepted: usize,
    state: ChangeState,
}

impl<'a> ChangeCoordinator<'a> {
    /// Create a coordinator over an already snapshotted listener list.
    pub fn new(event: &'a ChangeEvent, listeners: Vec<SharedListener>) -> Self {
        Self {
            event,
            listeners,
            accepted: 0,
            state: ChangeState::Proposed,
        }
    }

    /// Current state.
    pub fn state(&self) -> ChangeState {
        self.state
    }

    /// How many listeners accepted the proposal.
    pub fn accepted_count(&self) -> usize {
        self.accepted
    }

    /// The event being proposed.
    pub fn event(&self) -> &ChangeEvent {
        self.event
    }

    /// Notify listeners in order until one vetoes.
    pub fn propose(&mut self) -> Result<Verdict, DispatchError> {
        self.require_state(ChangeState::Proposed, "Accepted|Vetoed")?;
        Ok(self.broadcast())
    }

    /// Tell the accepted prefix the change is being rolled back. Returns the
    /// number of listeners re-notified.
    pub fn compensate(&mut self) -> Result<usize, DispatchError> {
        self.require_state(ChangeState::Vetoed, "Compensated")?;
        Ok(self.unwind())
    }

    /// Propose and, on veto, compensate.
    pub fn run(mut self) -> Verdict {
        let verdict = self.broadcast();
        if matches!(verdict, Verdict::Rejected(_)) {
            self.unwind();
        }
        verdict
    }

    fn require_state(&self, state: ChangeState, to: &'static str) -> Result<(), DispatchError> {
        if self.state != state {
            return Err(DispatchError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        Ok(())
    }

    fn broadcast(&mut self) -> Verdict {
        for (position, listener) in self.listeners.iter().enumerate() {
            if let Err(veto) = listener.vetoable_change(self.event) {
                self.state = ChangeState::Vetoed;
                metrics::record_change_vetoed();
                metrics::record_listeners_notified(position + 1);
                info!(
                    subject = %self.event.subject(),
                    property = self.event.property_label(),
                    position,
                    reason = veto.message(),
                    "Change vetoed"
                );
                return Verdict::Rejected(veto);
            }
            self.accepted += 1;
        }
        self.state = ChangeState::Accepted;
        metrics::record_listeners_notified(self.accepted);
        Verdict::Accepted
    }

    fn unwind(&mut self) -> usize {
        let revert = self.event.reversed();
        for (position, listener) in self.listeners[..self.accepted].iter().enumerate() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| listener.vetoable_change(&revert)));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(veto)) => {
                    debug!(
                        property = revert.property_label(),
                        position,
                        reason = veto.message(),
                        "Veto during compensation ignored"
                    );
                }
                Err(_) => {
                    metrics::record_compensation_failure();
                    warn!(
                        property = revert.property_label(),
                        position,
                        "Compensating listener panicked; continuing"
                    );
                }
            }
        }
        self.state = ChangeState::Compensated;
        metrics::record_compensation();
        debug!(
            property = revert.property_label(),
            listeners = self.accepted,
            "Compensation complete"
        );
        self.accepted
    }
}

/// Fire `event` through `registry` and, if accepted, its named child.
///
/// Equal old/new values short-circuit: nobody is called. A veto is returned
/// after the listeners that had accepted were told about the reversal.
pub fn fire(registry: &ListenerRegistry, event: &ChangeEvent) -> Result<(), VetoSignal> {
    if event.is_no_op() {
        debug!(property = event.property_label(), "Equal values; change not fired");
        return Ok(());
    }

    let snapshot = registry.snapshot(event.property_name());
    metrics::record_change_fired();
    debug!(
        subject = %event.subject(),
        property = event.property_label(),
        listeners = snapshot.listeners.len(),
        named_scope = snapshot.child.is_some(),
        "Firing vetoable change"
    );

    ChangeCoordinator::new(event, snapshot.listeners)
        .run()
        .into_result()?;

    match snapshot.child {
        Some(child) => fire(&child, event),
        None => Ok(()),
    }
}
