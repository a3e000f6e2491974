//! # Error Types
//!
//! Defines the veto signal shared by listeners, the dispatch engine and
//! callers that fire changes.

use crate::event::ChangeEvent;
use thiserror::Error;

/// Rejection of a proposed change, raised by a listener.
///
/// This is not a fault: it is the designed way for a listener to say "no".
/// It always carries the event that was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Change vetoed ({}): {}", .event.property_label(), .message)]
pub struct VetoSignal {
    event: ChangeEvent,
    message: String,
}

impl VetoSignal {
    /// Reject `event` with a reason.
    pub fn new(event: ChangeEvent, message: impl Into<String>) -> Self {
        Self {
            event,
            message: message.into(),
        }
    }

    /// Reject `event` without a specific reason.
    pub fn rejecting(event: &ChangeEvent) -> Self {
        Self::new(event.clone(), "rejected")
    }

    /// The event that was rejected.
    pub fn event(&self) -> &ChangeEvent {
        &self.event
    }

    /// Reason given by the vetoing listener.
    pub fn message(&self) -> &str {
        &self.message
    }
}
