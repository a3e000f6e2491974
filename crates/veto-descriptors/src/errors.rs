//! # Descriptor Errors

use thiserror::Error;

/// Descriptor construction and binding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// A required accessor binding is missing.
    #[error("Event set '{event_set}' has no {accessor} accessor")]
    MissingAccessor {
        /// Event set name
        event_set: String,
        /// "add", "remove" or "get"
        accessor: &'static str,
    },

    /// A listener method does not look like one.
    #[error("Invalid listener method '{method}': {reason}")]
    InvalidListenerMethod {
        /// Method name, empty when none was given
        method: String,
        /// What is wrong with it
        reason: String,
    },

    /// A unicast event source already has a listener.
    #[error("Event set '{0}' is unicast and already has a listener")]
    TooManyListeners(String),

    /// The event was already marked as propagated.
    #[error("Event already propagated from context {0}")]
    AlreadyPropagated(String),

    /// A descriptor was given an empty name.
    #[error("Empty {0} name")]
    EmptyName(&'static str),
}
