//! # Veto Bus - Hierarchical Vetoable Change Dispatch
//!
//! Lets components register interest in property changes on a subject, see a
//! change before it is final, and veto it.
//!
//! ## Registration Tree
//!
//! ```text
//! ListenerRegistry (subject S)
//! ├── global: [L1, L2, L3]        # fire for every property
//! └── children
//!     ├── "width"  -> ListenerRegistry { global: [W1] }
//!     └── "height" -> ListenerRegistry { global: [H1, H2] }
//! ```
//!
//! ## Fire Protocol
//!
//! 1. Equal old/new values: nothing is delivered.
//! 2. Snapshot the global listeners and the named child under the lock.
//! 3. Notify globals in registration order, outside the lock.
//! 4. On veto at position `k`, re-notify `0..k` with the reversed event
//!    (vetoes and panics ignored), then return the original veto.
//! 5. Otherwise forward the event to the named child, which repeats 2-5.
//!
//! ## Persistence
//!
//! A registry can be written to a sentinel-terminated `bincode` stream.
//! Listeners that are not persistable are skipped on write.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod config;
pub mod dispatch;
pub mod listener;
pub mod metrics;
pub mod persistence;
pub mod registry;

// Re-export main types
pub use config::PersistenceConfig;
pub use dispatch::{fire, ChangeCoordinator, ChangeState, DispatchError, Verdict};
pub use listener::{listener_fn, Listener, ListenerProxy, SharedListener, VetoableChangeListener};
pub use persistence::{
    read_registry, registry_from_bytes, registry_to_bytes, write_registry, ListenerFactory,
    ListenerRecord, PersistableListener, PersistenceError,
};
pub use registry::ListenerRegistry;
pub use veto_types::{ChangeEvent, PropertyValue, Subject, VetoSignal};

/// Persisted stream format version.
pub const FORMAT_VERSION: u32 = 2;

/// Magic number opening every persisted listener stream ("VETO").
pub const STREAM_MAGIC: u32 = 0x5645_544F;

/// Default cap on listener records read from one stream.
pub const DEFAULT_MAX_RECORDS: usize = 65_536;

/// Default byte budget for one persisted listener stream (16 MiB).
pub const DEFAULT_MAX_STREAM_BYTES: u64 = 16 * 1024 * 1024;
