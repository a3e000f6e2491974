//! # Veto Types Crate
//!
//! This crate contains the value types that flow through the vetoable change
//! bus: the subject handle, the change event and the veto signal.
//!
//! ## Design Principles
//!
//! - **Immutable Events**: A `ChangeEvent` never changes after construction;
//!   compensation builds a fresh, reversed event instead of mutating.
//! - **Identity Subjects**: A `Subject` compares by pointer identity, never by
//!   value, so two equal-looking beans are still different sources.
//! - **Veto Is Data**: A rejection is a `Result::Err(VetoSignal)`, not a panic.

pub mod errors;
pub mod event;
pub mod subject;

pub use errors::*;
pub use event::{ChangeEvent, PropertyValue};
pub use subject::Subject;
