//! # Veto Descriptors
//!
//! Introspection records for components that fire vetoable changes.
//!
//! - [`BeanDescriptor`]: name and customizer of a bean type.
//! - [`EventSetDescriptor`]: the listener type of an event set and explicit
//!   bindings to the source's add, remove and get operations.
//! - [`BeanContextEvent`]: set-once record of the context an event came from.
//!
//! Accessors are bound as functions over a [`veto_bus::ListenerRegistry`]
//! rather than discovered by method-name conventions.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod bean;
pub mod context;
pub mod errors;
pub mod event_set;

pub use bean::{BeanDescriptor, TypeIdentity};
pub use context::{BeanContext, BeanContextEvent};
pub use errors::DescriptorError;
pub use event_set::{
    AddAccessor, EventSetDescriptor, EventSetDescriptorBuilder, GetAccessor, ListenerMethod,
    RemoveAccessor,
};
