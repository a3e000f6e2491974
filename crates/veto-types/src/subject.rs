//! # Subject Handle
//!
//! The object on whose behalf changes are reported.

use std::any::{self, Any};
use std::fmt;
use std::sync::Arc;

/// Shared, identity-compared handle on an event source.
///
/// The bus never mutates the subject; it only attaches it to events. Two
/// handles are equal only when they point at the same allocation.
#[derive(Clone)]
pub struct Subject {
    inner: Arc<dyn Any + Send + Sync>,
    label: Arc<str>,
}

impl Subject {
    /// Wrap an owned value. The label defaults to the value's type name.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wrap an already shared value without copying it.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            inner: value,
            label: Arc::from(any::type_name::<T>()),
        }
    }

    /// Replace the label used in logs and `Display`.
    #[must_use]
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Arc::from(label.into());
        self
    }

    /// Human-readable label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Borrow the underlying value if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// True when both handles refer to the same allocation.
    pub fn ptr_eq(&self, other: &Subject) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.inner), Arc::as_ptr(&other.inner))
    }
}

impl PartialEq for Subject {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Subject {}

impl fmt::Debug for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subject")
            .field("label", &self.label)
            .field("addr", &Arc::as_ptr(&self.inner).cast::<()>())
            .finish()
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}
