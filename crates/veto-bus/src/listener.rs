//! # Listeners
//!
//! The listener capability, the name-scoped proxy and the `Listener` value
//! used to register and enumerate both shapes.

use crate::persistence::PersistableListener;
use std::fmt;
use std::sync::Arc;
use veto_types::{ChangeEvent, VetoSignal};

/// A party interested in proposed changes.
///
/// Returning `Err(VetoSignal)` rejects the change. The listener is also called
/// with the reversed event when a later listener vetoes a change it accepted.
pub trait VetoableChangeListener: Send + Sync {
    /// Inspect a proposed change; reject it with a `VetoSignal`.
    fn vetoable_change(&self, event: &ChangeEvent) -> Result<(), VetoSignal>;

    /// Persistence capability. Listeners returning `None` are skipped when a
    /// registry is written out.
    fn as_persistable(&self) -> Option<&dyn PersistableListener> {
        None
    }

    /// Name-scoping capability. A listener returning `Some` is registered and
    /// removed under the proxy's property name, never globally.
    fn as_proxy(&self) -> Option<&ListenerProxy> {
        None
    }
}

/// Shared handle on a listener. Identity is the allocation, not the value.
pub type SharedListener = Arc<dyn VetoableChangeListener>;

/// True when both handles point at the same listener.
pub fn same_listener(a: &SharedListener, b: &SharedListener) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Closure adapter. Closures are never persistable.
struct FnListener<F>(F);

impl<F> VetoableChangeListener for FnListener<F>
where
    F: Fn(&ChangeEvent) -> Result<(), VetoSignal> + Send + Sync,
{
    fn vetoable_change(&self, event: &ChangeEvent) -> Result<(), VetoSignal> {
        (self.0)(event)
    }
}

/// Wrap a closure as a shared listener.
pub fn listener_fn<F>(f: F) -> SharedListener
where
    F: Fn(&ChangeEvent) -> Result<(), VetoSignal> + Send + Sync + 'static,
{
    Arc::new(FnListener(f))
}

/// A listener scoped to a single property name.
///
/// Registering a proxy is the same as registering its inner listener under
/// the property name. Proxies are rebuilt on enumeration, never stored.
#[derive(Clone)]
pub struct ListenerProxy {
    property_name: String,
    inner: SharedListener,
}

impl ListenerProxy {
    /// Pair `inner` with `property_name`.
    pub fn new(property_name: impl Into<String>, inner: SharedListener) -> Self {
        Self {
            property_name: property_name.into(),
            inner,
        }
    }

    /// The property this proxy is scoped to.
    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    /// The wrapped listener.
    pub fn listener(&self) -> &SharedListener {
        &self.inner
    }
}

impl VetoableChangeListener for ListenerProxy {
    fn vetoable_change(&self, event: &ChangeEvent) -> Result<(), VetoSignal> {
        self.inner.vetoable_change(event)
    }

    fn as_proxy(&self) -> Option<&ListenerProxy> {
        Some(self)
    }
}

impl PartialEq for ListenerProxy {
    fn eq(&self, other: &Self) -> bool {
        self.property_name == other.property_name && same_listener(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ListenerProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerProxy")
            .field("property_name", &self.property_name)
            .field("inner", &Arc::as_ptr(&self.inner).cast::<()>())
            .finish()
    }
}

/// A registration: either global or scoped to a property name.
#[derive(Clone)]
pub enum Listener {
    /// Fires for every change reaching the registry.
    Global(SharedListener),
    /// Fires only for changes to one property.
    Named(ListenerProxy),
}

impl Listener {
    /// Global registration of an owned listener.
    pub fn global(listener: impl VetoableChangeListener + 'static) -> Self {
        Self::Global(Arc::new(listener))
    }

    /// Name-scoped registration.
    pub fn named(property_name: impl Into<String>, listener: SharedListener) -> Self {
        Self::Named(ListenerProxy::new(property_name, listener))
    }

    /// Property scope, `None` for global registrations.
    pub fn property_name(&self) -> Option<&str> {
        match self {
            Self::Global(_) => None,
            Self::Named(proxy) => Some(proxy.property_name()),
        }
    }

    /// The listener that will actually be invoked.
    pub fn inner(&self) -> &SharedListener {
        match self {
            Self::Global(listener) => listener,
            Self::Named(proxy) => proxy.listener(),
        }
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Global(a), Self::Global(b)) => same_listener(a, b),
            (Self::Named(a), Self::Named(b)) => a == b,
            _ => false,
        }
    }
}

impl From<SharedListener> for Listener {
    fn from(listener: SharedListener) -> Self {
        Self::Global(listener)
    }
}

impl From<ListenerProxy> for Listener {
    fn from(proxy: ListenerProxy) -> Self {
        Self::Named(proxy)
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global(listener) => f
                .debug_tuple("Global")
                .field(&Arc::as_ptr(listener).cast::<()>())
                .finish(),
            Self::Named(proxy) => f.debug_tuple("Named").field(proxy).finish(),
        }
    }
}
