//! # Listener Registry
//!
//! One node of the registration tree: the global listeners of a subject plus
//! one child registry per property name that has had a named registration.
//!
//! Every structural read or write takes the node's lock. The lock is never
//! held while listener code runs, so a listener may register or unregister
//! listeners from inside `vetoable_change`.

use crate::dispatch;
use crate::listener::{same_listener, Listener, SharedListener};
use crate::metrics;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;
use veto_types::{ChangeEvent, PropertyValue, Subject, VetoSignal};

/// Registration tree node for one subject.
pub struct ListenerRegistry {
    /// The subject attached to every event fired through this tree.
    source: Subject,
    state: Mutex<RegistryState>,
}

#[derive(Default)]
struct RegistryState {
    /// Listeners for every property, in registration order. Duplicates allowed.
    global: Vec<SharedListener>,
    /// Property name -> listeners for that property. Created lazily, never pruned.
    children: BTreeMap<String, Arc<ListenerRegistry>>,
}

/// What a fire needs from a node, captured under the lock.
pub(crate) struct Snapshot {
    pub(crate) listeners: Vec<SharedListener>,
    pub(crate) child: Option<Arc<ListenerRegistry>>,
}

impl ListenerRegistry {
    /// Create an empty registry for `source`.
    pub fn new(source: Subject) -> Self {
        Self {
            source,
            state: Mutex::new(RegistryState::default()),
        }
    }

    /// The subject this registry reports for.
    pub fn source(&self) -> &Subject {
        &self.source
    }

    /// Register a listener. A `Named` registration, or a shared handle on a
    /// [`ListenerProxy`](crate::ListenerProxy), is routed to the child registry
    /// for its property name.
    pub fn add_listener(&self, listener: impl Into<Listener>) {
        match listener.into() {
            Listener::Named(proxy) => self.add_named(proxy.property_name(), proxy.listener().clone()),
            Listener::Global(listener) => match listener.as_proxy() {
                Some(proxy) => self.add_named(proxy.property_name(), proxy.listener().clone()),
                None => self.push_global(listener),
            },
        }
    }

    fn push_global(&self, listener: SharedListener) {
        let count = {
            let mut state = self.state.lock();
            state.global.push(listener);
            state.global.len()
        };
        metrics::record_listener_registered();
        debug!(subject = %self.source, listeners = count, "Global listener registered");
    }

    /// Register `listener` for changes to `property_name` only.
    pub fn add_named(&self, property_name: &str, listener: SharedListener) {
        let child = {
            let mut state = self.state.lock();
            state
                .children
                .entry(property_name.to_string())
                .or_insert_with(|| Arc::new(ListenerRegistry::new(self.source.clone())))
                .clone()
        };
        debug!(subject = %self.source, property = property_name, "Named listener registered");
        child.push_global(listener);
    }

    /// Remove the first matching registration. Unknown listeners are ignored.
    pub fn remove_listener(&self, listener: impl Into<Listener>) {
        match listener.into() {
            Listener::Named(proxy) => self.remove_named(proxy.property_name(), proxy.listener()),
            Listener::Global(listener) => match listener.as_proxy() {
                Some(proxy) => self.remove_named(proxy.property_name(), proxy.listener()),
                None => self.remove_global(&listener),
            },
        }
    }

    fn remove_global(&self, listener: &SharedListener) {
        let removed = {
            let mut state = self.state.lock();
            let position = state.global.iter().position(|l| same_listener(l, listener));
            position.map(|index| state.global.remove(index)).is_some()
        };
        if removed {
            metrics::record_listener_removed();
        }
        debug!(subject = %self.source, removed, "Global listener removal");
    }

    /// Remove `listener` from the `property_name` scope. A property with no
    /// child registry is ignored; the child itself is kept even when emptied.
    pub fn remove_named(&self, property_name: &str, listener: &SharedListener) {
        let child = self.state.lock().children.get(property_name).cloned();
        if let Some(child) = child {
            child.remove_global(listener);
        }
    }

    /// Every registration: globals first, then each property's listeners
    /// wrapped as `Named`, properties in lexicographic order.
    pub fn list_listeners(&self) -> Vec<Listener> {
        let (global, children) = {
            let state = self.state.lock();
            let children: Vec<_> = state
                .children
                .iter()
                .map(|(name, child)| (name.clone(), child.clone()))
                .collect();
            (state.global.clone(), children)
        };

        let mut result: Vec<Listener> = global.into_iter().map(Listener::Global).collect();
        for (name, child) in children {
            result.extend(
                child
                    .global_listeners()
                    .into_iter()
                    .map(|listener| Listener::named(name.clone(), listener)),
            );
        }
        result
    }

    /// Listeners registered for `property_name` only (globals excluded).
    pub fn listeners_for(&self, property_name: &str) -> Vec<SharedListener> {
        let child = self.state.lock().children.get(property_name).cloned();
        child.map(|c| c.global_listeners()).unwrap_or_default()
    }

    /// True if any global listener exists, or `property_name` has listeners.
    pub fn has_listeners(&self, property_name: Option<&str>) -> bool {
        let state = self.state.lock();
        if !state.global.is_empty() {
            return true;
        }
        property_name
            .and_then(|name| state.children.get(name))
            .is_some_and(|child| !child.state.lock().global.is_empty())
    }

    /// Number of property scopes ever registered.
    pub fn child_count(&self) -> usize {
        self.state.lock().children.len()
    }

    /// True if `property_name` has a child registry (possibly empty).
    pub fn has_child(&self, property_name: &str) -> bool {
        self.state.lock().children.contains_key(property_name)
    }

    fn global_listeners(&self) -> Vec<SharedListener> {
        self.state.lock().global.clone()
    }

    /// Capture who to notify for an event on `property_name`.
    pub(crate) fn snapshot(&self, property_name: Option<&str>) -> Snapshot {
        let state = self.state.lock();
        Snapshot {
            listeners: state.global.clone(),
            child: property_name.and_then(|name| state.children.get(name).cloned()),
        }
    }

    /// Fire a prepared event.
    pub fn fire_event(&self, event: &ChangeEvent) -> Result<(), VetoSignal> {
        dispatch::fire(self, event)
    }

    /// Fire a change to `property_name` from `old_value` to `new_value`.
    pub fn fire_vetoable_change(
        &self,
        property_name: &str,
        old_value: impl Into<PropertyValue>,
        new_value: impl Into<PropertyValue>,
    ) -> Result<(), VetoSignal> {
        let event =
            ChangeEvent::for_property(self.source.clone(), property_name, old_value, new_value);
        dispatch::fire(self, &event)
    }

    /// Fire a change where the property name or either value may be absent.
    pub fn fire_optional_change(
        &self,
        property_name: Option<&str>,
        old_value: Option<PropertyValue>,
        new_value: Option<PropertyValue>,
    ) -> Result<(), VetoSignal> {
        let event = ChangeEvent::new(
            self.source.clone(),
            property_name.map(str::to_string),
            old_value,
            new_value,
        );
        dispatch::fire(self, &event)
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ListenerRegistry")
            .field("source", &self.source)
            .field("global", &state.global.len())
            .field("children", &state.children.keys().collect::<Vec<_>>())
            .finish()
    }
}
