//! # Event Set Descriptors
//!
//! Describes a group of events a source fires to one listener type, and binds
//! the source's add/remove/get operations as plain functions over a
//! [`ListenerRegistry`].

use crate::bean::TypeIdentity;
use crate::errors::DescriptorError;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use veto_bus::{Listener, ListenerRegistry, VetoableChangeListener};

type AddFn = dyn Fn(&ListenerRegistry, Listener) -> Result<(), DescriptorError> + Send + Sync;
type RemoveFn = dyn Fn(&ListenerRegistry, Listener) + Send + Sync;
type GetFn = dyn Fn(&ListenerRegistry) -> Vec<Listener> + Send + Sync;

/// A method on the listener interface, named with the event type it takes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerMethod {
    pub name: String,
    pub event_type_name: String,
}

impl ListenerMethod {
    pub fn new(name: impl Into<String>, event_type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            event_type_name: event_type_name.into(),
        }
    }

    fn validate(&self) -> Result<(), DescriptorError> {
        let invalid = |reason: &str| DescriptorError::InvalidListenerMethod {
            method: self.name.clone(),
            reason: reason.to_string(),
        };
        if self.name.is_empty() {
            return Err(invalid("empty method name"));
        }
        if !self.event_type_name.ends_with("Event") {
            return Err(invalid("argument type name must end with \"Event\""));
        }
        Ok(())
    }
}

/// Binding for the source's "add listener" operation.
#[derive(Clone)]
pub struct AddAccessor {
    name: String,
    may_reject_too_many: bool,
    bind: Arc<AddFn>,
}

impl AddAccessor {
    /// Bind an add operation that never refuses a listener.
    pub fn new<F>(name: impl Into<String>, add: F) -> Self
    where
        F: Fn(&ListenerRegistry, Listener) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            may_reject_too_many: false,
            bind: Arc::new(move |registry: &ListenerRegistry, listener: Listener| {
                add(registry, listener);
                Ok(())
            }),
        }
    }

    /// Bind an add operation that may fail with
    /// [`DescriptorError::TooManyListeners`]. Event sets using it are unicast.
    pub fn fallible<F>(name: impl Into<String>, add: F) -> Self
    where
        F: Fn(&ListenerRegistry, Listener) -> Result<(), DescriptorError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            may_reject_too_many: true,
            bind: Arc::new(add),
        }
    }

    /// Add to the registry's global set, as `ListenerRegistry::add_listener`.
    pub fn multicast() -> Self {
        Self::new("add_listener", |registry, listener| registry.add_listener(listener))
    }

    /// Accept a listener only while the registry holds none.
    ///
    /// Check and insert are not atomic; concurrent adds may both succeed.
    pub fn unicast() -> Self {
        Self::fallible("add_listener", |registry, listener| {
            if !registry.list_listeners().is_empty() {
                // named by the descriptor that invoked the binding
                return Err(DescriptorError::TooManyListeners(String::new()));
            }
            registry.add_listener(listener);
            Ok(())
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if the bound operation can refuse a listener.
    pub fn may_reject_too_many(&self) -> bool {
        self.may_reject_too_many
    }
}

/// Binding for the source's "remove listener" operation.
#[derive(Clone)]
pub struct RemoveAccessor {
    name: String,
    bind: Arc<RemoveFn>,
}

impl RemoveAccessor {
    pub fn new<F>(name: impl Into<String>, remove: F) -> Self
    where
        F: Fn(&ListenerRegistry, Listener) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            bind: Arc::new(remove),
        }
    }

    /// `ListenerRegistry::remove_listener`.
    pub fn registry() -> Self {
        Self::new("remove_listener", |registry, listener| registry.remove_listener(listener))
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Binding for the source's "get listeners" operation.
#[derive(Clone)]
pub struct GetAccessor {
    name: String,
    bind: Arc<GetFn>,
}

impl GetAccessor {
    pub fn new<F>(name: impl Into<String>, get: F) -> Self
    where
        F: Fn(&ListenerRegistry) -> Vec<Listener> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            bind: Arc::new(get),
        }
    }

    /// `ListenerRegistry::list_listeners`.
    pub fn registry() -> Self {
        Self::new("list_listeners", ListenerRegistry::list_listeners)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A set of events delivered to one listener type.
#[derive(Clone)]
pub struct EventSetDescriptor {
    name: String,
    listener_type: TypeIdentity,
    listener_methods: Vec<ListenerMethod>,
    add: Option<AddAccessor>,
    remove: Option<RemoveAccessor>,
    get: Option<GetAccessor>,
    unicast: bool,
    in_default_event_set: bool,
}

impl EventSetDescriptor {
    /// Start describing the event set `name`, delivered to `listener_type`.
    pub fn builder(name: impl Into<String>, listener_type: TypeIdentity) -> EventSetDescriptorBuilder {
        EventSetDescriptorBuilder {
            name: name.into(),
            listener_type,
            listener_methods: Vec::new(),
            add: None,
            remove: None,
            get: None,
            require_accessors: false,
            unicast: None,
            in_default_event_set: true,
        }
    }

    /// The vetoable-change event set of a [`ListenerRegistry`].
    pub fn vetoable_change() -> Self {
        Self {
            name: "vetoable_change".to_string(),
            listener_type: TypeIdentity::of::<dyn VetoableChangeListener>(),
            listener_methods: vec![ListenerMethod::new("vetoable_change", "ChangeEvent")],
            add: Some(AddAccessor::multicast()),
            remove: Some(RemoveAccessor::registry()),
            get: Some(GetAccessor::registry()),
            unicast: false,
            in_default_event_set: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn listener_type(&self) -> TypeIdentity {
        self.listener_type
    }

    pub fn listener_methods(&self) -> &[ListenerMethod] {
        &self.listener_methods
    }

    pub fn add_accessor(&self) -> Option<&AddAccessor> {
        self.add.as_ref()
    }

    pub fn remove_accessor(&self) -> Option<&RemoveAccessor> {
        self.remove.as_ref()
    }

    pub fn get_accessor(&self) -> Option<&GetAccessor> {
        self.get.as_ref()
    }

    /// True if the source accepts at most one listener.
    pub fn is_unicast(&self) -> bool {
        self.unicast
    }

    pub fn set_unicast(&mut self, unicast: bool) {
        self.unicast = unicast;
    }

    pub fn is_in_default_event_set(&self) -> bool {
        self.in_default_event_set
    }

    pub fn set_in_default_event_set(&mut self, in_default_event_set: bool) {
        self.in_default_event_set = in_default_event_set;
    }

    /// Fill accessors and listener methods missing here from `other`. The
    /// result is in the default event set only if both are.
    #[must_use]
    pub fn merge(&self, other: &EventSetDescriptor) -> Self {
        let mut merged = self.clone();
        merged.add = merged.add.or_else(|| other.add.clone());
        merged.remove = merged.remove.or_else(|| other.remove.clone());
        merged.get = merged.get.or_else(|| other.get.clone());
        if merged.listener_methods.is_empty() {
            merged.listener_methods = other.listener_methods.clone();
        }
        merged.in_default_event_set &= other.in_default_event_set;
        merged
    }

    /// Register `listener` through the add binding.
    pub fn add_listener(&self, registry: &ListenerRegistry, listener: impl Into<Listener>) -> Result<(), DescriptorError> {
        let add = self.add.as_ref().ok_or_else(|| self.missing("add"))?;
        debug!(event_set = %self.name, accessor = %add.name, "Adding listener through descriptor");
        (add.bind)(registry, listener.into()).map_err(|err| match err {
            DescriptorError::TooManyListeners(_) => DescriptorError::TooManyListeners(self.name.clone()),
            other => other,
        })
    }

    /// Unregister `listener` through the remove binding.
    pub fn remove_listener(&self, registry: &ListenerRegistry, listener: impl Into<Listener>) -> Result<(), DescriptorError> {
        let remove = self.remove.as_ref().ok_or_else(|| self.missing("remove"))?;
        (remove.bind)(registry, listener.into());
        Ok(())
    }

    /// Enumerate listeners through the get binding.
    pub fn get_listeners(&self, registry: &ListenerRegistry) -> Result<Vec<Listener>, DescriptorError> {
        let get = self.get.as_ref().ok_or_else(|| self.missing("get"))?;
        Ok((get.bind)(registry))
    }

    fn missing(&self, accessor: &'static str) -> DescriptorError {
        DescriptorError::MissingAccessor {
            event_set: self.name.clone(),
            accessor,
        }
    }
}

impl fmt::Debug for EventSetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSetDescriptor")
            .field("name", &self.name)
            .field("listener_type", &self.listener_type)
            .field("listener_methods", &self.listener_methods)
            .field("add", &self.add.as_ref().map(AddAccessor::name))
            .field("remove", &self.remove.as_ref().map(RemoveAccessor::name))
            .field("get", &self.get.as_ref().map(GetAccessor::name))
            .field("unicast", &self.unicast)
            .field("in_default_event_set", &self.in_default_event_set)
            .finish()
    }
}

/// Collects the parts of an [`EventSetDescriptor`]; validated by `build`.
pub struct EventSetDescriptorBuilder {
    name: String,
    listener_type: TypeIdentity,
    listener_methods: Vec<ListenerMethod>,
    add: Option<AddAccessor>,
    remove: Option<RemoveAccessor>,
    get: Option<GetAccessor>,
    require_accessors: bool,
    unicast: Option<bool>,
    in_default_event_set: bool,
}

impl EventSetDescriptorBuilder {
    #[must_use]
    pub fn listener_method(mut self, method: ListenerMethod) -> Self {
        self.listener_methods.push(method);
        self
    }

    #[must_use]
    pub fn add_accessor(mut self, add: AddAccessor) -> Self {
        self.add = Some(add);
        self
    }

    #[must_use]
    pub fn remove_accessor(mut self, remove: RemoveAccessor) -> Self {
        self.remove = Some(remove);
        self
    }

    #[must_use]
    pub fn get_accessor(mut self, get: GetAccessor) -> Self {
        self.get = Some(get);
        self
    }

    /// Fail `build` unless both add and remove are bound.
    #[must_use]
    pub fn require_accessors(mut self) -> Self {
        self.require_accessors = true;
        self
    }

    /// Override the unicast flag derived from the add accessor.
    #[must_use]
    pub fn unicast(mut self, unicast: bool) -> Self {
        self.unicast = Some(unicast);
        self
    }

    #[must_use]
    pub fn in_default_event_set(mut self, in_default_event_set: bool) -> Self {
        self.in_default_event_set = in_default_event_set;
        self
    }

    pub fn build(self) -> Result<EventSetDescriptor, DescriptorError> {
        if self.name.is_empty() {
            return Err(DescriptorError::EmptyName("event set"));
        }
        if self.listener_methods.is_empty() {
            return Err(DescriptorError::InvalidListenerMethod {
                method: String::new(),
                reason: "at least one listener method is required".to_string(),
            });
        }
        for method in &self.listener_methods {
            method.validate()?;
        }
        if self.require_accessors {
            for (bound, accessor) in [(self.add.is_some(), "add"), (self.remove.is_some(), "remove")] {
                if !bound {
                    return Err(DescriptorError::MissingAccessor {
                        event_set: self.name.clone(),
                        accessor,
                    });
                }
            }
        }

        let unicast = self
            .unicast
            .unwrap_or_else(|| self.add.as_ref().is_some_and(AddAccessor::may_reject_too_many));
        Ok(EventSetDescriptor {
            name: self.name,
            listener_type: self.listener_type,
            listener_methods: self.listener_methods,
            add: self.add,
            remove: self.remove,
            get: self.get,
            unicast,
            in_default_event_set: self.in_default_event_set,
        })
    }
}
