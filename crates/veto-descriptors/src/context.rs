//! # Bean Context Events
//!
//! Marks an event as having been forwarded from another context. Dispatch
//! never looks at this annotation.

use crate::errors::DescriptorError;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tracing::debug;
use uuid::Uuid;

/// A container of beans.
#[derive(Debug, PartialEq, Eq)]
pub struct BeanContext {
    id: Uuid,
    name: String,
}

impl BeanContext {
    /// Create a context with a fresh id.
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            name: name.into(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// An event raised within a bean context.
#[derive(Debug)]
pub struct BeanContextEvent {
    context: Arc<BeanContext>,
    /// Set once; weak so a forwarded event does not keep its origin alive.
    propagated_from: Mutex<Option<(Uuid, Weak<BeanContext>)>>,
}

impl BeanContextEvent {
    pub fn new(context: Arc<BeanContext>) -> Self {
        Self {
            context,
            propagated_from: Mutex::new(None),
        }
    }

    /// The context the event belongs to.
    pub fn bean_context(&self) -> &Arc<BeanContext> {
        &self.context
    }

    /// Record the context this event was forwarded from. Only the first call
    /// succeeds.
    pub fn set_propagated_from(&self, origin: &Arc<BeanContext>) -> Result<(), DescriptorError> {
        let mut slot = self.propagated_from.lock();
        if let Some((stored, _)) = slot.as_ref() {
            return Err(DescriptorError::AlreadyPropagated(stored.to_string()));
        }
        *slot = Some((origin.id, Arc::downgrade(origin)));
        debug!(context = %self.context.name, origin = %origin.name, "Event propagated");
        Ok(())
    }

    /// The origin context, if set and still alive.
    pub fn propagated_from(&self) -> Option<Arc<BeanContext>> {
        self.propagated_from
            .lock()
            .as_ref()
            .and_then(|(_, origin)| origin.upgrade())
    }

    /// True once [`set_propagated_from`](Self::set_propagated_from) succeeded.
    pub fn is_propagated(&self) -> bool {
        self.propagated_from.lock().is_some()
    }
}
