//! # Change Events
//!
//! A proposed property mutation: subject, property name, old and new value.

use crate::subject::Subject;
use std::fmt;

/// Value carried by a change event.
///
/// JSON values give structural equality over arbitrary data. An absent value
/// is modelled as `None` on the event, distinct from `Value::Null`.
pub type PropertyValue = serde_json::Value;

/// Label used in logs when an event carries no property name.
pub const UNNAMED_PROPERTY: &str = "<unnamed>";

/// Immutable description of a tentative property change.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    subject: Subject,
    property_name: Option<String>,
    old_value: Option<PropertyValue>,
    new_value: Option<PropertyValue>,
}

impl ChangeEvent {
    /// Create an event. A `None` property name means "unspecified property".
    pub fn new(
        subject: Subject,
        property_name: Option<String>,
        old_value: Option<PropertyValue>,
        new_value: Option<PropertyValue>,
    ) -> Self {
        Self {
            subject,
            property_name,
            old_value,
            new_value,
        }
    }

    /// Create an event for a named property with both values present.
    pub fn for_property(
        subject: Subject,
        property_name: impl Into<String>,
        old_value: impl Into<PropertyValue>,
        new_value: impl Into<PropertyValue>,
    ) -> Self {
        Self::new(
            subject,
            Some(property_name.into()),
            Some(old_value.into()),
            Some(new_value.into()),
        )
    }

    /// The source of the change.
    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    /// The property being changed, if named.
    pub fn property_name(&self) -> Option<&str> {
        self.property_name.as_deref()
    }

    /// Property name or [`UNNAMED_PROPERTY`].
    pub fn property_label(&self) -> &str {
        self.property_name().unwrap_or(UNNAMED_PROPERTY)
    }

    /// The value before the change.
    pub fn old_value(&self) -> Option<&PropertyValue> {
        self.old_value.as_ref()
    }

    /// The proposed value.
    pub fn new_value(&self) -> Option<&PropertyValue> {
        self.new_value.as_ref()
    }

    /// True when both values are present and equal; such an event is never
    /// delivered.
    pub fn is_no_op(&self) -> bool {
        matches!((&self.old_value, &self.new_value), (Some(old), Some(new)) if old == new)
    }

    /// The compensating event: same subject and property, values swapped.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            subject: self.subject.clone(),
            property_name: self.property_name.clone(),
            old_value: self.new_value.clone(),
            new_value: self.old_value.clone(),
        }
    }
}

impl fmt::Display for ChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn show(value: Option<&PropertyValue>) -> String {
            value.map_or_else(|| "<absent>".to_string(), ToString::to_string)
        }
        write!(
            f,
            "{}.{}: {} -> {}",
            self.subject,
            self.property_label(),
            show(self.old_value()),
            show(self.new_value())
        )
    }
}
