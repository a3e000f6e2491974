//! # Bean Descriptors
//!
//! Type identity and the top-level description of a bean type.

use std::any::{self, TypeId};
use std::fmt;

/// Runtime identity of a type, with its printable name.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeIdentity {
    type_id: TypeId,
    type_name: &'static str,
}

impl TypeIdentity {
    /// Identity of `T`. Trait objects are accepted.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: any::type_name::<T>(),
        }
    }

    /// The `TypeId`.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fully qualified name, as reported by the compiler.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Unqualified name: module path and generic arguments dropped.
    ///
    /// `alloc::vec::Vec<u8>` becomes `Vec`; `dyn a::b::Listener` becomes `Listener`.
    pub fn short_name(&self) -> &'static str {
        let name = self.type_name.trim_start_matches("dyn ");
        let name = name.split('<').next().unwrap_or(name);
        name.rsplit("::").next().unwrap_or(name)
    }
}

impl fmt::Debug for TypeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name)
    }
}

/// Global information about a bean type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeanDescriptor {
    bean_type: TypeIdentity,
    customizer_type: Option<TypeIdentity>,
    name: String,
    display_name: Option<String>,
    short_description: Option<String>,
}

impl BeanDescriptor {
    /// Describe `bean_type`. The name defaults to its short type name.
    pub fn new(bean_type: TypeIdentity) -> Self {
        Self {
            bean_type,
            customizer_type: None,
            name: bean_type.short_name().to_string(),
            display_name: None,
            short_description: None,
        }
    }

    /// Describe `bean_type` edited through `customizer_type`.
    pub fn with_customizer(bean_type: TypeIdentity, customizer_type: TypeIdentity) -> Self {
        Self {
            customizer_type: Some(customizer_type),
            ..Self::new(bean_type)
        }
    }

    pub fn bean_type(&self) -> TypeIdentity {
        self.bean_type
    }

    pub fn customizer_type(&self) -> Option<TypeIdentity> {
        self.customizer_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the bean.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Localized name, defaulting to [`name`](Self::name).
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    pub fn set_display_name(&mut self, display_name: impl Into<String>) {
        self.display_name = Some(display_name.into());
    }

    /// One-line description, defaulting to the display name.
    pub fn short_description(&self) -> &str {
        self.short_description
            .as_deref()
            .unwrap_or_else(|| self.display_name())
    }

    pub fn set_short_description(&mut self, description: impl Into<String>) {
        self.short_description = Some(description.into());
    }
}
