//! Beans - structured values with registered property accessors.
//!
//! There is no runtime reflection here. A type opts in by implementing
//! [`Bean`], which hands out [`PropertyDescriptor`]s pairing each property
//! name with plain accessor functions; the [`bean!`](crate::bean!) macro
//! writes that implementation for ordinary field structs, and hand-written
//! impls can expose computed or read-only properties.
//!
//! [`BeanMetadataCache`] memoizes the per-type descriptor lists;
//! [`BeanCopier`] moves property values between beans and maps through
//! them.

mod copy;
mod macros;
mod metadata;

pub use copy::{BeanCopier, CopyPolicy, CopyReport, CopySource, CopyTarget, FieldSkip};
pub use metadata::{BeanMetadata, BeanMetadataCache, DEFAULT_METADATA_CAPACITY};

use std::any::{Any, TypeId};
use std::fmt;

use crate::convert::ConverterRegistry;
use crate::error::ConvertError;
use crate::value::Value;

/// Read accessor: produce a property's current value.
pub type Getter = fn(&dyn Bean) -> Value;

/// Write accessor: coerce a value through the registry and store it.
pub type Setter = fn(&mut dyn Bean, Value, &ConverterRegistry) -> Result<(), ConvertError>;

/// A structured value exposing named properties through registered
/// accessors.
///
/// `properties()` is the static registration point and `introspect()` its
/// object-safe twin; implementations forward the latter to the former
/// (`bean!` writes both). The `as_any` pair exists because accessors
/// downcast to the concrete type.
pub trait Bean: Any + Send + Sync {
    /// Type name for diagnostics, available without an instance.
    fn bean_name() -> &'static str
    where
        Self: Sized;

    /// Type name for diagnostics.
    fn type_name(&self) -> &'static str;

    /// Build the property descriptor list for this type.
    ///
    /// Called once per type per cache lifetime; the result is validated
    /// and memoized by [`BeanMetadataCache`].
    fn properties() -> Vec<PropertyDescriptor>
    where
        Self: Sized;

    /// Object-safe access to [`Bean::properties`].
    fn introspect(&self) -> Vec<PropertyDescriptor>;

    /// Concrete-type read access.
    fn as_any(&self) -> &dyn Any;

    /// Concrete-type write access.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// One named property: declared type plus its accessor pair.
#[derive(Clone)]
pub struct PropertyDescriptor {
    name: &'static str,
    type_name: &'static str,
    type_id: TypeId,
    getter: Getter,
    setter: Option<Setter>,
}

impl PropertyDescriptor {
    /// Describe a property. Pass `None` for the setter to make it
    /// read-only; the copy engine then skips it as a target.
    pub fn new(
        name: &'static str,
        type_name: &'static str,
        type_id: TypeId,
        getter: Getter,
        setter: Option<Setter>,
    ) -> Self {
        Self {
            name,
            type_name,
            type_id,
            getter,
            setter,
        }
    }

    /// Property name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared type name.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Declared type identity.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Check if the property has a write accessor.
    #[inline]
    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    /// Read the property's value off a bean.
    #[inline]
    pub fn read(&self, bean: &dyn Bean) -> Value {
        (self.getter)(bean)
    }

    /// The write accessor, if the property has one.
    #[inline]
    pub fn setter(&self) -> Option<Setter> {
        self.setter
    }
}

impl fmt::Debug for PropertyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("name", &self.name)
            .field("type", &self.type_name)
            .field("writable", &self.is_writable())
            .finish()
    }
}
