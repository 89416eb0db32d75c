//! Error types for conversion dispatch and bean introspection.
//!
//! Two enums for two concerns: [`ConvertError`] for the strict conversion
//! path, [`BeanError`] for metadata construction. Soft conversion failures
//! are not errors at all: a converter that cannot coerce returns `None`
//! and the registry substitutes the caller's default.

/// Result type for strict conversions.
///
/// `Ok(None)` means the value could not be coerced and no default was
/// supplied; it is not a failure.
pub type ConvertResult<T> = Result<Option<T>, ConvertError>;

/// Errors raised by the strict conversion path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    /// No converter is registered for the requested target type.
    #[error("no converter registered for target type {target}")]
    NoConverter {
        /// Requested target type name.
        target: &'static str,
    },

    /// A non-null value could not be coerced and no default applies.
    #[error("cannot convert {value_type} value to {target}")]
    Unconvertible {
        /// Type name of the offending value.
        value_type: &'static str,
        /// Declared target type name.
        target: &'static str,
    },

    /// A property accessor was applied to the wrong concrete type.
    #[error("accessor applied to a value that is not a {expected}")]
    BeanTypeMismatch {
        /// Type the accessor was generated for.
        expected: &'static str,
    },
}

/// Errors raised while building bean metadata.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BeanError {
    /// A type's property registration is malformed.
    ///
    /// Never cached: the next metadata request recomputes and fails again
    /// until the registration is fixed.
    #[error("cannot introspect {type_name}: {reason}")]
    Introspection {
        /// Offending bean type.
        type_name: &'static str,
        /// Human-readable cause (duplicate name, empty name, ...).
        reason: String,
    },
}
