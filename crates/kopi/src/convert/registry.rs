//! Converter registry - exact-target-type dispatch with default substitution.

use std::any::{Any, TypeId};
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use num_bigint::BigInt;
use rustc_hash::FxHashMap;

use crate::convert::{datetime, scalars};
use crate::decimal::Decimal;
use crate::error::{ConvertError, ConvertResult};
use crate::value::Value;

/// A boxed converter for one target type.
pub type ConvertFn<T> = Box<dyn Fn(&ConverterRegistry, &Value) -> Option<T> + Send + Sync>;

struct Registration {
    target: &'static str,
    run: Box<dyn Any + Send + Sync>,
}

/// Registry of converters indexed by exact target `TypeId`.
///
/// Lookup is exact: requesting a type with no registration of its own is a
/// miss even if a "wider" registration exists, because `TypeId` carries no
/// subtype relation. This mirrors how the registry is meant to be used:
/// one registration per concrete target.
///
/// Build the table up front (`with_defaults` plus custom `register` calls),
/// then share it immutably; lookups take `&self` and no lock.
pub struct ConverterRegistry {
    table: FxHashMap<TypeId, Registration>,
}

impl ConverterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            table: FxHashMap::default(),
        }
    }

    /// Create a registry populated with the stock converters: every numeric
    /// width, `bool`, `char`, `String`, `BigInt`, `Decimal`, and the
    /// date/time types.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        scalars::register_defaults(&mut registry);
        datetime::register_defaults(&mut registry);
        registry
    }

    /// Register a converter for target type `T` under a display name.
    ///
    /// At most one converter per exact target type; registering again
    /// replaces the previous one.
    pub fn register<T: 'static>(
        &mut self,
        target: &'static str,
        converter: impl Fn(&ConverterRegistry, &Value) -> Option<T> + Send + Sync + 'static,
    ) {
        let run: ConvertFn<T> = Box::new(converter);
        let previous = self.table.insert(
            TypeId::of::<T>(),
            Registration {
                target,
                run: Box::new(run),
            },
        );
        if let Some(previous) = previous {
            log::debug!("replaced converter for target type {}", previous.target);
        }
    }

    /// Check if a converter is registered for target type `T`.
    pub fn contains<T: 'static>(&self) -> bool {
        self.table.contains_key(&TypeId::of::<T>())
    }

    /// Get the number of registered converters.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Run dispatch without default substitution. `Ok(None)` covers both a
    /// null input and a soft converter failure.
    fn dispatch<T: Clone + 'static>(&self, value: &Value) -> ConvertResult<T> {
        if value.is_null() {
            return Ok(None);
        }
        // Identity short-circuit: a bean payload that already is a T needs
        // no converter. Maps never take this path; map-shaped targets go
        // through their converter so shape coercion always applies.
        if let Value::Bean(bean) = value {
            if let Some(existing) = bean.as_any().downcast_ref::<T>() {
                return Ok(Some(existing.clone()));
            }
        }
        let registration = self
            .table
            .get(&TypeId::of::<T>())
            .ok_or(ConvertError::NoConverter {
                target: std::any::type_name::<T>(),
            })?;
        let run = registration
            .run
            .downcast_ref::<ConvertFn<T>>()
            .expect("registration payload matches its TypeId key");
        Ok(run(self, value))
    }

    /// Strict conversion: coerce `value` to `T`, substituting `default`
    /// when the value is null or the converter declines.
    ///
    /// The only error is dispatch-level: no converter registered for `T`.
    pub fn try_convert<T: Clone + 'static>(
        &self,
        value: &Value,
        default: Option<T>,
    ) -> ConvertResult<T> {
        match self.dispatch(value)? {
            Some(converted) => Ok(Some(converted)),
            None => Ok(default),
        }
    }

    /// Quiet conversion: like [`ConverterRegistry::try_convert`], but a
    /// dispatch error also falls back to `default`.
    pub fn convert<T: Clone + 'static>(&self, value: &Value, default: Option<T>) -> Option<T> {
        match self.dispatch(value) {
            Ok(Some(converted)) => Some(converted),
            Ok(None) => default,
            Err(err) => {
                log::debug!("conversion fell back to default: {err}");
                default
            }
        }
    }

    // ========================================================================
    // Quiet single-target entry points
    // ========================================================================

    /// Coerce to `bool` quietly.
    pub fn to_bool(&self, value: &Value) -> Option<bool> {
        self.convert(value, None)
    }

    /// Coerce to `i8` quietly.
    pub fn to_i8(&self, value: &Value) -> Option<i8> {
        self.convert(value, None)
    }

    /// Coerce to `i16` quietly.
    pub fn to_i16(&self, value: &Value) -> Option<i16> {
        self.convert(value, None)
    }

    /// Coerce to `i32` quietly.
    pub fn to_i32(&self, value: &Value) -> Option<i32> {
        self.convert(value, None)
    }

    /// Coerce to `i64` quietly.
    pub fn to_i64(&self, value: &Value) -> Option<i64> {
        self.convert(value, None)
    }

    /// Coerce to `u8` quietly.
    pub fn to_u8(&self, value: &Value) -> Option<u8> {
        self.convert(value, None)
    }

    /// Coerce to `u16` quietly.
    pub fn to_u16(&self, value: &Value) -> Option<u16> {
        self.convert(value, None)
    }

    /// Coerce to `u32` quietly.
    pub fn to_u32(&self, value: &Value) -> Option<u32> {
        self.convert(value, None)
    }

    /// Coerce to `u64` quietly.
    pub fn to_u64(&self, value: &Value) -> Option<u64> {
        self.convert(value, None)
    }

    /// Coerce to `f32` quietly.
    pub fn to_f32(&self, value: &Value) -> Option<f32> {
        self.convert(value, None)
    }

    /// Coerce to `f64` quietly.
    pub fn to_f64(&self, value: &Value) -> Option<f64> {
        self.convert(value, None)
    }

    /// Coerce to `char` quietly.
    pub fn to_char(&self, value: &Value) -> Option<char> {
        self.convert(value, None)
    }

    /// Coerce to text quietly.
    pub fn to_text(&self, value: &Value) -> Option<String> {
        self.convert(value, None)
    }

    /// Coerce to [`BigInt`] quietly.
    pub fn to_bigint(&self, value: &Value) -> Option<BigInt> {
        self.convert(value, None)
    }

    /// Coerce to [`Decimal`] quietly.
    pub fn to_decimal(&self, value: &Value) -> Option<Decimal> {
        self.convert(value, None)
    }

    /// Coerce to a datetime quietly, trying the default pattern list for
    /// string input.
    pub fn to_datetime(&self, value: &Value) -> Option<NaiveDateTime> {
        self.convert(value, None)
    }

    /// Coerce to a datetime, parsing string input with one caller-supplied
    /// pattern instead of the default list.
    pub fn to_datetime_with(&self, value: &Value, pattern: &str) -> Option<NaiveDateTime> {
        datetime::value_to_datetime_with(value, pattern)
    }

    /// Coerce to a date quietly.
    pub fn to_date(&self, value: &Value) -> Option<NaiveDate> {
        self.convert(value, None)
    }

    /// Coerce to a time of day quietly.
    pub fn to_time(&self, value: &Value) -> Option<NaiveTime> {
        self.convert(value, None)
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("targets", &self.table.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;
    use std::sync::Arc;

    use super::*;
    use crate::bean::{Bean, PropertyDescriptor};

    #[test]
    fn test_register_and_contains() {
        let mut registry = ConverterRegistry::new();
        assert!(!registry.contains::<bool>());

        registry.register::<bool>("bool", scalars::value_to_bool);
        assert!(registry.contains::<bool>());
        assert!(!registry.contains::<i64>());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_missing_registration_is_strict_error() {
        let registry = ConverterRegistry::new();
        let result = registry.try_convert::<bool>(&Value::Int(1), None);
        assert!(matches!(result, Err(ConvertError::NoConverter { .. })));

        // The quiet form folds the same miss into the default.
        assert_eq!(registry.convert::<bool>(&Value::Int(1), Some(true)), Some(true));
    }

    #[test]
    fn test_null_yields_default() {
        let registry = ConverterRegistry::with_defaults();
        assert_eq!(
            registry.try_convert::<i64>(&Value::Null, Some(5)),
            Ok(Some(5))
        );
        assert_eq!(registry.try_convert::<i64>(&Value::Null, None), Ok(None));
        assert_eq!(registry.convert(&Value::Null, Some(5i64)), Some(5));
    }

    #[test]
    fn test_soft_failure_yields_default() {
        let registry = ConverterRegistry::with_defaults();
        let garbage = Value::Str("not-a-number".to_string());
        assert_eq!(registry.try_convert::<i64>(&garbage, Some(5)), Ok(Some(5)));
        assert_eq!(registry.convert::<i64>(&garbage, Some(5)), Some(5));
        assert_eq!(registry.to_i64(&garbage), None);
    }

    #[test]
    fn test_reregistration_replaces() {
        let mut registry = ConverterRegistry::with_defaults();
        registry.register::<bool>("bool", |_, _| Some(true));
        assert_eq!(registry.to_bool(&Value::Str("no way".into())), Some(true));
    }

    #[test]
    fn test_custom_target_type() {
        #[derive(Debug, Clone, PartialEq)]
        enum Roast {
            Light,
            Dark,
        }

        let mut registry = ConverterRegistry::new();
        registry.register::<Roast>("Roast", |_, value| match value.as_str()? {
            "light" => Some(Roast::Light),
            "dark" => Some(Roast::Dark),
            _ => None,
        });

        let light = Value::Str("light".to_string());
        assert_eq!(registry.convert::<Roast>(&light, None), Some(Roast::Light));
        let burnt = Value::Str("burnt".to_string());
        assert_eq!(
            registry.convert(&burnt, Some(Roast::Dark)),
            Some(Roast::Dark)
        );
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Marker {
        n: i32,
    }

    impl Bean for Marker {
        fn bean_name() -> &'static str {
            "Marker"
        }
        fn type_name(&self) -> &'static str {
            Self::bean_name()
        }
        fn properties() -> Vec<PropertyDescriptor> {
            Vec::new()
        }
        fn introspect(&self) -> Vec<PropertyDescriptor> {
            Self::properties()
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn test_identity_short_circuit_skips_converters() {
        // No converter for Marker is registered; the payload downcast must
        // hit before the table lookup.
        let registry = ConverterRegistry::new();
        let value = Value::Bean(Arc::new(Marker { n: 7 }));

        let result = registry.try_convert::<Marker>(&value, None).unwrap();
        assert_eq!(result, Some(Marker { n: 7 }));
    }

    #[test]
    fn test_identity_requires_exact_payload_type() {
        let registry = ConverterRegistry::new();
        let value = Value::Bean(Arc::new(Marker { n: 7 }));

        // A bean payload of the wrong type falls through to dispatch, and
        // with nothing registered that is a strict error.
        let result = registry.try_convert::<String>(&value, None);
        assert!(matches!(result, Err(ConvertError::NoConverter { .. })));
    }
}
