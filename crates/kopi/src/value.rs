//! Value - loosely-typed runtime value shared by accessors and converters.
//!
//! Every property read produces a `Value`; every converter consumes one.
//! The enum is wide on purpose: it must carry anything a bean field can
//! hold, so the copy engine and the converter registry speak one currency
//! instead of a web of pairwise conversions.
//!
//! `Value` is cheap to clone: scalars copy, strings and lists clone their
//! buffers, beans bump an `Arc`.

use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use num_bigint::BigInt;

use crate::bean::Bean;
use crate::decimal::Decimal;

/// Insertion-ordered string-keyed map of values.
///
/// Map copies preserve key order, so `ValueMap` is an ordered map rather
/// than a hash map.
pub type ValueMap = IndexMap<String, Value>;

/// Pattern a datetime renders to, and the first pattern tried when one is
/// parsed back from text.
pub const DATETIME_PATTERN: &str = "%Y-%m-%d %H:%M:%S";

/// Loosely-typed runtime value.
#[derive(Clone)]
pub enum Value {
    /// Absent value. Distinct from an empty string or zero.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer, up to 64 bits.
    Int(i64),
    /// Unsigned integer, up to 64 bits.
    UInt(u64),
    /// IEEE 754 double.
    Float(f64),
    /// Single Unicode scalar.
    Char(char),
    /// Owned UTF-8 text.
    Str(String),
    /// Arbitrary-precision integer.
    BigInt(BigInt),
    /// Fixed-point decimal.
    Decimal(Decimal),
    /// Calendar timestamp without a timezone.
    DateTime(NaiveDateTime),
    /// Ordered sequence of values.
    List(Vec<Value>),
    /// Insertion-ordered string-keyed map.
    Map(ValueMap),
    /// A structured value exposing named properties.
    Bean(Arc<dyn Bean>),
}

impl Value {
    // ========================================================================
    // Type checks
    // ========================================================================

    /// Check if the value is null.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the value's type name for diagnostics.
    ///
    /// Beans report their own concrete type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::Char(_) => "char",
            Value::Str(_) => "string",
            Value::BigInt(_) => "bigint",
            Value::Decimal(_) => "decimal",
            Value::DateTime(_) => "datetime",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Bean(b) => b.type_name(),
        }
    }

    // ========================================================================
    // Extractors
    // ========================================================================

    /// Extract a boolean.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract a signed integer.
    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Extract an unsigned integer.
    #[inline]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt(u) => Some(*u),
            _ => None,
        }
    }

    /// Extract a float.
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Extract a char.
    #[inline]
    pub fn as_char(&self) -> Option<char> {
        match self {
            Value::Char(c) => Some(*c),
            _ => None,
        }
    }

    /// Extract a string slice.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Extract a big integer.
    #[inline]
    pub fn as_bigint(&self) -> Option<&BigInt> {
        match self {
            Value::BigInt(b) => Some(b),
            _ => None,
        }
    }

    /// Extract a decimal.
    #[inline]
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    /// Extract a datetime.
    #[inline]
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Extract a list slice.
    #[inline]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Extract a map reference.
    #[inline]
    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Extract a bean reference.
    #[inline]
    pub fn as_bean(&self) -> Option<&dyn Bean> {
        match self {
            Value::Bean(b) => Some(b.as_ref()),
            _ => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            // Beans compare by identity; structural comparison goes through
            // a map copy.
            (Value::Bean(a), Value::Bean(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::UInt(u) => write!(f, "{u}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Char(c) => write!(f, "{c}"),
            Value::Str(s) => f.write_str(s),
            Value::BigInt(b) => write!(f, "{b}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_PATTERN)),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
            Value::Bean(b) => f.write_str(b.type_name()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(i) => write!(f, "Int({i})"),
            Value::UInt(u) => write!(f, "UInt({u})"),
            Value::Float(x) => write!(f, "Float({x})"),
            Value::Char(c) => write!(f, "Char({c:?})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::BigInt(b) => write!(f, "BigInt({b})"),
            Value::Decimal(d) => write!(f, "Decimal({d})"),
            Value::DateTime(dt) => write!(f, "DateTime({dt})"),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Map(map) => f.debug_tuple("Map").field(map).finish(),
            Value::Bean(b) => write!(f, "Bean({})", b.type_name()),
        }
    }
}

// ============================================================================
// ToValue - Rust type to Value
// ============================================================================

/// Convert an owning Rust value into a [`Value`].
///
/// Implemented for every scalar a bean field can use; the `bean!` macro
/// leans on it for generated getters. Implement it for your own leaf types
/// to make them usable as field types.
pub trait ToValue {
    /// Wrap `self` in the matching [`Value`] variant.
    fn to_value(self) -> Value;
}

/// Helper macro for wrapping primitive families into one variant
macro_rules! impl_to_value {
    ($variant:ident as $repr:ty: $($t:ty),+) => {
        $(
            impl ToValue for $t {
                #[inline]
                fn to_value(self) -> Value {
                    Value::$variant(self as $repr)
                }
            }
        )+
    };
}

impl_to_value!(Int as i64: i8, i16, i32, i64);
impl_to_value!(UInt as u64: u8, u16, u32, u64);
impl_to_value!(Float as f64: f32, f64);

impl ToValue for bool {
    #[inline]
    fn to_value(self) -> Value {
        Value::Bool(self)
    }
}

impl ToValue for char {
    #[inline]
    fn to_value(self) -> Value {
        Value::Char(self)
    }
}

impl ToValue for String {
    #[inline]
    fn to_value(self) -> Value {
        Value::Str(self)
    }
}

impl ToValue for &str {
    #[inline]
    fn to_value(self) -> Value {
        Value::Str(self.to_owned())
    }
}

impl ToValue for BigInt {
    #[inline]
    fn to_value(self) -> Value {
        Value::BigInt(self)
    }
}

impl ToValue for Decimal {
    #[inline]
    fn to_value(self) -> Value {
        Value::Decimal(self)
    }
}

impl ToValue for NaiveDateTime {
    #[inline]
    fn to_value(self) -> Value {
        Value::DateTime(self)
    }
}

impl ToValue for NaiveDate {
    /// A bare date becomes the timestamp at midnight.
    #[inline]
    fn to_value(self) -> Value {
        Value::DateTime(self.and_time(NaiveTime::MIN))
    }
}

impl ToValue for Value {
    #[inline]
    fn to_value(self) -> Value {
        self
    }
}

impl ToValue for ValueMap {
    #[inline]
    fn to_value(self) -> Value {
        Value::Map(self)
    }
}

impl<T: ToValue> ToValue for Option<T> {
    /// `None` becomes [`Value::Null`].
    #[inline]
    fn to_value(self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    #[inline]
    fn to_value(self) -> Value {
        Value::List(self.into_iter().map(ToValue::to_value).collect())
    }
}
