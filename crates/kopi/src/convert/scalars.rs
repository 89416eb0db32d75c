//! Stock converters for boolean, numeric, char, and text targets.
//!
//! Numeric coercion funnels through one lossy `i128` read: booleans become
//! 0/1, chars their Unicode scalar value, datetimes their epoch
//! milliseconds, strings parse as integers with a float fallback, floats
//! truncate toward zero. Width narrowing is then a checked `try_from`, so
//! out-of-range input is rejected instead of wrapped.

use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive, Zero};

use crate::convert::datetime::epoch_millis;
use crate::convert::ConverterRegistry;
use crate::decimal::Decimal;
use crate::value::Value;

/// Affirmative tokens the default boolean converter accepts,
/// case-insensitively.
pub const AFFIRMATIVE_TOKENS: &[&str] = &["true", "yes", "y", "t", "ok", "1", "on"];

/// i128::MAX rounds up to 2^127 as a float, so this is the exclusive
/// upper bound of the representable range.
const I128_BOUND: f64 = i128::MAX as f64;

fn float_to_i128(x: f64) -> Option<i128> {
    if !x.is_finite() {
        return None;
    }
    let t = x.trunc();
    if t >= -I128_BOUND && t < I128_BOUND {
        Some(t as i128)
    } else {
        None
    }
}

/// Integer grammar first, then the float grammar truncated toward zero.
fn parse_int_text(text: &str) -> Option<i128> {
    let text = text.trim();
    if let Ok(i) = text.parse::<i128>() {
        return Some(i);
    }
    float_to_i128(text.parse::<f64>().ok()?)
}

/// Best-effort read of any numeric-ish value, widened to i128.
fn as_i128_lossy(value: &Value) -> Option<i128> {
    match value {
        Value::Bool(b) => Some(*b as i128),
        Value::Int(i) => Some(*i as i128),
        Value::UInt(u) => Some(*u as i128),
        Value::Float(x) => float_to_i128(*x),
        Value::Char(c) => Some(*c as u32 as i128),
        Value::Str(s) => parse_int_text(s),
        Value::BigInt(b) => b.to_i128(),
        Value::Decimal(d) => Some(d.to_i128_trunc()),
        Value::DateTime(dt) => Some(epoch_millis(*dt) as i128),
        _ => None,
    }
}

// ============================================================================
// Boolean
// ============================================================================

fn coerce_bool<S: AsRef<str>>(tokens: &[S], value: &Value) -> Option<bool> {
    let token_match = |needle: &str| tokens.iter().any(|t| t.as_ref() == needle);
    match value {
        Value::Bool(b) => Some(*b),
        Value::Int(i) => Some(*i != 0),
        Value::UInt(u) => Some(*u != 0),
        Value::Float(x) => Some(*x != 0.0),
        Value::BigInt(b) => Some(!b.is_zero()),
        Value::Decimal(d) => Some(!d.is_zero()),
        Value::Char(c) => {
            let lowered: String = c.to_lowercase().collect();
            Some(token_match(&lowered))
        }
        Value::Str(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            Some(token_match(&trimmed.to_lowercase()))
        }
        _ => None,
    }
}

/// Convert to `bool` with the default affirmative token table.
///
/// Numeric input is true iff nonzero; a blank string is indeterminate; any
/// non-blank string outside the token table is `false`.
pub fn value_to_bool(_registry: &ConverterRegistry, value: &Value) -> Option<bool> {
    coerce_bool(AFFIRMATIVE_TOKENS, value)
}

/// Build a boolean converter with a custom affirmative token table, for
/// registering over the default (`"ja"`, `"oui"`, ...). Tokens are matched
/// case-insensitively.
pub fn bool_converter_with<I, S>(
    tokens: I,
) -> impl Fn(&ConverterRegistry, &Value) -> Option<bool> + Send + Sync + 'static
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let tokens: Vec<String> = tokens
        .into_iter()
        .map(|t| t.into().to_lowercase())
        .collect();
    move |_registry, value| coerce_bool(&tokens, value)
}

// ============================================================================
// Integers
// ============================================================================

/// Helper macro for range-checked integer targets
macro_rules! int_converter {
    ($name:ident -> $t:ty) => {
        #[doc = concat!(
            "Convert a numeric-ish value to `",
            stringify!($t),
            "`, rejecting out-of-range input instead of wrapping."
        )]
        pub fn $name(_registry: &ConverterRegistry, value: &Value) -> Option<$t> {
            <$t>::try_from(as_i128_lossy(value)?).ok()
        }
    };
}

int_converter!(value_to_i8 -> i8);
int_converter!(value_to_i16 -> i16);
int_converter!(value_to_i32 -> i32);
int_converter!(value_to_i64 -> i64);
int_converter!(value_to_u8 -> u8);
int_converter!(value_to_u16 -> u16);
int_converter!(value_to_u32 -> u32);
int_converter!(value_to_u64 -> u64);

// ============================================================================
// Floats
// ============================================================================

/// Convert a numeric-ish value to `f64`.
pub fn value_to_f64(_registry: &ConverterRegistry, value: &Value) -> Option<f64> {
    match value {
        Value::Bool(b) => Some(*b as u8 as f64),
        Value::Int(i) => Some(*i as f64),
        Value::UInt(u) => Some(*u as f64),
        Value::Float(x) => Some(*x),
        Value::Char(c) => Some(*c as u32 as f64),
        Value::Str(s) => s.trim().parse::<f64>().ok(),
        Value::BigInt(b) => b.to_f64(),
        Value::Decimal(d) => Some(d.to_f64()),
        Value::DateTime(dt) => Some(epoch_millis(*dt) as f64),
        _ => None,
    }
}

/// Convert a numeric-ish value to `f32`, rejecting magnitudes that only an
/// `f64` can hold.
pub fn value_to_f32(registry: &ConverterRegistry, value: &Value) -> Option<f32> {
    let wide = value_to_f64(registry, value)?;
    let narrow = wide as f32;
    if narrow.is_infinite() && wide.is_finite() {
        return None;
    }
    Some(narrow)
}

// ============================================================================
// Char and text
// ============================================================================

/// Convert to `char`: booleans map to `'1'`/`'0'`, everything else takes
/// the first character of its textual form.
pub fn value_to_char(_registry: &ConverterRegistry, value: &Value) -> Option<char> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(if *b { '1' } else { '0' }),
        Value::Char(c) => Some(*c),
        other => other.to_string().chars().next(),
    }
}

/// Convert to text: the value's display form.
pub fn value_to_text(_registry: &ConverterRegistry, value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

// ============================================================================
// Big numbers
// ============================================================================

/// Convert a numeric-ish value to a [`BigInt`], truncating fractions.
pub fn value_to_bigint(_registry: &ConverterRegistry, value: &Value) -> Option<BigInt> {
    match value {
        Value::BigInt(b) => Some(b.clone()),
        Value::Bool(b) => Some(BigInt::from(*b as u8)),
        Value::Int(i) => Some(BigInt::from(*i)),
        Value::UInt(u) => Some(BigInt::from(*u)),
        Value::Float(x) => BigInt::from_f64(x.trunc()),
        Value::Char(c) => Some(BigInt::from(*c as u32)),
        Value::Str(s) => {
            let trimmed = s.trim();
            if let Ok(b) = trimmed.parse::<BigInt>() {
                return Some(b);
            }
            BigInt::from_f64(trimmed.parse::<f64>().ok()?.trunc())
        }
        Value::Decimal(d) => Some(BigInt::from(d.to_i128_trunc())),
        Value::DateTime(dt) => Some(BigInt::from(epoch_millis(*dt))),
        _ => None,
    }
}

/// Convert a numeric-ish value to a [`Decimal`].
pub fn value_to_decimal(_registry: &ConverterRegistry, value: &Value) -> Option<Decimal> {
    match value {
        Value::Decimal(d) => Some(*d),
        Value::Bool(b) => Some(Decimal::from(*b as i64)),
        Value::Int(i) => Some(Decimal::from(*i)),
        Value::UInt(u) => Some(Decimal::from(*u)),
        Value::Float(x) => Decimal::from_f64(*x),
        Value::Char(c) => Some(Decimal::from(*c as u32 as u64)),
        Value::Str(s) => Decimal::parse(s),
        Value::BigInt(b) => b.to_i128().map(Decimal::from),
        Value::DateTime(dt) => Some(Decimal::from(epoch_millis(*dt))),
        _ => None,
    }
}

/// Install every scalar converter into a registry.
pub(crate) fn register_defaults(registry: &mut ConverterRegistry) {
    registry.register::<bool>("bool", value_to_bool);
    registry.register::<i8>("i8", value_to_i8);
    registry.register::<i16>("i16", value_to_i16);
    registry.register::<i32>("i32", value_to_i32);
    registry.register::<i64>("i64", value_to_i64);
    registry.register::<u8>("u8", value_to_u8);
    registry.register::<u16>("u16", value_to_u16);
    registry.register::<u32>("u32", value_to_u32);
    registry.register::<u64>("u64", value_to_u64);
    registry.register::<f32>("f32", value_to_f32);
    registry.register::<f64>("f64", value_to_f64);
    registry.register::<char>("char", value_to_char);
    registry.register::<String>("String", value_to_text);
    registry.register::<BigInt>("BigInt", value_to_bigint);
    registry.register::<Decimal>("Decimal", value_to_decimal);
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn registry() -> ConverterRegistry {
        ConverterRegistry::with_defaults()
    }

    #[test]
    fn test_bool_token_table() {
        let r = registry();
        assert_eq!(r.to_bool(&Value::Str("y".into())), Some(true));
        assert_eq!(r.to_bool(&Value::Str("Y".into())), Some(true));
        assert_eq!(r.to_bool(&Value::Str("TRUE".into())), Some(true));
        assert_eq!(r.to_bool(&Value::Str("on".into())), Some(true));
        assert_eq!(r.to_bool(&Value::Str("nope".into())), Some(false));
        assert_eq!(r.to_bool(&Value::Str("".into())), None);
        assert_eq!(r.to_bool(&Value::Str("   ".into())), None);
    }

    #[test]
    fn test_bool_from_numbers() {
        let r = registry();
        assert_eq!(r.to_bool(&Value::Int(0)), Some(false));
        assert_eq!(r.to_bool(&Value::Int(-2)), Some(true));
        assert_eq!(r.to_bool(&Value::Float(3.14)), Some(true));
        assert_eq!(r.to_bool(&Value::Float(0.0)), Some(false));
        assert_eq!(r.to_bool(&Value::UInt(1)), Some(true));
    }

    #[test]
    fn test_bool_custom_tokens() {
        let mut r = registry();
        r.register::<bool>("bool", bool_converter_with(["ja", "oui"]));
        assert_eq!(r.to_bool(&Value::Str("Ja".into())), Some(true));
        assert_eq!(r.to_bool(&Value::Str("yes".into())), Some(false));
        // Non-string coercion is unaffected by the token table.
        assert_eq!(r.to_bool(&Value::Int(2)), Some(true));
    }

    #[test]
    fn test_int_range_rejection() {
        let r = registry();
        assert_eq!(r.to_i8(&Value::Int(1280)), None);
        assert_eq!(r.to_i8(&Value::Int(100)), Some(100));
        assert_eq!(r.to_i8(&Value::Int(-128)), Some(-128));
        assert_eq!(r.to_u8(&Value::Int(-1)), None);
        assert_eq!(r.to_u64(&Value::Int(-1)), None);
        assert_eq!(r.to_i64(&Value::UInt(u64::MAX)), None);
    }

    #[test]
    fn test_int_from_strings() {
        let r = registry();
        assert_eq!(r.to_i32(&Value::Str("  42  ".into())), Some(42));
        assert_eq!(r.to_i32(&Value::Str("-7".into())), Some(-7));
        // Float grammar fallback truncates toward zero.
        assert_eq!(r.to_i32(&Value::Str("42.9".into())), Some(42));
        assert_eq!(r.to_i32(&Value::Str("-42.9".into())), Some(-42));
        assert_eq!(r.to_i32(&Value::Str("1e3".into())), Some(1000));
        assert_eq!(r.to_i32(&Value::Str("forty-two".into())), None);
        assert_eq!(r.to_i8(&Value::Str("1280".into())), None);
    }

    #[test]
    fn test_int_from_floats_truncates() {
        let r = registry();
        assert_eq!(r.to_i64(&Value::Float(3.99)), Some(3));
        assert_eq!(r.to_i64(&Value::Float(-3.99)), Some(-3));
        assert_eq!(r.to_i64(&Value::Float(f64::NAN)), None);
        assert_eq!(r.to_i64(&Value::Float(f64::INFINITY)), None);
        assert_eq!(r.to_i64(&Value::Float(1e30)), None);
    }

    #[test]
    fn test_bool_to_numbers() {
        let r = registry();
        assert_eq!(r.to_i32(&Value::Bool(true)), Some(1));
        assert_eq!(r.to_i32(&Value::Bool(false)), Some(0));
        assert_eq!(r.to_f64(&Value::Bool(true)), Some(1.0));
    }

    #[test]
    fn test_char_scalar_value() {
        let r = registry();
        assert_eq!(r.to_u32(&Value::Char('A')), Some(65));
        assert_eq!(r.to_i64(&Value::Char('☕')), Some(0x2615));
        assert_eq!(r.to_u8(&Value::Char('☕')), None);
    }

    #[test]
    fn test_to_char() {
        let r = registry();
        assert_eq!(r.to_char(&Value::Bool(true)), Some('1'));
        assert_eq!(r.to_char(&Value::Bool(false)), Some('0'));
        assert_eq!(r.to_char(&Value::Str("kopi".into())), Some('k'));
        assert_eq!(r.to_char(&Value::Str("".into())), None);
        assert_eq!(r.to_char(&Value::Int(42)), Some('4'));
    }

    #[test]
    fn test_text_round_trip() {
        let r = registry();
        let text = r.to_text(&Value::Int(42)).unwrap();
        assert_eq!(text, "42");
        assert_eq!(r.to_i64(&Value::Str(text)), Some(42));
    }

    #[test]
    fn test_f32_narrowing_rejects_overflow() {
        let r = registry();
        assert_eq!(r.to_f32(&Value::Float(1.5)), Some(1.5));
        assert_eq!(r.to_f32(&Value::Float(1e300)), None);
    }

    #[test]
    fn test_bigint_conversions() {
        let r = registry();
        assert_eq!(r.to_bigint(&Value::Int(-5)), Some(BigInt::from(-5)));
        assert_eq!(
            r.to_bigint(&Value::Str("123456789012345678901234567890".into())),
            "123456789012345678901234567890".parse::<BigInt>().ok()
        );
        assert_eq!(r.to_bigint(&Value::Float(2.9)), Some(BigInt::from(2)));
        // Oversized BigInt cannot narrow back to i64.
        let huge = Value::BigInt("123456789012345678901234567890".parse().unwrap());
        assert_eq!(r.to_i64(&huge), None);
    }

    #[test]
    fn test_decimal_conversions() {
        let r = registry();
        let d = r.to_decimal(&Value::Str("15.5".into())).unwrap();
        assert_eq!(d, Decimal::parse("15.5").unwrap());
        assert_eq!(r.to_text(&Value::Decimal(d)), Some("15.5".to_string()));
        assert_eq!(r.to_decimal(&Value::Int(3)), Some(Decimal::from(3i64)));
        assert_eq!(r.to_i32(&Value::Decimal(d)), Some(15));
    }

    #[test]
    fn test_datetime_to_numbers_is_epoch_millis() {
        let r = registry();
        let dt = NaiveDate::from_ymd_opt(1970, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(r.to_i64(&Value::DateTime(dt)), Some(86_400_000));
        assert_eq!(r.to_f64(&Value::DateTime(dt)), Some(86_400_000.0));
    }

    #[test]
    fn test_structured_values_do_not_coerce_to_numbers() {
        let r = registry();
        assert_eq!(r.to_i64(&Value::List(vec![Value::Int(1)])), None);
        assert_eq!(r.to_bool(&Value::List(vec![])), None);
    }
}
