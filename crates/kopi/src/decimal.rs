//! Decimal - fixed-point decimal on an i128 mantissa.
//!
//! The value is `mantissa / 10^scale`. This covers what the converters
//! need from an arbitrary-precision decimal (exact text round trips, no
//! binary float drift) without pulling in a full arithmetic package;
//! there is deliberately no add/mul surface.

use std::fmt;

/// Largest power of ten an `i128` can hold.
const MAX_POW10: u8 = 38;

/// Fixed-point decimal: `mantissa / 10^scale`.
///
/// Equality is value equality: `15.50 == 15.5`. Display keeps the stored
/// scale, so a parsed value renders back with the digits it came in with.
#[derive(Clone, Copy)]
pub struct Decimal {
    mantissa: i128,
    scale: u8,
}

fn pow10(scale: u8) -> Option<i128> {
    if scale > MAX_POW10 {
        return None;
    }
    Some(10i128.pow(scale as u32))
}

impl Decimal {
    /// Zero at scale 0.
    pub const ZERO: Decimal = Decimal {
        mantissa: 0,
        scale: 0,
    };

    /// Build from a raw mantissa and scale; the value is
    /// `mantissa / 10^scale`.
    #[inline]
    pub const fn new(mantissa: i128, scale: u8) -> Self {
        Self { mantissa, scale }
    }

    /// Raw mantissa.
    #[inline]
    pub const fn mantissa(&self) -> i128 {
        self.mantissa
    }

    /// Number of fractional digits.
    #[inline]
    pub const fn scale(&self) -> u8 {
        self.scale
    }

    /// Parse decimal text: optional sign, digits with an optional point,
    /// optional exponent (`"15.5"`, `"-0.05"`, `"2.5e-2"`).
    ///
    /// Returns `None` for malformed text and for magnitudes or scales the
    /// representation cannot hold.
    pub fn parse(text: &str) -> Option<Decimal> {
        let text = text.trim();
        let (negative, rest) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };

        let (base, exponent) = match rest.split_once(['e', 'E']) {
            Some((base, exp)) => (base, exp.parse::<i32>().ok()?),
            None => (rest, 0),
        };

        let (int_digits, frac_digits) = match base.split_once('.') {
            Some((i, f)) => (i, f),
            None => (base, ""),
        };
        if int_digits.is_empty() && frac_digits.is_empty() {
            return None;
        }

        let mut mantissa: i128 = 0;
        for c in int_digits.chars().chain(frac_digits.chars()) {
            let digit = c.to_digit(10)? as i128;
            mantissa = mantissa.checked_mul(10)?.checked_add(digit)?;
        }
        if negative {
            mantissa = -mantissa;
        }

        let mut scale = frac_digits.len() as i64 - exponent as i64;
        if scale < 0 {
            // A positive exponent shifts digits into the integer part.
            let shift = u8::try_from(-scale).ok()?;
            mantissa = mantissa.checked_mul(pow10(shift)?)?;
            scale = 0;
        }
        let scale = u8::try_from(scale).ok()?;
        Some(Decimal { mantissa, scale })
    }

    /// Build from a finite float, preserving its shortest decimal form.
    pub fn from_f64(value: f64) -> Option<Decimal> {
        if !value.is_finite() {
            return None;
        }
        // Float Display is the shortest text that round-trips, which is
        // exactly the decimal a caller wrote.
        Decimal::parse(&format!("{value}"))
    }

    /// Strip trailing fractional zeros (`15.50` becomes `15.5`).
    pub fn normalized(self) -> Decimal {
        let mut mantissa = self.mantissa;
        let mut scale = self.scale;
        while scale > 0 && mantissa % 10 == 0 {
            mantissa /= 10;
            scale -= 1;
        }
        Decimal { mantissa, scale }
    }

    /// Approximate as a float.
    pub fn to_f64(self) -> f64 {
        self.mantissa as f64 / 10f64.powi(self.scale as i32)
    }

    /// Integer part, truncated toward zero.
    pub fn to_i128_trunc(self) -> i128 {
        match pow10(self.scale) {
            Some(p) => self.mantissa / p,
            // The scale exceeds every i128 power of ten, so |value| < 1.
            None => 0,
        }
    }

    /// Check if the value is exactly zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.mantissa == 0
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        let a = self.normalized();
        let b = other.normalized();
        a.mantissa == b.mantissa && a.scale == b.scale
    }
}

impl Eq for Decimal {}

impl Default for Decimal {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<i64> for Decimal {
    #[inline]
    fn from(value: i64) -> Self {
        Decimal::new(value as i128, 0)
    }
}

impl From<u64> for Decimal {
    #[inline]
    fn from(value: u64) -> Self {
        Decimal::new(value as i128, 0)
    }
}

impl From<i128> for Decimal {
    #[inline]
    fn from(value: i128) -> Self {
        Decimal::new(value, 0)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.mantissa);
        }
        // Render through the digit string; powers of ten past the i128
        // range make arithmetic splitting impossible.
        let digits = self.mantissa.unsigned_abs().to_string();
        let scale = self.scale as usize;
        let sign = if self.mantissa < 0 { "-" } else { "" };
        if digits.len() > scale {
            let split = digits.len() - scale;
            write!(f, "{sign}{}.{}", &digits[..split], &digits[split..])
        } else {
            write!(f, "{sign}0.{digits:0>scale$}")
        }
    }
}

impl fmt::Debug for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Decimal({self})")
    }
}
