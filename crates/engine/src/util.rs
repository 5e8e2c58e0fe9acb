//! Internal helpers for fixed-point parsing and rounding.
//!
//! These utilities are **not** part of the public API. They centralize the
//! decimal handling shared by `Money`, `ExchangeRate` and `Percentage` so every
//! value type parses and rounds the same way.

use core::fmt;

use serde::de;

/// Parses a decimal string into an integer scaled by `10^scale`.
///
/// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
/// Rejects empty strings, thousands separators and more than `scale`
/// fractional digits. The error is a short reason, the caller adds context.
pub(crate) fn parse_fixed(s: &str, scale: u32) -> Result<i64, &'static str> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("empty value");
    }

    let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
        (true, stripped)
    } else if let Some(stripped) = trimmed.strip_prefix('+') {
        (false, stripped)
    } else {
        (false, trimmed)
    };

    let rest = rest.trim();
    if rest.is_empty() {
        return Err("empty value");
    }

    let rest = rest.replace(',', ".");
    let mut parts = rest.split('.');
    let whole_str = parts.next().ok_or("invalid value")?;
    let frac_str = parts.next().unwrap_or("");
    if parts.next().is_some() {
        return Err("invalid value");
    }

    if whole_str.is_empty() || !whole_str.chars().all(|c| c.is_ascii_digit()) {
        return Err("invalid value");
    }
    if !frac_str.chars().all(|c| c.is_ascii_digit()) {
        return Err("invalid value");
    }
    if frac_str.len() > scale as usize {
        return Err("too many decimals");
    }

    let whole: i64 = whole_str.parse().map_err(|_| "value too large")?;
    let frac: i64 = if frac_str.is_empty() {
        0
    } else {
        let padding = 10i64.pow(scale - frac_str.len() as u32);
        frac_str.parse::<i64>().map_err(|_| "invalid value")? * padding
    };

    let total = whole
        .checked_mul(10i64.pow(scale))
        .and_then(|v| v.checked_add(frac))
        .ok_or("value too large")?;

    if negative {
        total.checked_neg().ok_or("value too large")
    } else {
        Ok(total)
    }
}

/// Formats a value scaled by `10^scale` as a plain decimal string.
pub(crate) fn format_fixed(value: i64, scale: u32) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let abs = value.unsigned_abs();
    let unit = 10u64.pow(scale);
    let whole = abs / unit;
    let frac = abs % unit;
    if scale == 0 {
        return format!("{sign}{whole}");
    }
    format!("{sign}{whole}.{frac:0width$}", width = scale as usize)
}

/// Computes `value * factor / divisor` in `i128`, rounding half away from zero.
///
/// Returns `None` when `divisor` is zero or the result does not fit in `i64`.
pub(crate) fn mul_div_round(value: i64, factor: i64, divisor: i64) -> Option<i64> {
    if divisor == 0 {
        return None;
    }
    let numerator = i128::from(value) * i128::from(factor);
    let divisor = i128::from(divisor);
    let quotient = numerator / divisor;
    let remainder = numerator % divisor;
    let rounded = if remainder.abs() * 2 >= divisor.abs() {
        if (numerator < 0) == (divisor < 0) {
            quotient + 1
        } else {
            quotient - 1
        }
    } else {
        quotient
    };
    i64::try_from(rounded).ok()
}

/// Serde visitor producing a value scaled by `10^scale`.
///
/// Accepts decimal strings, JSON integers (whole units) and JSON floats. Floats
/// go through their shortest decimal representation, never through float
/// arithmetic.
pub(crate) struct FixedVisitor {
    scale: u32,
    expecting: &'static str,
}

impl FixedVisitor {
    pub(crate) const fn new(scale: u32, expecting: &'static str) -> Self {
        Self { scale, expecting }
    }
}

impl de::Visitor<'_> for FixedVisitor {
    type Value = i64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.expecting)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
        parse_fixed(v, self.scale).map_err(|reason| E::custom(format!("{reason}: '{v}'")))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
        v.checked_mul(10i64.pow(self.scale))
            .ok_or_else(|| E::custom("value too large"))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
        let v = i64::try_from(v).map_err(|_| E::custom("value too large"))?;
        self.visit_i64(v)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
        if !v.is_finite() {
            return Err(E::custom("value must be finite"));
        }
        self.visit_str(&v.to_string())
    }
}
