//! Fixed-point ratios: the bolívar/dollar exchange rate and percentages.
//!
//! Neither type validates its range on construction. The calculators decide
//! what is acceptable (a rate must be positive, a percentage within `0..=100`)
//! so invalid operator input is reported where it is used.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    EngineError, ResultEngine,
    util::{FixedVisitor, format_fixed, parse_fixed},
};

/// Bolívars per US dollar, stored as ten-thousandths (4 fractional digits).
///
/// ```rust
/// use engine::ExchangeRate;
///
/// let rate: ExchangeRate = "36.5821".parse().unwrap();
/// assert_eq!(rate.ten_thousandths(), 365_821);
/// assert_eq!(rate.to_string(), "36.5821");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExchangeRate(i64);

impl ExchangeRate {
    pub(crate) const SCALE: i64 = 10_000;

    /// Creates a rate from ten-thousandths of a bolívar per dollar.
    #[must_use]
    pub const fn from_ten_thousandths(value: i64) -> Self {
        Self(value)
    }

    /// Creates a rate from whole bolívars per dollar.
    #[must_use]
    pub const fn from_units(units: i64) -> Self {
        Self(units * Self::SCALE)
    }

    #[must_use]
    pub const fn ten_thousandths(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns the rate if it is strictly positive, `InvalidRate` otherwise.
    pub fn validated(self) -> ResultEngine<Self> {
        if self.is_positive() {
            Ok(self)
        } else {
            Err(EngineError::InvalidRate(format!(
                "exchange rate must be > 0, got {self}"
            )))
        }
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_fixed(self.0, 4))
    }
}

impl FromStr for ExchangeRate {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed(s, 4)
            .map(Self)
            .map_err(|reason| EngineError::InvalidRate(format!("{reason}: '{}'", s.trim())))
    }
}

impl Serialize for ExchangeRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ExchangeRate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_any(FixedVisitor::new(
                4,
                "an exchange rate with at most 4 fractional digits",
            ))
            .map(Self)
    }
}

/// A percentage stored as hundredths of a percent (`12.5%` ⇄ `1250`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percentage(i64);

impl Percentage {
    pub const ZERO: Percentage = Percentage(0);
    pub const HUNDRED: Percentage = Percentage(10_000);

    /// Divisor turning `amount * hundredths` back into an amount.
    pub(crate) const SCALE: i64 = 10_000;

    #[must_use]
    pub const fn from_hundredths(value: i64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn from_units(units: i64) -> Self {
        Self(units * 100)
    }

    #[must_use]
    pub const fn hundredths(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns the percentage if it lies within `0..=100`.
    ///
    /// `label` names the percentage in the error message.
    pub fn validated(self, label: &str) -> ResultEngine<Self> {
        if (Self::ZERO..=Self::HUNDRED).contains(&self) {
            Ok(self)
        } else {
            Err(EngineError::InvalidPercentage(format!(
                "{label} must be within 0..=100, got {self}"
            )))
        }
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", format_fixed(self.0, 2))
    }
}

impl FromStr for Percentage {
    type Err = EngineError;

    /// Parses `"12.5"` or `"12.5%"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let raw = raw.strip_suffix('%').unwrap_or(raw);
        parse_fixed(raw, 2)
            .map(Self)
            .map_err(|reason| EngineError::InvalidPercentage(format!("{reason}: '{}'", s.trim())))
    }
}

impl Serialize for Percentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_fixed(self.0, 2))
    }
}

impl<'de> Deserialize<'de> for Percentage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_any(FixedVisitor::new(2, "a percentage with at most 2 fractional digits"))
            .map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_validation_rejects_zero_and_negative() {
        assert!(ExchangeRate::from_units(36).validated().is_ok());
        assert!(matches!(
            ExchangeRate::from_units(0).validated(),
            Err(EngineError::InvalidRate(_))
        ));
        assert!(matches!(
            "-1".parse::<ExchangeRate>().unwrap().validated(),
            Err(EngineError::InvalidRate(_))
        ));
    }

    #[test]
    fn rate_parse_errors_are_rate_errors() {
        assert!(matches!(
            "".parse::<ExchangeRate>(),
            Err(EngineError::InvalidRate(_))
        ));
        assert!(matches!(
            "36.12345".parse::<ExchangeRate>(),
            Err(EngineError::InvalidRate(_))
        ));
    }

    #[test]
    fn percentage_parses_optional_suffix() {
        assert_eq!("10".parse::<Percentage>().unwrap(), Percentage::from_units(10));
        assert_eq!("12.5%".parse::<Percentage>().unwrap().hundredths(), 1250);
        assert_eq!(Percentage::from_hundredths(1250).to_string(), "12.50%");
    }

    #[test]
    fn percentage_range() {
        assert!(Percentage::HUNDRED.validated("participation").is_ok());
        assert!(Percentage::ZERO.validated("participation").is_ok());
        assert!(matches!(
            Percentage::from_hundredths(10_001).validated("participation"),
            Err(EngineError::InvalidPercentage(_))
        ));
        assert!(Percentage::from_units(-1).validated("commission").is_err());
    }

    #[test]
    fn serde_uses_decimal_strings() {
        let rate: ExchangeRate = serde_json::from_str("36.5").unwrap();
        assert_eq!(rate, ExchangeRate::from_ten_thousandths(365_000));
        assert_eq!(serde_json::to_string(&rate).unwrap(), "\"36.5000\"");
        let pct: Percentage = serde_json::from_str("\"7.25\"").unwrap();
        assert_eq!(pct.hundredths(), 725);
    }
}
