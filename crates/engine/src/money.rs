use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    Currency, EngineError, ExchangeRate, Percentage, ResultEngine,
    util::{FixedVisitor, format_fixed, mul_div_round, parse_fixed},
};

/// Signed money amount represented as **integer cents**.
///
/// Use this type for **all** monetary values in the engine (sales, prizes,
/// cash on hand, differences) to avoid floating-point drift: reports sum
/// dozens of small records before multiplying by an exchange rate.
///
/// The value is signed. Transaction amounts are non-negative; differences
/// and mobile payments carry a sign.
///
/// # Examples
///
/// ```rust
/// use engine::Money;
///
/// let amount = Money::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects >
/// 2 decimals):
///
/// ```rust
/// use engine::Money;
///
/// assert_eq!("10".parse::<Money>().unwrap().cents(), 1000);
/// assert_eq!("10,5".parse::<Money>().unwrap().cents(), 1050);
/// assert!("12.345".parse::<Money>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Creates a new amount from whole units (bolívars or dollars).
    #[must_use]
    pub const fn from_units(units: i64) -> Self {
        Self(units * 100)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Absolute value (returns `None` for the most negative amount).
    #[must_use]
    pub const fn checked_abs(self) -> Option<Money> {
        match self.0.checked_abs() {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Addition reporting overflow as an engine error naming `what`.
    pub(crate) fn try_add(self, rhs: Money, what: &str) -> ResultEngine<Money> {
        self.checked_add(rhs)
            .ok_or_else(|| EngineError::Overflow(format!("{what}: {self} + {rhs}")))
    }

    pub(crate) fn try_sub(self, rhs: Money, what: &str) -> ResultEngine<Money> {
        self.checked_sub(rhs)
            .ok_or_else(|| EngineError::Overflow(format!("{what}: {self} - {rhs}")))
    }

    /// Converts a USD amount into bolívars at `rate`, rounded to the cent
    /// (half away from zero).
    pub fn convert(self, rate: ExchangeRate) -> ResultEngine<Money> {
        mul_div_round(self.0, rate.ten_thousandths(), ExchangeRate::SCALE)
            .map(Money)
            .ok_or_else(|| EngineError::Overflow(format!("{self} x {rate}")))
    }

    /// Applies `percentage` to the amount, rounded to the cent (half away from
    /// zero).
    pub fn percent(self, percentage: Percentage) -> ResultEngine<Money> {
        mul_div_round(self.0, percentage.hundredths(), Percentage::SCALE)
            .map(Money)
            .ok_or_else(|| EngineError::Overflow(format!("{percentage} of {self}")))
    }

    /// Renders the amount with the currency code, e.g. `"10.50 VES"`.
    #[must_use]
    pub fn format(self, currency: Currency) -> String {
        format!("{self} {}", currency.code())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_fixed(self.0, 2))
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses a decimal string into cents.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    ///
    /// Validation rules:
    /// - max 2 fractional digits (rejects `12.345`)
    /// - rejects empty/invalid strings
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed(s, 2)
            .map(Money)
            .map_err(|reason| EngineError::InvalidAmount(format!("{reason}: '{}'", s.trim())))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_any(FixedVisitor::new(
                2,
                "a decimal amount with at most 2 fractional digits",
            ))
            .map(Money)
    }
}

/// Deserializes an optional amount, mapping JSON `null` to zero.
///
/// Use together with `#[serde(default)]` so a missing field is zero too.
pub(crate) fn null_as_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
    Option::<Money>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A pair of amounts, one per currency.
///
/// At aggregation time both fields are non-negative: the sign of a movement
/// is carried by its category, never by a negative `MoneyAmount`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoneyAmount {
    #[serde(default, deserialize_with = "null_as_zero")]
    pub bs: Money,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub usd: Money,
}

impl MoneyAmount {
    pub const ZERO: MoneyAmount = MoneyAmount {
        bs: Money::ZERO,
        usd: Money::ZERO,
    };

    #[must_use]
    pub const fn new(bs: Money, usd: Money) -> Self {
        Self { bs, usd }
    }

    /// Returns the amount in the requested currency.
    #[must_use]
    pub const fn get(self, currency: Currency) -> Money {
        match currency {
            Currency::Ves => self.bs,
            Currency::Usd => self.usd,
        }
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.bs.is_zero() && self.usd.is_zero()
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.bs.is_negative() || self.usd.is_negative()
    }

    /// Checked per-currency addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: MoneyAmount) -> Option<MoneyAmount> {
        Some(MoneyAmount {
            bs: self.bs.checked_add(rhs.bs)?,
            usd: self.usd.checked_add(rhs.usd)?,
        })
    }

    pub(crate) fn try_add(self, rhs: MoneyAmount, what: &str) -> ResultEngine<MoneyAmount> {
        Ok(MoneyAmount {
            bs: self.bs.try_add(rhs.bs, what)?,
            usd: self.usd.try_add(rhs.usd, what)?,
        })
    }

    pub(crate) fn try_sub(self, rhs: MoneyAmount, what: &str) -> ResultEngine<MoneyAmount> {
        Ok(MoneyAmount {
            bs: self.bs.try_sub(rhs.bs, what)?,
            usd: self.usd.try_sub(rhs.usd, what)?,
        })
    }

    /// Rejects a pair holding a negative amount; `what` names the record.
    pub(crate) fn ensure_non_negative(self, what: &str) -> ResultEngine<MoneyAmount> {
        if self.is_negative() {
            return Err(EngineError::InvalidAmount(format!(
                "{what} must not be negative (bs {}, usd {})",
                self.bs, self.usd
            )));
        }
        Ok(self)
    }
}

impl Add for MoneyAmount {
    type Output = MoneyAmount;

    fn add(self, rhs: MoneyAmount) -> Self::Output {
        MoneyAmount {
            bs: self.bs + rhs.bs,
            usd: self.usd + rhs.usd,
        }
    }
}

impl AddAssign for MoneyAmount {
    fn add_assign(&mut self, rhs: MoneyAmount) {
        self.bs += rhs.bs;
        self.usd += rhs.usd;
    }
}

impl Sub for MoneyAmount {
    type Output = MoneyAmount;

    fn sub(self, rhs: MoneyAmount) -> Self::Output {
        MoneyAmount {
            bs: self.bs - rhs.bs,
            usd: self.usd - rhs.usd,
        }
    }
}

impl Sum for MoneyAmount {
    fn sum<I: Iterator<Item = MoneyAmount>>(iter: I) -> Self {
        iter.fold(MoneyAmount::ZERO, Add::add)
    }
}
