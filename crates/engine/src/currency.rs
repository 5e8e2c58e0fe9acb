use serde::{Deserialize, Serialize};

use crate::EngineError;

/// ISO-like currency code of a monetary value handled by the engine.
///
/// Agencies work with two currencies side by side: Venezuelan bolívars
/// (`VES`, shown as "Bs") and US dollars. Every record carries both amounts and
/// the engine keeps them in separate columns until the closure formula converts
/// the USD excess with the operator-entered exchange rate.
///
/// ## Minor units
///
/// The engine stores monetary values as an `i64` number of **minor units** (see
/// `Money`). Both currencies use 2 minor units, so `10.50 Bs` ⇄ `1050`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Ves,
    Usd,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Ves => "VES",
            Currency::Usd => "USD",
        }
    }

    /// Symbol used when rendering amounts for people.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Currency::Ves => "Bs",
            Currency::Usd => "$",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Ves | Currency::Usd => 2,
        }
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "VES" | "BS" => Ok(Currency::Ves),
            "USD" => Ok(Currency::Usd),
            other => Err(EngineError::InvalidCurrency(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codes_and_bs_alias() {
        assert_eq!(Currency::try_from("ves").unwrap(), Currency::Ves);
        assert_eq!(Currency::try_from(" Bs ").unwrap(), Currency::Ves);
        assert_eq!(Currency::try_from("USD").unwrap(), Currency::Usd);
        assert!(Currency::try_from("EUR").is_err());
    }
}
