//! Turns raw operator input into engine inputs.
//!
//! This is the only place where a blank exchange rate may be defaulted, and
//! only when `default_exchange_rate` is configured.

use std::str::FromStr;

use engine::{ClosureDeclaration, EngineError, ExchangeRate, FieldInput, Money, Session};

use crate::error::{AppError, Result};

/// Closure figures typed on the command line.
#[derive(Debug, Default, Clone)]
pub struct ClosureOverrides<'a> {
    pub exchange_rate: Option<&'a str>,
    pub cash_bs: Option<&'a str>,
    pub cash_usd: Option<&'a str>,
}

impl ClosureOverrides<'_> {
    fn is_empty(&self) -> bool {
        self.exchange_rate.is_none() && self.cash_bs.is_none() && self.cash_usd.is_none()
    }
}

/// Parses an optional amount flag, naming the flag in the error.
pub fn amount(flag: &str, raw: Option<&str>) -> Result<Option<Money>> {
    raw.map(|raw| parse(flag, raw)).transpose()
}

/// An operator-typed figure, `Unset` when the flag is absent.
pub fn field(flag: &str, raw: Option<&str>) -> Result<FieldInput<Money>> {
    Ok(amount(flag, raw)?.map_or(FieldInput::Unset, FieldInput::UserOverridden))
}

/// Parses an exchange rate flag. Rate errors stay engine rate errors.
pub fn rate(raw: Option<&str>) -> Result<Option<ExchangeRate>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => Ok(Some(raw.parse::<ExchangeRate>()?)),
    }
}

/// Builds the closure declaration from the stored session and the flags.
///
/// Flags win over the session. A blank rate falls back to `default_rate`
/// when one is configured, otherwise it is an [`EngineError::InvalidRate`].
/// No session and no flags means nothing was declared.
pub fn closure(
    session: Option<&Session>,
    overrides: &ClosureOverrides<'_>,
    default_rate: Option<ExchangeRate>,
) -> Result<Option<ClosureDeclaration>> {
    if session.is_none() && overrides.is_empty() {
        return Ok(None);
    }

    let cash_available_bs = match amount("--cash-bs", overrides.cash_bs)? {
        Some(cash) => cash,
        None => session.map_or(Money::ZERO, |s| s.cash_available_bs),
    };
    let cash_available_usd = match amount("--cash-usd", overrides.cash_usd)? {
        Some(cash) => cash,
        None => session.map_or(Money::ZERO, |s| s.cash_available_usd),
    };

    let declared = match rate(overrides.exchange_rate)? {
        Some(rate) => Some(rate),
        None => session.and_then(|s| s.exchange_rate),
    };
    let exchange_rate = match (declared, default_rate) {
        (Some(rate), _) => rate,
        (None, Some(fallback)) => {
            tracing::info!("no exchange rate declared, applying configured default {fallback}");
            fallback
        }
        (None, None) => {
            return Err(EngineError::InvalidRate(
                "no exchange rate declared and no default configured".to_string(),
            )
            .into());
        }
    };

    Ok(Some(ClosureDeclaration {
        cash_available_bs,
        cash_available_usd,
        exchange_rate,
    }))
}

fn parse<T: FromStr<Err = EngineError>>(flag: &str, raw: &str) -> Result<T> {
    raw.parse()
        .map_err(|err| AppError::Input(format!("{flag}: {err}")))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;

    fn session(rate: Option<i64>) -> Session {
        Session {
            id: Uuid::nil(),
            agency_id: None,
            user_id: None,
            session_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            cash_available_bs: Money::from_units(100),
            cash_available_usd: Money::from_units(5),
            exchange_rate: rate.map(ExchangeRate::from_units),
            closure_confirmed: false,
            closure_notes: None,
        }
    }

    #[test]
    fn nothing_declared_is_none() {
        assert_eq!(closure(None, &ClosureOverrides::default(), None).unwrap(), None);
    }

    #[test]
    fn flags_win_over_session() {
        let overrides = ClosureOverrides {
            exchange_rate: Some("40"),
            cash_bs: Some("250,50"),
            cash_usd: None,
        };
        let declared = closure(Some(&session(Some(36))), &overrides, None)
            .unwrap()
            .unwrap();
        assert_eq!(declared.exchange_rate, ExchangeRate::from_units(40));
        assert_eq!(declared.cash_available_bs, Money::new(25_050));
        assert_eq!(declared.cash_available_usd, Money::from_units(5));
    }

    #[test]
    fn blank_rate_needs_a_configured_default() {
        let err = closure(Some(&session(None)), &ClosureOverrides::default(), None).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let declared = closure(
            Some(&session(None)),
            &ClosureOverrides::default(),
            Some(ExchangeRate::from_units(36)),
        )
        .unwrap()
        .unwrap();
        assert_eq!(declared.exchange_rate, ExchangeRate::from_units(36));
    }

    #[test]
    fn zero_rate_is_not_defaulted() {
        let declared = closure(
            Some(&session(Some(0))),
            &ClosureOverrides::default(),
            Some(ExchangeRate::from_units(36)),
        )
        .unwrap()
        .unwrap();
        assert_eq!(declared.exchange_rate, ExchangeRate::from_units(0));
    }

    #[test]
    fn bad_amount_names_the_flag() {
        let err = field("--banco", Some("12.345")).unwrap_err();
        assert!(err.to_string().contains("--banco"));
        assert_eq!(field("--banco", None).unwrap(), FieldInput::Unset);
    }
}
