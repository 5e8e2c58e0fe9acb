//! The module contains the errors the engine can return and the non-blocking
//! warnings it attaches to its results.
//!
//! The errors are:
//!
//! - [`InvalidRate`] returned when the exchange rate is zero or negative.
//! - [`MissingClosure`] returned when transactions are present but the caller
//!   did not declare cash on hand and exchange rate.
//! - [`InvalidAmount`] returned for unparsable or negative aggregated amounts.
//! - [`InvalidPercentage`] returned for percentages outside `0..=100`.
//! - [`Overflow`] returned when checked arithmetic overflows.
//!
//!  [`InvalidRate`]: EngineError::InvalidRate
//!  [`MissingClosure`]: EngineError::MissingClosure
//!  [`InvalidAmount`]: EngineError::InvalidAmount
//!  [`InvalidPercentage`]: EngineError::InvalidPercentage
//!  [`Overflow`]: EngineError::Overflow
use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Engine custom errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid exchange rate: {0}")]
    InvalidRate(String),
    #[error("Missing closure declaration: {0}")]
    MissingClosure(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid percentage: {0}")]
    InvalidPercentage(String),
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),
    #[error("Arithmetic overflow: {0}")]
    Overflow(String),
}

/// Conditions that do not stop a computation but that the caller should
/// surface, e.g. stale configuration.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum EngineWarning {
    /// No transactions and no closure declaration: "no activity yet".
    EmptyScope,
    /// A lottery system has no commission rate; 0% was applied.
    UnknownSystemCommission { lottery_system_id: Uuid },
    /// Figures reference a lottery system missing from the system list.
    UnknownSystem { lottery_system_id: Uuid },
}

impl fmt::Display for EngineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyScope => f.write_str("empty scope: no transactions and no closure"),
            Self::UnknownSystemCommission { lottery_system_id } => write!(
                f,
                "no commission rate for lottery system {lottery_system_id}, applied 0%"
            ),
            Self::UnknownSystem { lottery_system_id } => {
                write!(f, "unknown lottery system {lottery_system_id}")
            }
        }
    }
}

/// Push `warning` unless an equal one is already present.
pub(crate) fn push_unique(warnings: &mut Vec<EngineWarning>, warning: EngineWarning) {
    if !warnings.contains(&warning) {
        warnings.push(warning);
    }
}
