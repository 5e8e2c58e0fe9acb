//! Balanced / unbalanced verdicts on closure discrepancies.

use serde::{Deserialize, Serialize};

use crate::{EngineError, Money, ResultEngine};

/// Largest absolute bolívar discrepancy still considered balanced.
pub const RECONCILIATION_TOLERANCE_BS: Money = Money::from_units(100);

/// Largest absolute USD discrepancy labelled "within tolerance". Cosmetic only.
pub const USD_LABEL_TOLERANCE: Money = Money::from_units(10);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Balanced,
    Unbalanced,
}

impl Classification {
    #[must_use]
    pub const fn is_balanced(self) -> bool {
        matches!(self, Self::Balanced)
    }
}

/// Display label for the USD closure. Never a pass/fail verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsdLabel {
    Exact,
    WithinTolerance,
    Surplus,
    Shortfall,
}

/// Applies the bolívar tolerance to a final discrepancy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BalanceClassifier {
    tolerance_bs: Money,
}

impl Default for BalanceClassifier {
    fn default() -> Self {
        Self {
            tolerance_bs: RECONCILIATION_TOLERANCE_BS,
        }
    }
}

impl BalanceClassifier {
    /// Classifier with a custom tolerance. The sign of `tolerance_bs` is ignored.
    pub fn new(tolerance_bs: Money) -> ResultEngine<Self> {
        let tolerance_bs = tolerance_bs.checked_abs().ok_or_else(|| {
            EngineError::Overflow(format!("tolerance {tolerance_bs} has no absolute value"))
        })?;
        Ok(Self { tolerance_bs })
    }

    #[must_use]
    pub const fn tolerance_bs(&self) -> Money {
        self.tolerance_bs
    }

    #[must_use]
    pub fn classify(&self, diferencia_final: Money) -> Classification {
        if diferencia_final.cents().unsigned_abs() <= self.tolerance_bs.cents().unsigned_abs() {
            Classification::Balanced
        } else {
            Classification::Unbalanced
        }
    }
}

#[must_use]
pub fn label_usd(diferencia_usd: Money) -> UsdLabel {
    if diferencia_usd.is_zero() {
        UsdLabel::Exact
    } else if diferencia_usd.cents().unsigned_abs() <= USD_LABEL_TOLERANCE.cents().unsigned_abs() {
        UsdLabel::WithinTolerance
    } else if diferencia_usd.is_positive() {
        UsdLabel::Surplus
    } else {
        UsdLabel::Shortfall
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerance_boundary_is_inclusive() {
        let classifier = BalanceClassifier::default();
        assert_eq!(classifier.classify(Money::new(10_000)), Classification::Balanced);
        assert_eq!(classifier.classify(Money::new(-10_000)), Classification::Balanced);
        assert_eq!(classifier.classify(Money::new(10_001)), Classification::Unbalanced);
        assert_eq!(classifier.classify(Money::new(-10_001)), Classification::Unbalanced);
    }

    #[test]
    fn custom_tolerance() {
        let strict = BalanceClassifier::new(Money::new(-50)).unwrap();
        assert_eq!(strict.tolerance_bs(), Money::new(50));
        assert_eq!(strict.classify(Money::new(51)), Classification::Unbalanced);
        assert!(strict.classify(Money::ZERO).is_balanced());
    }

    #[test]
    fn most_negative_tolerance_is_rejected() {
        let err = BalanceClassifier::new(Money::new(i64::MIN)).unwrap_err();
        assert!(matches!(err, EngineError::Overflow(_)));
        let widest = BalanceClassifier::new(Money::new(i64::MAX)).unwrap();
        assert!(!widest.classify(Money::new(i64::MIN)).is_balanced());
    }

    #[test]
    fn usd_labels() {
        assert_eq!(label_usd(Money::ZERO), UsdLabel::Exact);
        assert_eq!(label_usd(Money::new(-1000)), UsdLabel::WithinTolerance);
        assert_eq!(label_usd(Money::new(1001)), UsdLabel::Surplus);
        assert_eq!(label_usd(Money::new(-1001)), UsdLabel::Shortfall);
    }
}
