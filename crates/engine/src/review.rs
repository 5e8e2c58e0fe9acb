//! Supervisor review statistics over cashier closures.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::{BalanceClassifier, EngineError, Money, ResultEngine, money::null_as_zero};

/// Supervisor verdict on a cashier closure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    #[default]
    Pendiente,
    Aprobado,
    Rechazado,
}

impl ReviewStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pendiente => "pendiente",
            Self::Aprobado => "aprobado",
            Self::Rechazado => "rechazado",
        }
    }
}

impl TryFrom<&str> for ReviewStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pendiente" => Ok(Self::Pendiente),
            "aprobado" => Ok(Self::Aprobado),
            "rechazado" => Ok(Self::Rechazado),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid review status: {other}"
            ))),
        }
    }
}

fn null_as_pending<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ReviewStatus, D::Error> {
    Option::<ReviewStatus>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A cashier's stored daily closure, as seen by the supervisor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashierClosure {
    pub session_id: Uuid,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub agency_id: Uuid,
    pub session_date: NaiveDate,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub diferencia_final: Money,
    #[serde(default)]
    pub closure_confirmed: bool,
    #[serde(default, deserialize_with = "null_as_pending")]
    pub encargada_status: ReviewStatus,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgencyReviewSummary {
    pub agency_id: Uuid,
    pub total_closures: usize,
    pub confirmed: usize,
    pub balanced: usize,
    pub unbalanced: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    /// Sum of the final discrepancies.
    pub total_diferencia: Money,
}

/// Counts closures per agency, sorted by agency id.
pub fn summarize_reviews(
    closures: &[CashierClosure],
    classifier: &BalanceClassifier,
) -> ResultEngine<Vec<AgencyReviewSummary>> {
    let mut by_agency: BTreeMap<Uuid, AgencyReviewSummary> = BTreeMap::new();
    for closure in closures {
        let entry = by_agency
            .entry(closure.agency_id)
            .or_insert_with(|| AgencyReviewSummary {
                agency_id: closure.agency_id,
                ..Default::default()
            });
        entry.total_closures += 1;
        if closure.closure_confirmed {
            entry.confirmed += 1;
        }
        if classifier.classify(closure.diferencia_final).is_balanced() {
            entry.balanced += 1;
        } else {
            entry.unbalanced += 1;
        }
        match closure.encargada_status {
            ReviewStatus::Pendiente => entry.pending += 1,
            ReviewStatus::Aprobado => entry.approved += 1,
            ReviewStatus::Rechazado => entry.rejected += 1,
        }
        entry.total_diferencia = entry
            .total_diferencia
            .try_add(closure.diferencia_final, "review discrepancies")?;
    }
    Ok(by_agency.into_values().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_status_means_pending() {
        let raw = r#"{
            "session_id": "00000000-0000-0000-0000-000000000001",
            "agency_id": "00000000-0000-0000-0000-000000000002",
            "session_date": "2025-03-10",
            "diferencia_final": -150.25,
            "encargada_status": null
        }"#;
        let closure: CashierClosure = serde_json::from_str(raw).unwrap();
        assert_eq!(closure.encargada_status, ReviewStatus::Pendiente);
        assert_eq!(closure.diferencia_final, Money::new(-15_025));
    }

    #[test]
    fn counts_per_agency() {
        let agency = Uuid::from_u128(5);
        let make = |cents, confirmed, status| CashierClosure {
            session_id: Uuid::new_v4(),
            user_id: None,
            agency_id: agency,
            session_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            diferencia_final: Money::new(cents),
            closure_confirmed: confirmed,
            encargada_status: status,
        };
        let stats = summarize_reviews(
            &[
                make(10_000, true, ReviewStatus::Aprobado),
                make(-10_001, true, ReviewStatus::Rechazado),
                make(0, false, ReviewStatus::Pendiente),
            ],
            &BalanceClassifier::default(),
        )
        .unwrap();
        assert_eq!(stats.len(), 1);
        let s = stats[0];
        assert_eq!((s.total_closures, s.confirmed), (3, 2));
        assert_eq!((s.balanced, s.unbalanced), (2, 1));
        assert_eq!((s.pending, s.approved, s.rejected), (1, 1, 1));
        assert_eq!(s.total_diferencia, Money::new(-1));
        assert_eq!(ReviewStatus::try_from("aprobado").unwrap().as_str(), "aprobado");
    }
}
