//! Netting of debts between agencies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Money, MoneyAmount, ResultEngine, money::null_as_zero};

/// What one agency owes another.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterAgencyDebt {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub debtor_agency_id: Uuid,
    pub creditor_agency_id: Uuid,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub total_debt_bs: Money,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub total_debt_usd: Money,
}

impl InterAgencyDebt {
    #[must_use]
    pub const fn amount(&self) -> MoneyAmount {
        MoneyAmount::new(self.total_debt_bs, self.total_debt_usd)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgencyDebtBalance {
    pub agency_id: Uuid,
    /// Owed to the agency by others.
    pub total_owed: MoneyAmount,
    /// Owed by the agency to others.
    pub total_owing: MoneyAmount,
    /// `total_owed - total_owing`; negative when the agency is a net debtor.
    pub net_balance: MoneyAmount,
}

/// Per-agency debt position over every recorded debt.
///
/// Agencies with nothing owed either way are left out. Rows are sorted by the
/// size of the bolívar balance, largest first, then by agency id.
pub fn net_inter_agency_debts(debts: &[InterAgencyDebt]) -> ResultEngine<Vec<AgencyDebtBalance>> {
    let mut by_agency: BTreeMap<Uuid, (MoneyAmount, MoneyAmount)> = BTreeMap::new();
    for debt in debts {
        let amount = debt.amount().ensure_non_negative("inter-agency debt")?;

        let (_, owing) = by_agency.entry(debt.debtor_agency_id).or_default();
        *owing = owing.try_add(amount, "debts owing")?;
        let (owed, _) = by_agency.entry(debt.creditor_agency_id).or_default();
        *owed = owed.try_add(amount, "debts owed")?;
    }

    let mut out = Vec::with_capacity(by_agency.len());
    for (agency_id, (total_owed, total_owing)) in by_agency {
        if total_owed.is_zero() && total_owing.is_zero() {
            continue;
        }
        out.push(AgencyDebtBalance {
            agency_id,
            total_owed,
            total_owing,
            net_balance: total_owed.try_sub(total_owing, "net debt balance")?,
        });
    }
    // stable sort keeps agency id order between equal balances
    out.sort_by(|a, b| {
        b.net_balance
            .bs
            .cents()
            .unsigned_abs()
            .cmp(&a.net_balance.bs.cents().unsigned_abs())
    });
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineError;

    fn debt(debtor: u128, creditor: u128, bs: i64, usd: i64) -> InterAgencyDebt {
        InterAgencyDebt {
            id: None,
            debtor_agency_id: Uuid::from_u128(debtor),
            creditor_agency_id: Uuid::from_u128(creditor),
            total_debt_bs: Money::from_units(bs),
            total_debt_usd: Money::from_units(usd),
        }
    }

    #[test]
    fn balances_net_owed_against_owing() {
        let rows = net_inter_agency_debts(&[
            debt(1, 2, 1000, 10),
            debt(2, 3, 300, 0),
            debt(3, 1, 100, 5),
        ])
        .unwrap();
        assert_eq!(rows.len(), 3);

        // agency 1: owes 1000/10, is owed 100/5
        let first = rows[0];
        assert_eq!(first.agency_id, Uuid::from_u128(1));
        assert_eq!(first.net_balance.bs, Money::from_units(-900));
        assert_eq!(first.net_balance.usd, Money::from_units(-5));

        let second = rows[1];
        assert_eq!(second.agency_id, Uuid::from_u128(2));
        assert_eq!(second.total_owed.bs, Money::from_units(1000));
        assert_eq!(second.total_owing.bs, Money::from_units(300));
        assert_eq!(second.net_balance.bs, Money::from_units(700));

        assert_eq!(rows[2].net_balance.bs, Money::from_units(200));
    }

    #[test]
    fn settled_agencies_are_dropped() {
        let rows = net_inter_agency_debts(&[debt(1, 2, 0, 0), debt(3, 4, 50, 0)]).unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.agency_id).collect();
        assert_eq!(ids, [Uuid::from_u128(3), Uuid::from_u128(4)]);
    }

    #[test]
    fn usd_only_debt_is_kept() {
        let rows = net_inter_agency_debts(&[debt(1, 2, 0, 20)]).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.net_balance.bs.is_zero()));
    }

    #[test]
    fn negative_debt_is_rejected() {
        let err = net_inter_agency_debts(&[debt(1, 2, -1, 0)]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }
}
