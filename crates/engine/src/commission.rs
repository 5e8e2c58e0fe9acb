//! Commission and participation split per lottery system ("banqueo").
//!
//! For each system and currency:
//!
//! ```text
//! cuadre        = sales - prizes
//! commission    = sales * commission% / 100
//! subtotal      = cuadre - commission
//! participation = subtotal * participation% / 100
//! final_total   = subtotal - participation
//! ```
//!
//! Bolívars use `commission_percentage`, dollars `commission_percentage_usd`.
//! The participation percentage is shared by every system of the run.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Currency, EngineWarning, Money, MoneyAmount, Percentage, ResultEngine, SystemsSummary,
    error::push_unique,
};

/// Sales and prizes of one lottery system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemSales {
    pub lottery_system_id: Uuid,
    #[serde(default)]
    pub sales: MoneyAmount,
    #[serde(default)]
    pub prizes: MoneyAmount,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionRate {
    pub lottery_system_id: Uuid,
    #[serde(default)]
    pub commission_percentage: Percentage,
    #[serde(default)]
    pub commission_percentage_usd: Percentage,
}

impl CommissionRate {
    /// The commission applied to amounts in `currency`, checked to be within
    /// 0..=100.
    pub fn commission(&self, currency: Currency) -> ResultEngine<Percentage> {
        match currency {
            Currency::Ves => self
                .commission_percentage
                .validated("commission percentage"),
            Currency::Usd => self
                .commission_percentage_usd
                .validated("commission percentage usd"),
        }
    }

    /// Both commissions, bolívars first.
    pub(crate) fn commissions(&self) -> ResultEngine<(Percentage, Percentage)> {
        Ok((
            self.commission(Currency::Ves)?,
            self.commission(Currency::Usd)?,
        ))
    }
}

/// Commission rates indexed by lottery system. Later entries win.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommissionRates {
    by_system: HashMap<Uuid, CommissionRate>,
}

impl CommissionRates {
    #[must_use]
    pub fn get(&self, lottery_system_id: Uuid) -> Option<&CommissionRate> {
        self.by_system.get(&lottery_system_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_system.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_system.is_empty()
    }
}

impl FromIterator<CommissionRate> for CommissionRates {
    fn from_iter<I: IntoIterator<Item = CommissionRate>>(iter: I) -> Self {
        Self {
            by_system: iter
                .into_iter()
                .map(|rate| (rate.lottery_system_id, rate))
                .collect(),
        }
    }
}

/// One currency's split.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionSplit {
    pub sales: Money,
    pub prizes: Money,
    pub cuadre: Money,
    pub commission: Money,
    pub subtotal: Money,
    pub participation: Money,
    pub final_total: Money,
}

impl CommissionSplit {
    /// Applies the formulas to one currency.
    pub fn compute(
        sales: Money,
        prizes: Money,
        commission_percentage: Percentage,
        participation_percentage: Percentage,
    ) -> ResultEngine<Self> {
        let cuadre = sales.try_sub(prizes, "cuadre")?;
        let commission = sales.percent(commission_percentage)?;
        let subtotal = cuadre.try_sub(commission, "subtotal")?;
        let participation = subtotal.percent(participation_percentage)?;
        let final_total = subtotal.try_sub(participation, "final total")?;
        Ok(Self {
            sales,
            prizes,
            cuadre,
            commission,
            subtotal,
            participation,
            final_total,
        })
    }

    /// What the house earns: `cuadre + commission + participation`.
    pub fn profit_by_banqueo(&self) -> ResultEngine<Money> {
        self.cuadre
            .try_add(self.commission, "profit by banqueo")?
            .try_add(self.participation, "profit by banqueo")
    }

    fn accumulate(&mut self, other: &CommissionSplit) -> ResultEngine<()> {
        const WHAT: &str = "commission totals";
        self.sales = self.sales.try_add(other.sales, WHAT)?;
        self.prizes = self.prizes.try_add(other.prizes, WHAT)?;
        self.cuadre = self.cuadre.try_add(other.cuadre, WHAT)?;
        self.commission = self.commission.try_add(other.commission, WHAT)?;
        self.subtotal = self.subtotal.try_add(other.subtotal, WHAT)?;
        self.participation = self.participation.try_add(other.participation, WHAT)?;
        self.final_total = self.final_total.try_add(other.final_total, WHAT)?;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemCommission {
    pub lottery_system_id: Uuid,
    pub commission_percentage: Percentage,
    pub commission_percentage_usd: Percentage,
    pub bs: CommissionSplit,
    pub usd: CommissionSplit,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionRunResult {
    pub participation_percentage: Percentage,
    /// Systems with activity, in input order of first appearance.
    pub systems: Vec<SystemCommission>,
    pub totals_bs: CommissionSplit,
    pub totals_usd: CommissionSplit,
    pub warnings: Vec<EngineWarning>,
}

impl CommissionRunResult {
    pub fn profit_by_banqueo_bs(&self) -> ResultEngine<Money> {
        self.totals_bs.profit_by_banqueo()
    }

    pub fn profit_by_banqueo_usd(&self) -> ResultEngine<Money> {
        self.totals_usd.profit_by_banqueo()
    }
}

/// Runs the banqueo split over `rows`.
///
/// Rows sharing a system id are summed first. Systems without any sales or
/// prizes are left out of `systems`; a missing rate means 0 % and raises an
/// [`EngineWarning::UnknownSystemCommission`].
pub fn compute_commission_run(
    rows: &[SystemSales],
    rates: &CommissionRates,
    participation_percentage: Percentage,
) -> ResultEngine<CommissionRunResult> {
    let participation_percentage = participation_percentage.validated("participation percentage")?;

    let mut order = Vec::new();
    let mut merged: HashMap<Uuid, (MoneyAmount, MoneyAmount)> = HashMap::new();
    for row in rows {
        let (sales, prizes) = merged.entry(row.lottery_system_id).or_insert_with(|| {
            order.push(row.lottery_system_id);
            (MoneyAmount::ZERO, MoneyAmount::ZERO)
        });
        *sales = sales.try_add(row.sales, "system sales")?;
        *prizes = prizes.try_add(row.prizes, "system prizes")?;
    }

    let mut result = CommissionRunResult {
        participation_percentage,
        systems: Vec::new(),
        totals_bs: CommissionSplit::default(),
        totals_usd: CommissionSplit::default(),
        warnings: Vec::new(),
    };

    for id in order {
        let Some(&(sales, prizes)) = merged.get(&id) else {
            continue;
        };
        if sales.is_zero() && prizes.is_zero() {
            continue;
        }

        let (pct_bs, pct_usd) = match rates.get(id) {
            Some(rate) => rate.commissions()?,
            None => {
                push_unique(
                    &mut result.warnings,
                    EngineWarning::UnknownSystemCommission {
                        lottery_system_id: id,
                    },
                );
                (Percentage::ZERO, Percentage::ZERO)
            }
        };

        let bs = CommissionSplit::compute(sales.bs, prizes.bs, pct_bs, participation_percentage)?;
        let usd =
            CommissionSplit::compute(sales.usd, prizes.usd, pct_usd, participation_percentage)?;
        result.totals_bs.accumulate(&bs)?;
        result.totals_usd.accumulate(&usd)?;
        result.systems.push(SystemCommission {
            lottery_system_id: id,
            commission_percentage: pct_bs,
            commission_percentage_usd: pct_usd,
            bs,
            usd,
        });
    }

    Ok(result)
}

/// Commission owed per grouped system, over every agency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemCommissionRow {
    pub system_id: Uuid,
    pub name: String,
    pub code: String,
    pub sales: MoneyAmount,
    pub prizes: MoneyAmount,
    pub net: MoneyAmount,
    pub commission_percentage: Percentage,
    pub commission_percentage_usd: Percentage,
    /// `net * percentage / 100` per currency.
    pub total: MoneyAmount,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemCommissionSummary {
    pub rows: Vec<SystemCommissionRow>,
    pub total_sales: MoneyAmount,
    pub total_prizes: MoneyAmount,
    pub total_net: MoneyAmount,
    pub total_commission: MoneyAmount,
    pub warnings: Vec<EngineWarning>,
}

/// Applies each grouped system's rate to its net result.
pub fn summarize_system_commissions(
    summary: &SystemsSummary,
    rates: &CommissionRates,
) -> ResultEngine<SystemCommissionSummary> {
    let mut out = SystemCommissionSummary {
        warnings: summary.warnings.clone(),
        ..Default::default()
    };

    for row in &summary.rows {
        let net = row.sales.try_sub(row.prizes, "system net")?;
        let (pct_bs, pct_usd) = match rates.get(row.system_id) {
            Some(rate) => rate.commissions()?,
            None => {
                push_unique(
                    &mut out.warnings,
                    EngineWarning::UnknownSystemCommission {
                        lottery_system_id: row.system_id,
                    },
                );
                (Percentage::ZERO, Percentage::ZERO)
            }
        };
        let total = MoneyAmount::new(net.bs.percent(pct_bs)?, net.usd.percent(pct_usd)?);

        out.total_sales = out.total_sales.try_add(row.sales, "total sales")?;
        out.total_prizes = out.total_prizes.try_add(row.prizes, "total prizes")?;
        out.total_net = out.total_net.try_add(net, "total net")?;
        out.total_commission = out.total_commission.try_add(total, "total commission")?;
        out.rows.push(SystemCommissionRow {
            system_id: row.system_id,
            name: row.name.clone(),
            code: row.code.clone(),
            sales: row.sales,
            prizes: row.prizes,
            net,
            commission_percentage: pct_bs,
            commission_percentage_usd: pct_usd,
            total,
        });
    }

    Ok(out)
}

/// Sums per-system figures by id, keeping ids ordered.
pub(crate) fn sum_by_system(rows: &[SystemSales]) -> ResultEngine<BTreeMap<Uuid, SystemSales>> {
    let mut by_system: BTreeMap<Uuid, SystemSales> = BTreeMap::new();
    for row in rows {
        let entry = by_system
            .entry(row.lottery_system_id)
            .or_insert_with(|| SystemSales {
                lottery_system_id: row.lottery_system_id,
                sales: MoneyAmount::ZERO,
                prizes: MoneyAmount::ZERO,
            });
        entry.sales = entry.sales.try_add(row.sales, "system sales")?;
        entry.prizes = entry.prizes.try_add(row.prizes, "system prizes")?;
    }
    Ok(by_system)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineError;

    fn pct(units: i64) -> Percentage {
        Percentage::from_units(units)
    }

    fn bs_row(id: Uuid, sales: i64, prizes: i64) -> SystemSales {
        SystemSales {
            lottery_system_id: id,
            sales: MoneyAmount::new(Money::from_units(sales), Money::ZERO),
            prizes: MoneyAmount::new(Money::from_units(prizes), Money::ZERO),
        }
    }

    fn rate(id: Uuid, bs: i64, usd: i64) -> CommissionRate {
        CommissionRate {
            lottery_system_id: id,
            commission_percentage: pct(bs),
            commission_percentage_usd: pct(usd),
        }
    }

    #[test]
    fn split_formula() {
        let split = CommissionSplit::compute(
            Money::from_units(1000),
            Money::from_units(400),
            pct(10),
            pct(20),
        )
        .unwrap();
        assert_eq!(split.cuadre, Money::from_units(600));
        assert_eq!(split.commission, Money::from_units(100));
        assert_eq!(split.subtotal, Money::from_units(500));
        assert_eq!(split.participation, Money::from_units(100));
        assert_eq!(split.final_total, Money::from_units(400));
        assert_eq!(split.profit_by_banqueo().unwrap(), Money::from_units(800));
    }

    #[test]
    fn duplicate_rows_are_summed_and_zero_rows_dropped() {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        let rates: CommissionRates = [rate(a, 10, 5), rate(b, 10, 5)].into_iter().collect();
        let run = compute_commission_run(
            &[bs_row(a, 600, 100), bs_row(b, 0, 0), bs_row(a, 400, 300)],
            &rates,
            pct(20),
        )
        .unwrap();
        assert_eq!(run.systems.len(), 1);
        assert_eq!(run.systems[0].bs.final_total, Money::from_units(400));
        assert_eq!(run.totals_bs.final_total, Money::from_units(400));
        assert!(run.warnings.is_empty());
    }

    #[test]
    fn missing_rate_warns_once() {
        let a = Uuid::from_u128(7);
        let run = compute_commission_run(
            &[bs_row(a, 100, 0), bs_row(a, 50, 0)],
            &CommissionRates::default(),
            Percentage::ZERO,
        )
        .unwrap();
        assert_eq!(
            run.warnings,
            vec![EngineWarning::UnknownSystemCommission { lottery_system_id: a }]
        );
        assert_eq!(run.totals_bs.commission, Money::ZERO);
        assert_eq!(run.totals_bs.final_total, Money::from_units(150));
    }

    #[test]
    fn out_of_range_percentages_are_rejected() {
        let a = Uuid::from_u128(3);
        let err = compute_commission_run(&[], &CommissionRates::default(), pct(101)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidPercentage(_)));
        let rates: CommissionRates = [rate(a, -1, 0)].into_iter().collect();
        let err = compute_commission_run(&[bs_row(a, 1, 0)], &rates, pct(0)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidPercentage(_)));
    }

    fn grouped(id: Uuid, sales: i64) -> SystemsSummary {
        SystemsSummary {
            rows: vec![crate::SystemsSummaryRow {
                system_id: id,
                name: "Lotto".to_string(),
                code: "LT".to_string(),
                has_sublevels: false,
                sales: MoneyAmount::new(Money::from_units(sales), Money::ZERO),
                prizes: MoneyAmount::ZERO,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn system_summary_rejects_negative_rate() {
        let a = Uuid::from_u128(4);
        let rates: CommissionRates = [rate(a, -5, 0)].into_iter().collect();
        let err = summarize_system_commissions(&grouped(a, 100), &rates).unwrap_err();
        assert!(matches!(err, EngineError::InvalidPercentage(_)));
    }

    #[test]
    fn system_summary_rejects_rate_over_hundred() {
        let a = Uuid::from_u128(4);
        let rates: CommissionRates = [rate(a, 10, 150)].into_iter().collect();
        let err = summarize_system_commissions(&grouped(a, 100), &rates).unwrap_err();
        assert!(matches!(err, EngineError::InvalidPercentage(_)));
    }

    #[test]
    fn commission_per_currency() {
        let r = rate(Uuid::nil(), 10, 5);
        assert_eq!(r.commission(Currency::Ves).unwrap(), pct(10));
        assert_eq!(r.commission(Currency::Usd).unwrap(), pct(5));
        let bad = rate(Uuid::nil(), 10, -1);
        assert!(r.commission(Currency::Usd).is_ok());
        assert!(bad.commission(Currency::Usd).is_err());
    }
}
