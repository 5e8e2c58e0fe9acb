//! Profit ("ganancias") over a set of agency weeks.
//!
//! Gross profit is the commission earned on sales; operational expenses and
//! the fixed expenses of the period are then subtracted.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    AgencyWeeklySummary, CommissionRates, EngineWarning, Money, MoneyAmount, ResultEngine,
    error::push_unique, money::null_as_zero,
};

/// Group name used for agencies missing from the group mapping.
pub const UNGROUPED: &str = "ungrouped";

/// A recurring cost of the business (rent, bank fees, salaries).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedExpense {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub amount_bs: Money,
    pub expense_date: NaiveDate,
    /// Agency group charged with the expense. `None` counts only in the
    /// overall report.
    #[serde(default)]
    pub group: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedExpenseTotal {
    pub category: String,
    pub amount_bs: Money,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitReport {
    /// Commission earned on sales, per currency.
    pub gross: MoneyAmount,
    pub operational_expenses: MoneyAmount,
    pub net: MoneyAmount,
    pub fixed_expenses_bs: Money,
    /// `net.bs - fixed_expenses_bs`.
    pub final_bs: Money,
    /// Sorted by category.
    pub fixed_by_category: Vec<FixedExpenseTotal>,
    pub warnings: Vec<EngineWarning>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupProfit {
    pub group: String,
    pub agencies: Vec<Uuid>,
    pub report: ProfitReport,
}

/// Profit over `summaries`, charging every fixed expense given.
///
/// Systems without a commission rate earn nothing and raise an
/// [`EngineWarning::UnknownSystemCommission`].
pub fn compute_profit(
    summaries: &[AgencyWeeklySummary],
    rates: &CommissionRates,
    fixed_expenses: &[FixedExpense],
) -> ResultEngine<ProfitReport> {
    let summaries: Vec<&AgencyWeeklySummary> = summaries.iter().collect();
    let fixed: Vec<&FixedExpense> = fixed_expenses.iter().collect();
    profit_of(&summaries, rates, &fixed)
}

/// Profit per agency group, sorted by group name.
///
/// `groups` maps agencies to group names; unmapped agencies fall under
/// [`UNGROUPED`]. A fixed expense is charged to the group it names.
pub fn compute_group_profit(
    summaries: &[AgencyWeeklySummary],
    groups: &HashMap<Uuid, String>,
    rates: &CommissionRates,
    fixed_expenses: &[FixedExpense],
) -> ResultEngine<Vec<GroupProfit>> {
    let mut by_group: BTreeMap<&str, Vec<&AgencyWeeklySummary>> = BTreeMap::new();
    for summary in summaries {
        let group = groups
            .get(&summary.agency_id)
            .map_or(UNGROUPED, String::as_str);
        by_group.entry(group).or_default().push(summary);
    }

    let mut out = Vec::with_capacity(by_group.len());
    for (group, members) in by_group {
        let fixed: Vec<&FixedExpense> = fixed_expenses
            .iter()
            .filter(|e| e.group.as_deref() == Some(group))
            .collect();
        let report = profit_of(&members, rates, &fixed)?;
        let mut agencies: Vec<Uuid> = members.iter().map(|s| s.agency_id).collect();
        agencies.sort();
        agencies.dedup();
        out.push(GroupProfit {
            group: group.to_string(),
            agencies,
            report,
        });
    }
    Ok(out)
}

fn profit_of(
    summaries: &[&AgencyWeeklySummary],
    rates: &CommissionRates,
    fixed_expenses: &[&FixedExpense],
) -> ResultEngine<ProfitReport> {
    let mut report = ProfitReport::default();

    for summary in summaries {
        for system in &summary.systems {
            let Some(rate) = rates.get(system.lottery_system_id) else {
                push_unique(
                    &mut report.warnings,
                    EngineWarning::UnknownSystemCommission {
                        lottery_system_id: system.lottery_system_id,
                    },
                );
                continue;
            };
            let (pct_bs, pct_usd) = rate.commissions()?;
            let earned = MoneyAmount::new(
                system.sales.bs.percent(pct_bs)?,
                system.sales.usd.percent(pct_usd)?,
            );
            report.gross = report.gross.try_add(earned, "gross profit")?;
        }
        report.operational_expenses = report
            .operational_expenses
            .try_add(summary.expenses.operational, "operational expenses")?;
    }
    report.net = report
        .gross
        .try_sub(report.operational_expenses, "net profit")?;

    let mut by_category: BTreeMap<&str, Money> = BTreeMap::new();
    for expense in fixed_expenses {
        let total = by_category.entry(expense.category.as_str()).or_default();
        *total = total.try_add(expense.amount_bs, "fixed expenses")?;
        report.fixed_expenses_bs = report
            .fixed_expenses_bs
            .try_add(expense.amount_bs, "fixed expenses")?;
    }
    report.fixed_by_category = by_category
        .into_iter()
        .map(|(category, amount_bs)| FixedExpenseTotal {
            category: category.to_string(),
            amount_bs,
        })
        .collect();
    report.final_bs = report
        .net
        .bs
        .try_sub(report.fixed_expenses_bs, "final profit")?;

    Ok(report)
}
