//! Lottery systems and the parent roll-up used by the summary tables.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineWarning, MoneyAmount, ResultEngine, SystemSales, commission::sum_by_system,
    error::push_unique,
};

/// A lottery system. Systems form a two-level tree: sub-games such as parley
/// or horse racing point to their parent through `parent_system_id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotterySystem {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub parent_system_id: Option<Uuid>,
    #[serde(default)]
    pub has_subcategories: bool,
}

impl LotterySystem {
    /// Id of the row this system is summarized under.
    #[must_use]
    pub fn group_id(&self) -> Uuid {
        self.parent_system_id.unwrap_or(self.id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemsSummaryRow {
    pub system_id: Uuid,
    pub name: String,
    pub code: String,
    pub has_sublevels: bool,
    pub sales: MoneyAmount,
    pub prizes: MoneyAmount,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemsSummary {
    pub rows: Vec<SystemsSummaryRow>,
    pub total_sales: MoneyAmount,
    pub total_prizes: MoneyAmount,
    pub warnings: Vec<EngineWarning>,
}

/// Groups per-system figures under their root system.
///
/// Totals equal the sum of the input. Rows with no sales and no prizes are
/// dropped; an id missing from `systems` keeps a row of its own, named after
/// the id, and raises [`EngineWarning::UnknownSystem`].
pub fn group_systems(
    figures: &[SystemSales],
    systems: &[LotterySystem],
) -> ResultEngine<SystemsSummary> {
    let by_id: HashMap<Uuid, &LotterySystem> = systems.iter().map(|s| (s.id, s)).collect();
    let parents: HashSet<Uuid> = systems.iter().filter_map(|s| s.parent_system_id).collect();
    let mut grouped: HashMap<Uuid, SystemsSummaryRow> = HashMap::new();
    let mut summary = SystemsSummary::default();

    for (id, row) in sum_by_system(figures)? {
        let (key, name, code, sublevels) = match by_id.get(&id).copied() {
            Some(system) => {
                let key = system.group_id();
                let parent = by_id.get(&key).copied().unwrap_or(system);
                (
                    key,
                    parent.name.clone(),
                    parent.code.clone(),
                    parents.contains(&key)
                        || system.has_subcategories
                        || parent.has_subcategories,
                )
            }
            None => {
                push_unique(
                    &mut summary.warnings,
                    EngineWarning::UnknownSystem {
                        lottery_system_id: id,
                    },
                );
                (id, id.to_string(), String::new(), false)
            }
        };

        let entry = grouped.entry(key).or_insert_with(|| SystemsSummaryRow {
            system_id: key,
            name,
            code,
            has_sublevels: false,
            sales: MoneyAmount::ZERO,
            prizes: MoneyAmount::ZERO,
        });
        entry.has_sublevels |= sublevels;
        entry.sales = entry.sales.try_add(row.sales, "grouped sales")?;
        entry.prizes = entry.prizes.try_add(row.prizes, "grouped prizes")?;

        summary.total_sales = summary.total_sales.try_add(row.sales, "total sales")?;
        summary.total_prizes = summary.total_prizes.try_add(row.prizes, "total prizes")?;
    }

    summary.rows = grouped
        .into_values()
        .filter(|row| !(row.sales.is_zero() && row.prizes.is_zero()))
        .collect();
    summary.rows.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.system_id.cmp(&b.system_id))
    });

    Ok(summary)
}
