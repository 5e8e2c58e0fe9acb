//! Weekly agency roll-up and the weekly closure.
//!
//! Weeks run Monday to Sunday. The weekly closure nets the week's sales and
//! prizes against the cash counted at the end of the week, the bank balance,
//! expenses, debts and the USD excess converted at the Sunday rate.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    BalanceClassifier, Classification, EngineError, Expense, ExpenseSplit, ExchangeRate,
    FieldInput, FieldSource, LotterySystem, Money, MoneyAmount, ResultEngine,
    money::null_as_zero,
};

/// A Monday-to-Sunday week.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WeekBoundaries {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekBoundaries {
    /// The week containing `date`. `None` only at the edges of the calendar.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Option<Self> {
        let offset = u64::from(date.weekday().num_days_from_monday());
        let start = date.checked_sub_days(Days::new(offset))?;
        let end = start.checked_add_days(Days::new(6))?;
        Some(Self { start, end })
    }

    #[must_use]
    pub fn previous(&self) -> Option<Self> {
        Self::containing(self.start.checked_sub_days(Days::new(7))?)
    }

    #[must_use]
    pub fn next(&self) -> Option<Self> {
        Self::containing(self.start.checked_add_days(Days::new(7))?)
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.start..=self.end).contains(&date)
    }
}

/// Sales and prizes of one system, in one agency, on one day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySystemFigures {
    pub agency_id: Uuid,
    pub transaction_date: NaiveDate,
    pub lottery_system_id: Uuid,
    #[serde(default)]
    pub sales: MoneyAmount,
    #[serde(default)]
    pub prizes: MoneyAmount,
}

/// A stored daily closure summary.
///
/// Records without a `session_id` are the supervisor's agency-level entries;
/// only those feed the weekly figures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyClosureRecord {
    #[serde(default)]
    pub session_id: Option<Uuid>,
    #[serde(default)]
    pub agency_id: Option<Uuid>,
    pub session_date: NaiveDate,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub total_banco_bs: Money,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub pending_prizes: Money,
    #[serde(default)]
    pub exchange_rate: Option<ExchangeRate>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DailyClosureRecord {
    fn last_touched(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySystemTotals {
    pub lottery_system_id: Uuid,
    pub name: String,
    pub sales: MoneyAmount,
    pub prizes: MoneyAmount,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgencyWeeklySummary {
    pub agency_id: Uuid,
    pub week: WeekBoundaries,
    /// Sorted by system name.
    pub systems: Vec<WeeklySystemTotals>,
    pub total_sales: MoneyAmount,
    pub total_prizes: MoneyAmount,
    pub expenses: ExpenseSplit,
    pub total_banco_bs: Money,
    pub premios_por_pagar_bs: Money,
    /// Rate of the closure dated on the week's Sunday, if any.
    pub sunday_exchange_rate: Option<ExchangeRate>,
    pub closure_days: usize,
}

/// Builds an agency's weekly figures from daily records.
///
/// Records for other agencies or outside `week` are ignored. When several
/// closures exist for the same day, the most recently updated one counts.
pub fn summarize_agency_week(
    agency_id: Uuid,
    week: WeekBoundaries,
    details: &[DailySystemFigures],
    expenses: &[Expense],
    closures: &[DailyClosureRecord],
    systems: &[LotterySystem],
) -> ResultEngine<AgencyWeeklySummary> {
    let names: HashMap<Uuid, &str> = systems.iter().map(|s| (s.id, s.name.as_str())).collect();

    let mut per_system: HashMap<Uuid, (MoneyAmount, MoneyAmount)> = HashMap::new();
    let mut total_sales = MoneyAmount::ZERO;
    let mut total_prizes = MoneyAmount::ZERO;
    for detail in details
        .iter()
        .filter(|d| d.agency_id == agency_id && week.contains(d.transaction_date))
    {
        let sales = detail.sales.ensure_non_negative("weekly sales")?;
        let prizes = detail.prizes.ensure_non_negative("weekly prizes")?;
        let (s, p) = per_system
            .entry(detail.lottery_system_id)
            .or_insert((MoneyAmount::ZERO, MoneyAmount::ZERO));
        *s = s.try_add(sales, "weekly system sales")?;
        *p = p.try_add(prizes, "weekly system prizes")?;
        total_sales = total_sales.try_add(sales, "weekly sales")?;
        total_prizes = total_prizes.try_add(prizes, "weekly prizes")?;
    }

    let mut systems_out: Vec<WeeklySystemTotals> = per_system
        .into_iter()
        .map(|(id, (sales, prizes))| WeeklySystemTotals {
            lottery_system_id: id,
            name: names
                .get(&id)
                .map_or_else(|| id.to_string(), |name| (*name).to_string()),
            sales,
            prizes,
        })
        .collect();
    systems_out.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.lottery_system_id.cmp(&b.lottery_system_id))
    });

    let mut split = ExpenseSplit::default();
    for expense in expenses.iter().filter(|e| {
        e.scope.agency_id == Some(agency_id) && week.contains(e.scope.transaction_date)
    }) {
        split.add(expense)?;
    }

    let mut latest: BTreeMap<NaiveDate, &DailyClosureRecord> = BTreeMap::new();
    for record in closures.iter().filter(|c| {
        c.session_id.is_none() && c.agency_id == Some(agency_id) && week.contains(c.session_date)
    }) {
        latest
            .entry(record.session_date)
            .and_modify(|current| {
                if record.last_touched() > current.last_touched() {
                    *current = record;
                }
            })
            .or_insert(record);
    }

    let mut total_banco_bs = Money::ZERO;
    let mut premios_por_pagar_bs = Money::ZERO;
    for record in latest.values() {
        total_banco_bs = total_banco_bs.try_add(record.total_banco_bs, "weekly banco")?;
        premios_por_pagar_bs =
            premios_por_pagar_bs.try_add(record.pending_prizes, "weekly pending prizes")?;
    }
    let sunday_exchange_rate = latest.get(&week.end).and_then(|r| r.exchange_rate);

    Ok(AgencyWeeklySummary {
        agency_id,
        week,
        systems: systems_out,
        total_sales,
        total_prizes,
        expenses: split,
        total_banco_bs,
        premios_por_pagar_bs,
        sunday_exchange_rate,
        closure_days: latest.len(),
    })
}

/// End-of-week figures declared by the supervisor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyClosureInput {
    #[serde(default)]
    pub cash_available: MoneyAmount,
    /// Falls back to the summary's Sunday rate when absent.
    #[serde(default)]
    pub exchange_rate: Option<ExchangeRate>,
    /// Adjustments the supervisor adds on top of the counted cash.
    #[serde(default)]
    pub additional_amount: MoneyAmount,
    /// Whether the USD excess counts in the bolívar sumatoria. On unless
    /// turned off.
    #[serde(default = "apply_excess_usd_default")]
    pub apply_excess_usd: bool,
    #[serde(default)]
    pub total_banco_bs: FieldInput<Money>,
    #[serde(default)]
    pub premios_por_pagar_bs: FieldInput<Money>,
}

const fn apply_excess_usd_default() -> bool {
    true
}

impl Default for WeeklyClosureInput {
    fn default() -> Self {
        Self {
            cash_available: MoneyAmount::ZERO,
            exchange_rate: None,
            additional_amount: MoneyAmount::ZERO,
            apply_excess_usd: apply_excess_usd_default(),
            total_banco_bs: FieldInput::Unset,
            premios_por_pagar_bs: FieldInput::Unset,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyClosureReport {
    pub week: WeekBoundaries,
    pub exchange_rate: ExchangeRate,
    pub cuadre: MoneyAmount,
    pub sumatoria_usd: Money,
    pub diferencia_inicial_usd: Money,
    pub excess_usd: Money,
    pub excess_usd_in_bs: Money,
    pub total_banco_bs: Money,
    pub total_banco_source: FieldSource,
    pub sumatoria_bs: Money,
    pub diferencia_cierre: Money,
    pub premios_por_pagar_bs: Money,
    pub premios_por_pagar_source: FieldSource,
    pub diferencia_final: Money,
    pub classification: Classification,
}

/// Computes the weekly closure of an agency.
///
/// ```text
/// sumatoria_usd          = cash_usd + debts_usd + expenses_usd
/// diferencia_inicial_usd = sumatoria_usd - cuadre_usd
/// excess_usd             = diferencia_inicial_usd - additional_usd
/// sumatoria_bs           = cash_bs + banco + debts_bs + expenses_bs
///                          + excess_usd * rate (when applied) + additional_bs
/// diferencia_cierre      = sumatoria_bs - cuadre_bs
/// diferencia_final       = diferencia_cierre - premios_por_pagar_bs
/// ```
pub fn compute_weekly_closure(
    summary: &AgencyWeeklySummary,
    input: &WeeklyClosureInput,
    classifier: &BalanceClassifier,
) -> ResultEngine<WeeklyClosureReport> {
    let rate = input
        .exchange_rate
        .or(summary.sunday_exchange_rate)
        .ok_or_else(|| {
            EngineError::InvalidRate(format!(
                "no exchange rate for the week starting {}",
                summary.week.start
            ))
        })?
        .validated()?;

    let cuadre = summary
        .total_sales
        .try_sub(summary.total_prizes, "weekly cuadre")?;
    let expenses = summary.expenses;

    let sumatoria_usd = input
        .cash_available
        .usd
        .try_add(expenses.debt.usd, "sumatoria usd")?
        .try_add(expenses.operational.usd, "sumatoria usd")?;
    let diferencia_inicial_usd = sumatoria_usd.try_sub(cuadre.usd, "diferencia inicial usd")?;
    let excess_usd =
        diferencia_inicial_usd.try_sub(input.additional_amount.usd, "weekly excess usd")?;
    let excess_usd_in_bs = if input.apply_excess_usd {
        excess_usd.convert(rate)?
    } else {
        Money::ZERO
    };

    let banco = input.total_banco_bs.resolve(|| summary.total_banco_bs);
    let premios = input
        .premios_por_pagar_bs
        .resolve(|| summary.premios_por_pagar_bs);

    let sumatoria_bs = [
        banco.value,
        expenses.debt.bs,
        expenses.operational.bs,
        excess_usd_in_bs,
        input.additional_amount.bs,
    ]
    .into_iter()
    .try_fold(input.cash_available.bs, |acc, term| {
        acc.try_add(term, "weekly sumatoria bs")
    })?;
    let diferencia_cierre = sumatoria_bs.try_sub(cuadre.bs, "diferencia cierre")?;
    let diferencia_final = diferencia_cierre.try_sub(premios.value, "weekly diferencia final")?;

    Ok(WeeklyClosureReport {
        week: summary.week,
        exchange_rate: rate,
        cuadre,
        sumatoria_usd,
        diferencia_inicial_usd,
        excess_usd,
        excess_usd_in_bs,
        total_banco_bs: banco.value,
        total_banco_source: banco.source,
        sumatoria_bs,
        diferencia_cierre,
        premios_por_pagar_bs: premios.value,
        premios_por_pagar_source: premios.source,
        diferencia_final,
        classification: classifier.classify(diferencia_final),
    })
}
