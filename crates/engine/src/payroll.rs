//! Weekly payroll of agency employees.
//!
//! Salaries are agreed in dollars; the bolívar figure is the dollar total at
//! the week's rate, rounded per employee:
//!
//! ```text
//! total_usd = base + sunday + bonuses - absences - other_deductions
//! total_bs  = total_usd * rate
//! ```

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    DailyClosureRecord, EngineError, ExchangeRate, Money, ResultEngine, WeekBoundaries,
    money::null_as_zero,
};

const fn active_default() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub agency_id: Option<Uuid>,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub base_salary_usd: Money,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub sunday_rate_usd: Money,
    #[serde(default = "active_default")]
    pub is_active: bool,
}

/// One employee's pay for one week, in dollars.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollEntry {
    pub employee_id: Uuid,
    pub week_start_date: NaiveDate,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub weekly_base_salary: Money,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub sunday_payment: Money,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub bonuses_extras: Money,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub absences_deductions: Money,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub other_deductions: Money,
}

impl PayrollEntry {
    /// The employee's standing pay: base salary plus the Sunday rate.
    #[must_use]
    pub const fn for_employee(employee: &Employee, week: WeekBoundaries) -> Self {
        Self {
            employee_id: employee.id,
            week_start_date: week.start,
            weekly_base_salary: employee.base_salary_usd,
            sunday_payment: employee.sunday_rate_usd,
            bonuses_extras: Money::ZERO,
            absences_deductions: Money::ZERO,
            other_deductions: Money::ZERO,
        }
    }

    /// Dollar total. Components must be non-negative; the total may not be.
    pub fn total_usd(&self) -> ResultEngine<Money> {
        let components = [
            ("weekly base salary", self.weekly_base_salary),
            ("sunday payment", self.sunday_payment),
            ("bonuses", self.bonuses_extras),
            ("absences deductions", self.absences_deductions),
            ("other deductions", self.other_deductions),
        ];
        if let Some((what, amount)) = components.iter().find(|(_, amount)| amount.is_negative()) {
            return Err(EngineError::InvalidAmount(format!(
                "{what} of employee {} must not be negative, got {amount}",
                self.employee_id
            )));
        }

        self.weekly_base_salary
            .try_add(self.sunday_payment, "payroll")?
            .try_add(self.bonuses_extras, "payroll")?
            .try_sub(self.absences_deductions, "payroll")?
            .try_sub(self.other_deductions, "payroll")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollLine {
    pub employee_id: Uuid,
    pub name: String,
    pub agency_id: Option<Uuid>,
    pub entry: PayrollEntry,
    pub total_usd: Money,
    pub total_bs: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollReport {
    pub week: WeekBoundaries,
    pub exchange_rate: ExchangeRate,
    pub lines: Vec<PayrollLine>,
    pub total_usd: Money,
    /// Sum of the per-employee bolívar figures.
    pub total_bs: Money,
}

/// Payroll of `week`.
///
/// Active employees without a stored entry for the week get their standing
/// pay. Stored entries of employees missing from `employees` are kept and
/// named after the id. When an employee has several entries for the week the
/// last one counts. Lines are sorted by name.
pub fn compute_weekly_payroll(
    week: WeekBoundaries,
    employees: &[Employee],
    entries: &[PayrollEntry],
    exchange_rate: ExchangeRate,
) -> ResultEngine<PayrollReport> {
    let exchange_rate = exchange_rate.validated()?;

    let mut stored: HashMap<Uuid, &PayrollEntry> = HashMap::new();
    let mut stored_order = Vec::new();
    for entry in entries.iter().filter(|e| e.week_start_date == week.start) {
        if stored.insert(entry.employee_id, entry).is_none() {
            stored_order.push(entry.employee_id);
        }
    }

    let mut report = PayrollReport {
        week,
        exchange_rate,
        lines: Vec::new(),
        total_usd: Money::ZERO,
        total_bs: Money::ZERO,
    };
    let mut seen = HashSet::new();

    let known = employees
        .iter()
        .filter(|e| e.is_active || stored.contains_key(&e.id));
    for employee in known {
        if !seen.insert(employee.id) {
            continue;
        }
        let entry = stored
            .get(&employee.id)
            .map_or_else(|| PayrollEntry::for_employee(employee, week), |e| **e);
        push_line(&mut report, employee.name.clone(), employee.agency_id, entry)?;
    }
    for id in stored_order {
        if seen.insert(id)
            && let Some(entry) = stored.get(&id)
        {
            push_line(&mut report, id.to_string(), None, **entry)?;
        }
    }

    report.lines.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.employee_id.cmp(&b.employee_id))
    });
    Ok(report)
}

fn push_line(
    report: &mut PayrollReport,
    name: String,
    agency_id: Option<Uuid>,
    entry: PayrollEntry,
) -> ResultEngine<()> {
    let total_usd = entry.total_usd()?;
    let total_bs = total_usd.convert(report.exchange_rate)?;
    report.total_usd = report.total_usd.try_add(total_usd, "payroll total usd")?;
    report.total_bs = report.total_bs.try_add(total_bs, "payroll total bs")?;
    report.lines.push(PayrollLine {
        employee_id: entry.employee_id,
        name,
        agency_id,
        entry,
        total_usd,
        total_bs,
    });
    Ok(())
}

/// Rate of the most recently created closure record that carries one.
#[must_use]
pub fn latest_exchange_rate(closures: &[DailyClosureRecord]) -> Option<ExchangeRate> {
    closures
        .iter()
        .filter(|c| c.exchange_rate.is_some())
        .max_by_key(|c| c.created_at)
        .and_then(|c| c.exchange_rate)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn week() -> WeekBoundaries {
        WeekBoundaries::containing(NaiveDate::from_ymd_opt(2025, 3, 12).unwrap()).unwrap()
    }

    fn employee(id: u128, name: &str, base: i64, sunday: i64) -> Employee {
        Employee {
            id: Uuid::from_u128(id),
            name: name.to_string(),
            agency_id: None,
            base_salary_usd: Money::from_units(base),
            sunday_rate_usd: Money::from_units(sunday),
            is_active: true,
        }
    }

    fn entry(id: u128, base: i64, bonus: i64, absences: i64, other: i64) -> PayrollEntry {
        PayrollEntry {
            employee_id: Uuid::from_u128(id),
            week_start_date: week().start,
            weekly_base_salary: Money::from_units(base),
            sunday_payment: Money::from_units(10),
            bonuses_extras: Money::from_units(bonus),
            absences_deductions: Money::from_units(absences),
            other_deductions: Money::from_units(other),
        }
    }

    #[test]
    fn total_formula() {
        // 100 + 10 + 15 - 20 - 5
        let e = entry(1, 100, 15, 20, 5);
        assert_eq!(e.total_usd().unwrap(), Money::from_units(100));
    }

    #[test]
    fn standing_pay_and_stored_entries() {
        let employees = [employee(1, "Maria", 80, 10), employee(2, "ana", 50, 0)];
        let report = compute_weekly_payroll(
            week(),
            &employees,
            &[entry(1, 100, 15, 20, 5)],
            ExchangeRate::from_units(40),
        )
        .unwrap();
        let names: Vec<_> = report.lines.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["ana", "Maria"]);
        assert_eq!(report.lines[0].total_usd, Money::from_units(50));
        assert_eq!(report.lines[1].total_usd, Money::from_units(100));
        assert_eq!(report.lines[1].total_bs, Money::from_units(4000));
        assert_eq!(report.total_usd, Money::from_units(150));
        assert_eq!(report.total_bs, Money::from_units(6000));
    }

    #[test]
    fn fractional_rate_rounds_per_employee() {
        let employees = [employee(1, "A", 1, 0), employee(2, "B", 1, 0)];
        let rate: ExchangeRate = "36.5821".parse().unwrap();
        let report = compute_weekly_payroll(week(), &employees, &[], rate).unwrap();
        assert_eq!(report.lines[0].total_bs, Money::new(3658));
        assert_eq!(report.total_bs, Money::new(7316));
    }

    #[test]
    fn inactive_and_other_weeks_are_skipped() {
        let mut gone = employee(1, "Pedro", 80, 0);
        gone.is_active = false;
        let mut old = entry(2, 70, 0, 0, 0);
        old.week_start_date = week().previous().unwrap().start;
        let report = compute_weekly_payroll(
            week(),
            &[gone],
            &[old, entry(3, 30, 0, 0, 0)],
            ExchangeRate::from_units(36),
        )
        .unwrap();
        assert_eq!(report.lines.len(), 1);
        assert_eq!(report.lines[0].name, Uuid::from_u128(3).to_string());
    }

    #[test]
    fn bad_rate_and_negative_components_fail() {
        let employees = [employee(1, "A", 10, 0)];
        let err = compute_weekly_payroll(week(), &employees, &[], ExchangeRate::from_units(0))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidRate(_)));
        let err = compute_weekly_payroll(
            week(),
            &employees,
            &[entry(1, 10, -1, 0, 0)],
            ExchangeRate::from_units(36),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }

    #[test]
    fn latest_rate_wins() {
        let record = |hour, rate: Option<i64>| DailyClosureRecord {
            session_id: None,
            agency_id: None,
            session_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            total_banco_bs: Money::ZERO,
            pending_prizes: Money::ZERO,
            exchange_rate: rate.map(ExchangeRate::from_units),
            created_at: Utc.with_ymd_and_hms(2025, 3, 10, hour, 0, 0).unwrap(),
            updated_at: None,
        };
        let closures = [record(8, Some(36)), record(20, None), record(12, Some(38))];
        assert_eq!(latest_exchange_rate(&closures), Some(ExchangeRate::from_units(38)));
        assert_eq!(latest_exchange_rate(&[]), None);
    }
}
