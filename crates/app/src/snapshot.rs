//! File-backed stand-in for the persistence layer.
//!
//! A snapshot is a directory with one JSON file per record category. Files
//! are read concurrently; a missing list file is an empty list.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use engine::{
    CashierClosure, CommissionRate, DailyClosureRecord, DailySystemFigures, Employee, Expense,
    FixedExpense, InterAgencyDebt, LotterySystem, MobilePayment, PayrollEntry, PendingPrize,
    PointOfSale, Prize, Sale, Session, SystemSales, Transaction,
};
use serde::{Deserialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::error::{AppError, Result};

pub const SESSION: &str = "session.json";
pub const SALES: &str = "sales.json";
pub const PRIZES: &str = "prizes.json";
pub const EXPENSES: &str = "expenses.json";
pub const MOBILE_PAYMENTS: &str = "mobile_payments.json";
pub const POINT_OF_SALE: &str = "point_of_sale.json";
pub const PENDING_PRIZES: &str = "pending_prizes.json";
pub const LOTTERY_SYSTEMS: &str = "lottery_systems.json";
pub const COMMISSION_RATES: &str = "commission_rates.json";
pub const SYSTEM_SALES: &str = "system_sales.json";
pub const WEEKLY_DETAILS: &str = "weekly_details.json";
pub const DAILY_CLOSURES: &str = "daily_closures.json";
pub const FIXED_EXPENSES: &str = "fixed_expenses.json";
pub const CASHIER_CLOSURES: &str = "cashier_closures.json";
pub const AGENCY_GROUPS: &str = "agency_groups.json";
pub const INTER_AGENCY_DEBTS: &str = "inter_agency_debts.json";
pub const EMPLOYEES: &str = "employees.json";
pub const WEEKLY_PAYROLL: &str = "weekly_payroll.json";

/// Records of one reconciliation scope.
#[derive(Debug, Default)]
pub struct DaySnapshot {
    pub session: Option<Session>,
    pub sales: Vec<Sale>,
    pub prizes: Vec<Prize>,
    pub expenses: Vec<Expense>,
    pub mobile_payments: Vec<MobilePayment>,
    pub point_of_sale: Vec<PointOfSale>,
    pub pending_prizes: Vec<PendingPrize>,
}

impl DaySnapshot {
    /// Every record as one list, in category order.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.sales
            .iter()
            .cloned()
            .map(Transaction::from)
            .chain(self.prizes.iter().cloned().map(Transaction::from))
            .chain(self.expenses.iter().cloned().map(Transaction::from))
            .chain(self.mobile_payments.iter().cloned().map(Transaction::from))
            .chain(self.point_of_sale.iter().cloned().map(Transaction::from))
            .chain(self.pending_prizes.iter().cloned().map(Transaction::from))
            .collect()
    }
}

/// Per-system figures with the system tree and the rates.
#[derive(Debug, Default)]
pub struct SystemsSnapshot {
    pub systems: Vec<LotterySystem>,
    pub rates: Vec<CommissionRate>,
    pub figures: Vec<SystemSales>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgencyGroup {
    pub agency_id: Uuid,
    pub group: String,
}

#[derive(Debug, Default)]
pub struct WeekSnapshot {
    pub systems: Vec<LotterySystem>,
    pub rates: Vec<CommissionRate>,
    pub details: Vec<DailySystemFigures>,
    pub expenses: Vec<Expense>,
    pub closures: Vec<DailyClosureRecord>,
    pub fixed_expenses: Vec<FixedExpense>,
    pub groups: Vec<AgencyGroup>,
}

pub async fn load_day(dir: &Path) -> Result<DaySnapshot> {
    tracing::debug!("loading day snapshot from {}", dir.display());
    let (session, sales, prizes, expenses, mobile_payments, point_of_sale, pending_prizes) =
        tokio::try_join!(
            read_optional::<Session>(dir.join(SESSION)),
            read_list::<Sale>(dir.join(SALES)),
            read_list::<Prize>(dir.join(PRIZES)),
            read_list::<Expense>(dir.join(EXPENSES)),
            read_list::<MobilePayment>(dir.join(MOBILE_PAYMENTS)),
            read_list::<PointOfSale>(dir.join(POINT_OF_SALE)),
            read_list::<PendingPrize>(dir.join(PENDING_PRIZES)),
        )?;
    Ok(DaySnapshot {
        session,
        sales,
        prizes,
        expenses,
        mobile_payments,
        point_of_sale,
        pending_prizes,
    })
}

pub async fn load_systems(dir: &Path) -> Result<SystemsSnapshot> {
    tracing::debug!("loading systems snapshot from {}", dir.display());
    let (systems, rates, figures) = tokio::try_join!(
        read_list::<LotterySystem>(dir.join(LOTTERY_SYSTEMS)),
        read_list::<CommissionRate>(dir.join(COMMISSION_RATES)),
        read_list::<SystemSales>(dir.join(SYSTEM_SALES)),
    )?;
    Ok(SystemsSnapshot {
        systems,
        rates,
        figures,
    })
}

pub async fn load_week(dir: &Path) -> Result<WeekSnapshot> {
    tracing::debug!("loading weekly snapshot from {}", dir.display());
    let (systems, rates, details, expenses, closures, fixed_expenses, groups) = tokio::try_join!(
        read_list::<LotterySystem>(dir.join(LOTTERY_SYSTEMS)),
        read_list::<CommissionRate>(dir.join(COMMISSION_RATES)),
        read_list::<DailySystemFigures>(dir.join(WEEKLY_DETAILS)),
        read_list::<Expense>(dir.join(EXPENSES)),
        read_list::<DailyClosureRecord>(dir.join(DAILY_CLOSURES)),
        read_list::<FixedExpense>(dir.join(FIXED_EXPENSES)),
        read_list::<AgencyGroup>(dir.join(AGENCY_GROUPS)),
    )?;
    Ok(WeekSnapshot {
        systems,
        rates,
        details,
        expenses,
        closures,
        fixed_expenses,
        groups,
    })
}

/// Employees with their stored weekly entries and the closures that carry
/// the latest rate.
#[derive(Debug, Default)]
pub struct PayrollSnapshot {
    pub employees: Vec<Employee>,
    pub entries: Vec<PayrollEntry>,
    pub closures: Vec<DailyClosureRecord>,
}

pub async fn load_payroll(dir: &Path) -> Result<PayrollSnapshot> {
    tracing::debug!("loading payroll snapshot from {}", dir.display());
    let (employees, entries, closures) = tokio::try_join!(
        read_list::<Employee>(dir.join(EMPLOYEES)),
        read_list::<PayrollEntry>(dir.join(WEEKLY_PAYROLL)),
        read_list::<DailyClosureRecord>(dir.join(DAILY_CLOSURES)),
    )?;
    Ok(PayrollSnapshot {
        employees,
        entries,
        closures,
    })
}

pub async fn load_debts(dir: &Path) -> Result<Vec<InterAgencyDebt>> {
    read_list(dir.join(INTER_AGENCY_DEBTS)).await
}

pub async fn load_cashier_closures(dir: &Path) -> Result<Vec<CashierClosure>> {
    read_list(dir.join(CASHIER_CLOSURES)).await
}

async fn read_bytes(path: &Path) -> Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!("{} not found, treating as empty", path.display());
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

fn parse<T: DeserializeOwned>(path: PathBuf, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|source| AppError::Snapshot { path, source })
}

async fn read_list<T: DeserializeOwned>(path: PathBuf) -> Result<Vec<T>> {
    let Some(bytes) = read_bytes(&path).await? else {
        return Ok(Vec::new());
    };
    let records: Vec<T> = parse(path.clone(), &bytes)?;
    tracing::debug!("read {} records from {}", records.len(), path.display());
    Ok(records)
}

async fn read_optional<T: DeserializeOwned>(path: PathBuf) -> Result<Option<T>> {
    let Some(bytes) = read_bytes(&path).await? else {
        return Ok(None);
    };
    parse::<Option<T>>(path, &bytes)
}
