//! Calculation engine for lottery-agency cash reconciliation ("cuadre").
//!
//! The crate is a set of pure functions over value types: callers load the
//! records of a scope, build an input and get an immutable report back. No I/O,
//! no logging, no cached state.
//!
//! - [`compute_reconciliation`]: daily closure of a session or an agency day.
//! - [`compute_commission_run`]: banqueo split per lottery system.
//! - [`group_systems`]: sub-systems rolled up into their parent.
//! - [`summarize_agency_week`] / [`compute_weekly_closure`]: weekly closure.
//! - [`compute_profit`] / [`compute_group_profit`]: ganancias.
//! - [`summarize_reviews`]: supervisor review statistics.
//! - [`net_inter_agency_debts`]: net position of each agency across debts.
//! - [`compute_weekly_payroll`]: employee pay of a week in both currencies.

pub use aggregate::{CategoryTotals, aggregate};
pub use classify::{
    BalanceClassifier, Classification, RECONCILIATION_TOLERANCE_BS, USD_LABEL_TOLERANCE, UsdLabel,
    label_usd,
};
pub use commission::{
    CommissionRate, CommissionRates, CommissionRunResult, CommissionSplit, SystemCommission,
    SystemCommissionRow, SystemCommissionSummary, SystemSales, compute_commission_run,
    summarize_system_commissions,
};
pub use currency::Currency;
pub use debts::{AgencyDebtBalance, InterAgencyDebt, net_inter_agency_debts};
pub use error::{EngineError, EngineWarning};
pub use field::{FieldInput, FieldSource, Resolved};
pub use money::{Money, MoneyAmount};
pub use payroll::{
    Employee, PayrollEntry, PayrollLine, PayrollReport, compute_weekly_payroll,
    latest_exchange_rate,
};
pub use profit::{
    FixedExpense, FixedExpenseTotal, GroupProfit, ProfitReport, UNGROUPED, compute_group_profit,
    compute_profit,
};
pub use rate::{ExchangeRate, Percentage};
pub use reconciliation::{
    BolivarClosure, ReconciliationInput, ReconciliationReport, UsdClosure, compute_reconciliation,
    compute_reconciliation_with,
};
pub use review::{AgencyReviewSummary, CashierClosure, ReviewStatus, summarize_reviews};
pub use split::{ExpenseSplit, MobileSplit, split_expenses, split_mobile_payments};
pub use systems::{LotterySystem, SystemsSummary, SystemsSummaryRow, group_systems};
pub use transactions::{
    ClosureDeclaration, Expense, ExpenseCategory, MobilePayment, PendingPrize, PointOfSale, Prize,
    Sale, Scope, Session, Transaction,
};
pub use weekly::{
    AgencyWeeklySummary, DailyClosureRecord, DailySystemFigures, WeekBoundaries,
    WeeklyClosureInput, WeeklyClosureReport, WeeklySystemTotals, compute_weekly_closure,
    summarize_agency_week,
};

mod aggregate;
mod classify;
mod commission;
mod currency;
mod debts;
mod error;
mod field;
mod money;
mod payroll;
mod profit;
mod rate;
mod reconciliation;
mod review;
mod split;
mod systems;
mod transactions;
mod util;
mod weekly;

pub type ResultEngine<T> = Result<T, EngineError>;
