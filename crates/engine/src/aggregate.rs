//! Category-keyed summation of transaction records.
//!
//! The fold is commutative and associative: any order of records, and any
//! split into batches merged with [`CategoryTotals::merge`], yields the same
//! totals.

use serde::{Deserialize, Serialize};

use crate::{
    ExpenseSplit, MobileSplit, Money, MoneyAmount, ResultEngine, Transaction,
};

/// Per-category, per-currency sums of one reconciliation unit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotals {
    pub total_sales: MoneyAmount,
    pub total_prizes: MoneyAmount,
    pub expenses: ExpenseSplit,
    pub mobile: MobileSplit,
    pub total_pos_bs: Money,
    /// Unpaid pending prizes only.
    pub total_pending_prizes: MoneyAmount,
    pub transaction_count: u64,
}

impl CategoryTotals {
    /// Adds one record to the totals.
    ///
    /// Sale, prize, expense, point-of-sale and pending-prize amounts must be
    /// non-negative. Paid pending prizes are counted but contribute nothing.
    pub fn add(&mut self, transaction: &Transaction) -> ResultEngine<()> {
        match transaction {
            Transaction::Sale(sale) => {
                let amount = sale.amount().ensure_non_negative("sale")?;
                self.total_sales = self.total_sales.try_add(amount, "total sales")?;
            }
            Transaction::Prize(prize) => {
                let amount = prize.amount().ensure_non_negative("prize")?;
                self.total_prizes = self.total_prizes.try_add(amount, "total prizes")?;
            }
            Transaction::Expense(expense) => self.expenses.add(expense)?,
            Transaction::MobilePayment(payment) => self.mobile.add(payment)?,
            Transaction::PointOfSale(pos) => {
                let amount = MoneyAmount::new(pos.amount_bs, Money::ZERO)
                    .ensure_non_negative("point of sale")?;
                self.total_pos_bs = self.total_pos_bs.try_add(amount.bs, "point of sale")?;
            }
            Transaction::PendingPrize(pending) => {
                let amount = pending.amount().ensure_non_negative("pending prize")?;
                if !pending.is_paid {
                    self.total_pending_prizes =
                        self.total_pending_prizes.try_add(amount, "pending prizes")?;
                }
            }
        }
        self.transaction_count += 1;
        Ok(())
    }

    /// Combines two partial aggregates.
    pub fn merge(self, other: CategoryTotals) -> ResultEngine<CategoryTotals> {
        Ok(CategoryTotals {
            total_sales: self.total_sales.try_add(other.total_sales, "total sales")?,
            total_prizes: self.total_prizes.try_add(other.total_prizes, "total prizes")?,
            expenses: self.expenses.merge(other.expenses)?,
            mobile: self.mobile.merge(other.mobile)?,
            total_pos_bs: self.total_pos_bs.try_add(other.total_pos_bs, "point of sale")?,
            total_pending_prizes: self
                .total_pending_prizes
                .try_add(other.total_pending_prizes, "pending prizes")?,
            transaction_count: self.transaction_count + other.transaction_count,
        })
    }

    /// All expense categories together.
    pub fn total_expenses(&self) -> ResultEngine<MoneyAmount> {
        self.expenses.total()
    }

    /// Signed mobile-payment total (received minus paid).
    pub fn total_mobile_bs(&self) -> ResultEngine<Money> {
        self.mobile.net_bs()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.transaction_count == 0
    }
}

/// Folds `transactions` into [`CategoryTotals`].
pub fn aggregate(transactions: &[Transaction]) -> ResultEngine<CategoryTotals> {
    let mut totals = CategoryTotals::default();
    for transaction in transactions {
        totals.add(transaction)?;
    }
    Ok(totals)
}
