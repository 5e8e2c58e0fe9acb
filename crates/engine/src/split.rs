//! Category splits for expenses and mobile payments.

use serde::{Deserialize, Serialize};

use crate::{
    Expense, ExpenseCategory, MobilePayment, Money, MoneyAmount, ResultEngine,
};

/// Expenses partitioned by their category tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseSplit {
    /// `gasto_operativo` records.
    pub operational: MoneyAmount,
    /// `deuda` records.
    pub debt: MoneyAmount,
}

impl ExpenseSplit {
    /// Adds one expense to its category. Negative amounts are rejected.
    pub fn add(&mut self, expense: &Expense) -> ResultEngine<()> {
        let amount = expense.amount().ensure_non_negative("expense")?;
        match expense.category {
            ExpenseCategory::GastoOperativo => {
                self.operational = self.operational.try_add(amount, "operational expenses")?;
            }
            ExpenseCategory::Deuda => {
                self.debt = self.debt.try_add(amount, "debts")?;
            }
        }
        Ok(())
    }

    /// All categories together.
    pub fn total(&self) -> ResultEngine<MoneyAmount> {
        self.operational.try_add(self.debt, "total expenses")
    }

    pub fn merge(self, other: ExpenseSplit) -> ResultEngine<ExpenseSplit> {
        Ok(ExpenseSplit {
            operational: self.operational.try_add(other.operational, "operational expenses")?,
            debt: self.debt.try_add(other.debt, "debts")?,
        })
    }
}

/// Mobile payments split by direction.
///
/// Both fields are non-negative: `received_bs - paid_bs` equals the sum of the
/// raw signed amounts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MobileSplit {
    pub received_bs: Money,
    pub paid_bs: Money,
}

impl MobileSplit {
    pub fn add(&mut self, payment: &MobilePayment) -> ResultEngine<()> {
        let amount = payment.amount_bs;
        if amount.is_negative() {
            let paid = Money::ZERO.try_sub(amount, "mobile payments paid")?;
            self.paid_bs = self.paid_bs.try_add(paid, "mobile payments paid")?;
        } else {
            self.received_bs = self.received_bs.try_add(amount, "mobile payments received")?;
        }
        Ok(())
    }

    /// Signed total: received minus paid.
    pub fn net_bs(&self) -> ResultEngine<Money> {
        self.received_bs.try_sub(self.paid_bs, "mobile payments net")
    }

    pub fn merge(self, other: MobileSplit) -> ResultEngine<MobileSplit> {
        Ok(MobileSplit {
            received_bs: self
                .received_bs
                .try_add(other.received_bs, "mobile payments received")?,
            paid_bs: self.paid_bs.try_add(other.paid_bs, "mobile payments paid")?,
        })
    }
}

pub fn split_expenses(expenses: &[Expense]) -> ResultEngine<ExpenseSplit> {
    let mut split = ExpenseSplit::default();
    for expense in expenses {
        split.add(expense)?;
    }
    Ok(split)
}

pub fn split_mobile_payments(payments: &[MobilePayment]) -> ResultEngine<MobileSplit> {
    let mut split = MobileSplit::default();
    for payment in payments {
        split.add(payment)?;
    }
    Ok(split)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{EngineError, Scope};

    fn scope() -> Scope {
        Scope::agency(
            uuid::Uuid::nil(),
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        )
    }

    fn expense(category: ExpenseCategory, bs: i64, usd: i64) -> Expense {
        Expense {
            scope: scope(),
            category,
            description: None,
            amount_bs: Money::new(bs),
            amount_usd: Money::new(usd),
        }
    }

    fn mobile(cents: i64) -> MobilePayment {
        MobilePayment {
            scope: scope(),
            amount_bs: Money::new(cents),
            reference: None,
            description: None,
        }
    }

    #[test]
    fn expenses_go_to_their_category() {
        let split = split_expenses(&[
            expense(ExpenseCategory::GastoOperativo, 1000, 0),
            expense(ExpenseCategory::Deuda, 500, 200),
            expense(ExpenseCategory::GastoOperativo, 250, 100),
        ])
        .unwrap();
        assert_eq!(split.operational, MoneyAmount::new(Money::new(1250), Money::new(100)));
        assert_eq!(split.debt, MoneyAmount::new(Money::new(500), Money::new(200)));
        assert_eq!(
            split.total().unwrap(),
            MoneyAmount::new(Money::new(1750), Money::new(300))
        );
    }

    #[test]
    fn negative_expense_is_rejected() {
        let err = split_expenses(&[expense(ExpenseCategory::Deuda, -1, 0)]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }

    #[test]
    fn mobile_sign_selects_direction() {
        let split = split_mobile_payments(&[mobile(50_000), mobile(-12_000), mobile(0)]).unwrap();
        assert_eq!(split.received_bs, Money::new(50_000));
        assert_eq!(split.paid_bs, Money::new(12_000));
        assert_eq!(split.net_bs().unwrap(), Money::new(38_000));
    }

    #[test]
    fn mobile_overflow_is_reported() {
        let err = split_mobile_payments(&[mobile(i64::MAX), mobile(1)]).unwrap_err();
        assert!(matches!(err, EngineError::Overflow(_)));
    }
}
