//! Transaction records fed to the engine.
//!
//! Every record belongs to a [`Scope`] (session, agency, day). The engine does
//! not select scopes: the caller hands over the records of one reconciliation
//! unit and the aggregator folds whatever it receives.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ExchangeRate, Money, MoneyAmount, money::null_as_zero,
};

/// Owner of a transaction record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    #[serde(default)]
    pub session_id: Option<Uuid>,
    #[serde(default)]
    pub agency_id: Option<Uuid>,
    pub transaction_date: NaiveDate,
}

impl Scope {
    /// Scope of a cashier session.
    #[must_use]
    pub const fn session(session_id: Uuid, transaction_date: NaiveDate) -> Self {
        Self {
            session_id: Some(session_id),
            agency_id: None,
            transaction_date,
        }
    }

    /// Scope of a supervisor entry for an agency and day.
    #[must_use]
    pub const fn agency(agency_id: Uuid, transaction_date: NaiveDate) -> Self {
        Self {
            session_id: None,
            agency_id: Some(agency_id),
            transaction_date,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    #[serde(flatten)]
    pub scope: Scope,
    pub lottery_system_id: Uuid,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub amount_bs: Money,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub amount_usd: Money,
}

impl Sale {
    #[must_use]
    pub const fn amount(&self) -> MoneyAmount {
        MoneyAmount::new(self.amount_bs, self.amount_usd)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prize {
    #[serde(flatten)]
    pub scope: Scope,
    pub lottery_system_id: Uuid,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub amount_bs: Money,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub amount_usd: Money,
}

impl Prize {
    #[must_use]
    pub const fn amount(&self) -> MoneyAmount {
        MoneyAmount::new(self.amount_bs, self.amount_usd)
    }
}

/// Expense tag: money spent to run the agency or lent out as a debt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    GastoOperativo,
    Deuda,
}

impl ExpenseCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GastoOperativo => "gasto_operativo",
            Self::Deuda => "deuda",
        }
    }
}

impl TryFrom<&str> for ExpenseCategory {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "gasto_operativo" => Ok(Self::GastoOperativo),
            "deuda" => Ok(Self::Deuda),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid expense category: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    #[serde(flatten)]
    pub scope: Scope,
    pub category: ExpenseCategory,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub amount_bs: Money,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub amount_usd: Money,
}

impl Expense {
    #[must_use]
    pub const fn amount(&self) -> MoneyAmount {
        MoneyAmount::new(self.amount_bs, self.amount_usd)
    }
}

/// A bank transfer through the mobile-payment network.
///
/// `amount_bs` is signed: positive when the agency received money, negative
/// when it paid out.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MobilePayment {
    #[serde(flatten)]
    pub scope: Scope,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub amount_bs: Money,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Card charges collected through the point-of-sale terminal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointOfSale {
    #[serde(flatten)]
    pub scope: Scope,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub amount_bs: Money,
}

/// A prize won by a customer and not yet paid out.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingPrize {
    #[serde(flatten)]
    pub scope: Scope,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub amount_bs: Money,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub amount_usd: Money,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl PendingPrize {
    #[must_use]
    pub const fn amount(&self) -> MoneyAmount {
        MoneyAmount::new(self.amount_bs, self.amount_usd)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transaction {
    Sale(Sale),
    Prize(Prize),
    Expense(Expense),
    MobilePayment(MobilePayment),
    PointOfSale(PointOfSale),
    PendingPrize(PendingPrize),
}

impl Transaction {
    #[must_use]
    pub fn scope(&self) -> &Scope {
        match self {
            Self::Sale(t) => &t.scope,
            Self::Prize(t) => &t.scope,
            Self::Expense(t) => &t.scope,
            Self::MobilePayment(t) => &t.scope,
            Self::PointOfSale(t) => &t.scope,
            Self::PendingPrize(t) => &t.scope,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Sale(_) => "sale",
            Self::Prize(_) => "prize",
            Self::Expense(_) => "expense",
            Self::MobilePayment(_) => "mobile_payment",
            Self::PointOfSale(_) => "point_of_sale",
            Self::PendingPrize(_) => "pending_prize",
        }
    }
}

macro_rules! impl_from_record {
    ($($record:ident),* $(,)?) => {
        $(
            impl From<$record> for Transaction {
                fn from(value: $record) -> Self {
                    Self::$record(value)
                }
            }
        )*
    };
}

impl_from_record!(Sale, Prize, Expense, MobilePayment, PointOfSale, PendingPrize);

/// Operator-declared figures closing the day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosureDeclaration {
    pub cash_available_bs: Money,
    pub cash_available_usd: Money,
    pub exchange_rate: ExchangeRate,
}

impl ClosureDeclaration {
    #[must_use]
    pub const fn cash_available(&self) -> MoneyAmount {
        MoneyAmount::new(self.cash_available_bs, self.cash_available_usd)
    }
}

/// A cashier's working day.
///
/// The engine only reads sessions; creating and saving them belongs to the
/// persistence layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    #[serde(default)]
    pub agency_id: Option<Uuid>,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub session_date: NaiveDate,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub cash_available_bs: Money,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub cash_available_usd: Money,
    #[serde(default)]
    pub exchange_rate: Option<ExchangeRate>,
    #[serde(default)]
    pub closure_confirmed: bool,
    #[serde(default)]
    pub closure_notes: Option<String>,
}

impl Session {
    /// The declared closure, if the session carries an exchange rate.
    ///
    /// The rate is returned as stored; validation happens in the calculator.
    #[must_use]
    pub fn closure(&self) -> Option<ClosureDeclaration> {
        self.exchange_rate.map(|exchange_rate| ClosureDeclaration {
            cash_available_bs: self.cash_available_bs,
            cash_available_usd: self.cash_available_usd,
            exchange_rate,
        })
    }
}
