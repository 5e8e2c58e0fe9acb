//! The daily closure ("cuadre") calculator.
//!
//! [`compute_reconciliation`] is the single entry point used for a cashier
//! session, an agency day or a date range: the caller picks the records, the
//! calculator only folds and applies the closure formulas.
//!
//! Bolívar closure, in this order:
//!
//! 1. `cuadre_ventas_premios_bs = sales.bs - prizes.bs`
//! 2. `cuadre_ventas_premios_usd = sales.usd - prizes.usd`
//! 3. `total_banco = mobile received + point of sale - mobile paid`
//! 4. `excess_usd = cash_usd - cuadre_ventas_premios_usd`
//! 5. `sumatoria_bs = cash_bs + total_banco + debts.bs + expenses.bs + excess_usd * rate`
//! 6. `diferencia_inicial = sumatoria_bs - cuadre_ventas_premios_bs`
//! 7. `diferencia_final = diferencia_inicial - premios_por_pagar`
//!
//! The USD closure is informational:
//! `diferencia_usd = (cash_usd + expenses.usd + debts.usd) - cuadre_ventas_premios_usd`.

use serde::{Deserialize, Serialize};

use crate::{
    BalanceClassifier, CategoryTotals, Classification, ClosureDeclaration, EngineError,
    EngineWarning, ExchangeRate, FieldInput, FieldSource, Money, MoneyAmount, ResultEngine,
    Transaction, UsdLabel, aggregate::aggregate, classify::label_usd,
};

/// Everything the calculator needs for one reconciliation unit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationInput {
    pub transactions: Vec<Transaction>,
    /// Cash on hand and exchange rate declared by the operator.
    pub closure: Option<ClosureDeclaration>,
    #[serde(default)]
    pub total_banco_bs: FieldInput<Money>,
    #[serde(default)]
    pub premios_por_pagar_bs: FieldInput<Money>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BolivarClosure {
    pub cuadre_ventas_premios_bs: Money,
    pub cuadre_ventas_premios_usd: Money,
    pub total_banco_bs: Money,
    pub total_banco_source: FieldSource,
    pub excess_usd: Money,
    /// `excess_usd` converted at the declared rate, rounded to the cent.
    pub excess_usd_in_bs: Money,
    pub sumatoria_bs: Money,
    pub diferencia_inicial: Money,
    pub premios_por_pagar_bs: Money,
    pub premios_por_pagar_source: FieldSource,
    pub diferencia_final: Money,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsdClosure {
    pub total_usd: Money,
    pub diferencia_usd: Money,
    pub label: UsdLabel,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub totals: CategoryTotals,
    pub bolivar: BolivarClosure,
    pub usd: UsdClosure,
    pub cash_available: MoneyAmount,
    /// `None` only for an empty scope.
    pub exchange_rate: Option<ExchangeRate>,
    pub classification: Classification,
    pub warnings: Vec<EngineWarning>,
}

/// Computes the closure report with the default tolerance.
pub fn compute_reconciliation(input: &ReconciliationInput) -> ResultEngine<ReconciliationReport> {
    compute_reconciliation_with(input, &BalanceClassifier::default())
}

/// Computes the closure report, classifying with `classifier`.
///
/// # Errors
///
/// - [`EngineError::InvalidRate`] when the declared rate is not positive.
/// - [`EngineError::MissingClosure`] when there is activity but no closure.
/// - [`EngineError::InvalidAmount`] / [`EngineError::Overflow`] from aggregation.
pub fn compute_reconciliation_with(
    input: &ReconciliationInput,
    classifier: &BalanceClassifier,
) -> ResultEngine<ReconciliationReport> {
    let totals = aggregate(&input.transactions)?;

    let closure = match input.closure {
        Some(closure) => closure,
        None if totals.is_empty()
            && input.total_banco_bs.is_unset()
            && input.premios_por_pagar_bs.is_unset() =>
        {
            return Ok(empty_report());
        }
        None => {
            return Err(EngineError::MissingClosure(format!(
                "{} transactions without declared cash and exchange rate",
                totals.transaction_count
            )));
        }
    };
    let rate = closure.exchange_rate.validated()?;

    let bolivar = bolivar_closure(&totals, &closure, rate, input)?;
    let usd = usd_closure(&totals, &closure, bolivar.cuadre_ventas_premios_usd)?;
    let classification = classifier.classify(bolivar.diferencia_final);

    Ok(ReconciliationReport {
        totals,
        bolivar,
        usd,
        cash_available: closure.cash_available(),
        exchange_rate: Some(rate),
        classification,
        warnings: Vec::new(),
    })
}

fn bolivar_closure(
    totals: &CategoryTotals,
    closure: &ClosureDeclaration,
    rate: ExchangeRate,
    input: &ReconciliationInput,
) -> ResultEngine<BolivarClosure> {
    let cuadre = totals.total_sales.try_sub(totals.total_prizes, "cuadre ventas/premios")?;

    let banco = input.total_banco_bs.try_resolve(|| {
        totals
            .mobile
            .received_bs
            .try_add(totals.total_pos_bs, "total banco")?
            .try_sub(totals.mobile.paid_bs, "total banco")
    })?;

    let excess_usd = closure
        .cash_available_usd
        .try_sub(cuadre.usd, "excess usd")?;
    let excess_usd_in_bs = excess_usd.convert(rate)?;

    let sumatoria_bs = [
        banco.value,
        totals.expenses.debt.bs,
        totals.expenses.operational.bs,
        excess_usd_in_bs,
    ]
    .into_iter()
    .try_fold(closure.cash_available_bs, |acc, term| acc.try_add(term, "sumatoria bs"))?;

    let diferencia_inicial = sumatoria_bs.try_sub(cuadre.bs, "diferencia inicial")?;

    let premios = input
        .premios_por_pagar_bs
        .resolve(|| totals.total_pending_prizes.bs);
    let diferencia_final = diferencia_inicial.try_sub(premios.value, "diferencia final")?;

    Ok(BolivarClosure {
        cuadre_ventas_premios_bs: cuadre.bs,
        cuadre_ventas_premios_usd: cuadre.usd,
        total_banco_bs: banco.value,
        total_banco_source: banco.source,
        excess_usd,
        excess_usd_in_bs,
        sumatoria_bs,
        diferencia_inicial,
        premios_por_pagar_bs: premios.value,
        premios_por_pagar_source: premios.source,
        diferencia_final,
    })
}

fn usd_closure(
    totals: &CategoryTotals,
    closure: &ClosureDeclaration,
    cuadre_usd: Money,
) -> ResultEngine<UsdClosure> {
    let total_usd = closure
        .cash_available_usd
        .try_add(totals.expenses.operational.usd, "total usd")?
        .try_add(totals.expenses.debt.usd, "total usd")?;
    let diferencia_usd = total_usd.try_sub(cuadre_usd, "diferencia usd")?;
    Ok(UsdClosure {
        total_usd,
        diferencia_usd,
        label: label_usd(diferencia_usd),
    })
}

fn empty_report() -> ReconciliationReport {
    ReconciliationReport {
        totals: CategoryTotals::default(),
        bolivar: BolivarClosure {
            cuadre_ventas_premios_bs: Money::ZERO,
            cuadre_ventas_premios_usd: Money::ZERO,
            total_banco_bs: Money::ZERO,
            total_banco_source: FieldSource::Engine,
            excess_usd: Money::ZERO,
            excess_usd_in_bs: Money::ZERO,
            sumatoria_bs: Money::ZERO,
            diferencia_inicial: Money::ZERO,
            premios_por_pagar_bs: Money::ZERO,
            premios_por_pagar_source: FieldSource::Engine,
            diferencia_final: Money::ZERO,
        },
        usd: UsdClosure {
            total_usd: Money::ZERO,
            diferencia_usd: Money::ZERO,
            label: UsdLabel::Exact,
        },
        cash_available: MoneyAmount::ZERO,
        exchange_rate: None,
        classification: Classification::Balanced,
        warnings: vec![EngineWarning::EmptyScope],
    }
}
