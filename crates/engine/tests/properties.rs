// Property tests for the aggregation and split formulas.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use chrono::NaiveDate;
use proptest::prelude::*;
use uuid::Uuid;

use engine::{
    BalanceClassifier, Classification, CommissionRate, CommissionRates, Expense, ExpenseCategory,
    MobilePayment, Money, MoneyAmount, PendingPrize, Percentage, PointOfSale, Prize, Sale, Scope,
    SystemSales, Transaction, aggregate, compute_commission_run, split_mobile_payments,
};

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

fn scope() -> Scope {
    Scope::session(Uuid::nil(), NaiveDate::from_ymd_opt(2025, 3, 10).unwrap())
}

// Amounts stay far below i64::MAX so sums never overflow.
fn cents() -> impl Strategy<Value = Money> {
    (0i64..100_000_000).prop_map(Money::new)
}

fn signed_cents() -> impl Strategy<Value = Money> {
    (-100_000_000i64..100_000_000).prop_map(Money::new)
}

fn transaction() -> impl Strategy<Value = Transaction> {
    prop_oneof![
        (cents(), cents()).prop_map(|(bs, usd)| Transaction::from(Sale {
            scope: scope(),
            lottery_system_id: Uuid::nil(),
            amount_bs: bs,
            amount_usd: usd,
        })),
        (cents(), cents()).prop_map(|(bs, usd)| Transaction::from(Prize {
            scope: scope(),
            lottery_system_id: Uuid::nil(),
            amount_bs: bs,
            amount_usd: usd,
        })),
        (cents(), cents(), any::<bool>()).prop_map(|(bs, usd, debt)| Transaction::from(Expense {
            scope: scope(),
            category: if debt {
                ExpenseCategory::Deuda
            } else {
                ExpenseCategory::GastoOperativo
            },
            description: None,
            amount_bs: bs,
            amount_usd: usd,
        })),
        signed_cents().prop_map(|bs| Transaction::from(MobilePayment {
            scope: scope(),
            amount_bs: bs,
            reference: None,
            description: None,
        })),
        cents().prop_map(|bs| Transaction::from(PointOfSale {
            scope: scope(),
            amount_bs: bs,
        })),
        (cents(), any::<bool>()).prop_map(|(bs, is_paid)| Transaction::from(PendingPrize {
            scope: scope(),
            amount_bs: bs,
            amount_usd: Money::ZERO,
            is_paid,
            description: None,
        })),
    ]
}

proptest! {
    #![proptest_config(config())]

    #[test]
    fn aggregation_ignores_order(
        (records, shuffled) in prop::collection::vec(transaction(), 0..40)
            .prop_flat_map(|records| (Just(records.clone()), Just(records).prop_shuffle())),
    ) {
        prop_assert_eq!(aggregate(&records).unwrap(), aggregate(&shuffled).unwrap());
    }

    #[test]
    fn merged_batches_equal_the_whole(
        records in prop::collection::vec(transaction(), 0..40),
        cut in any::<prop::sample::Index>(),
    ) {
        let at = if records.is_empty() { 0 } else { cut.index(records.len() + 1) };
        let (left, right) = records.split_at(at);
        let merged = aggregate(left).unwrap().merge(aggregate(right).unwrap()).unwrap();
        prop_assert_eq!(merged, aggregate(&records).unwrap());
    }

    #[test]
    fn mobile_split_preserves_signed_sum(amounts in prop::collection::vec(signed_cents(), 0..50)) {
        let payments: Vec<MobilePayment> = amounts
            .iter()
            .map(|&amount_bs| MobilePayment {
                scope: scope(),
                amount_bs,
                reference: None,
                description: None,
            })
            .collect();
        let split = split_mobile_payments(&payments).unwrap();
        let signed: Money = amounts.iter().copied().sum();
        prop_assert!(!split.received_bs.is_negative());
        prop_assert!(!split.paid_bs.is_negative());
        prop_assert_eq!(split.net_bs().unwrap(), signed);
    }

    #[test]
    fn zero_percentages_leave_cuadre_untouched(
        rows in prop::collection::vec((cents(), cents(), cents(), cents()), 1..20),
    ) {
        let rows: Vec<SystemSales> = rows
            .into_iter()
            .enumerate()
            .map(|(i, (sb, su, pb, pu))| SystemSales {
                lottery_system_id: Uuid::from_u128(i as u128),
                sales: MoneyAmount::new(sb, su),
                prizes: MoneyAmount::new(pb, pu),
            })
            .collect();
        let rates: CommissionRates = rows
            .iter()
            .map(|r| CommissionRate {
                lottery_system_id: r.lottery_system_id,
                commission_percentage: Percentage::ZERO,
                commission_percentage_usd: Percentage::ZERO,
            })
            .collect();
        let run = compute_commission_run(&rows, &rates, Percentage::ZERO).unwrap();
        for system in &run.systems {
            prop_assert_eq!(system.bs.final_total, system.bs.cuadre);
            prop_assert_eq!(system.usd.final_total, system.usd.cuadre);
        }
        prop_assert!(run.warnings.is_empty());
    }

    #[test]
    fn classification_is_symmetric(cents in -1_000_000i64..1_000_000) {
        let classifier = BalanceClassifier::default();
        let verdict = classifier.classify(Money::new(cents));
        prop_assert_eq!(verdict, classifier.classify(Money::new(-cents)));
        prop_assert_eq!(verdict == Classification::Balanced, cents.abs() <= 10_000);
    }
}
