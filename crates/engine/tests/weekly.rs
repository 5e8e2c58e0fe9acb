use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use engine::{
    BalanceClassifier, CommissionRate, CommissionRates, DailyClosureRecord, DailySystemFigures,
    Expense, FieldSource, FixedExpense, LotterySystem, Money, UNGROUPED, WeekBoundaries,
    WeeklyClosureInput, compute_group_profit, compute_profit, compute_weekly_closure,
    summarize_agency_week,
};

const AGENCY: &str = "00000000-0000-0000-0000-000000000001";
const LOTTO: &str = "00000000-0000-0000-0000-0000000000a1";

fn week() -> WeekBoundaries {
    WeekBoundaries::containing(NaiveDate::from_ymd_opt(2025, 3, 13).unwrap()).unwrap()
}

fn details() -> Vec<DailySystemFigures> {
    serde_json::from_str(&format!(
        r#"[
            {{"agency_id": "{AGENCY}", "transaction_date": "2025-03-10",
              "lottery_system_id": "{LOTTO}",
              "sales": {{"bs": "6000.00", "usd": "50.00"}},
              "prizes": {{"bs": "2000.00", "usd": null}}}},
            {{"agency_id": "{AGENCY}", "transaction_date": "2025-03-16",
              "lottery_system_id": "{LOTTO}",
              "sales": {{"bs": 4000, "usd": 10}},
              "prizes": {{"bs": 1000}}}}
        ]"#
    ))
    .unwrap()
}

fn expenses() -> Vec<Expense> {
    serde_json::from_str(&format!(
        r#"[
            {{"agency_id": "{AGENCY}", "transaction_date": "2025-03-11",
              "category": "gasto_operativo", "amount_bs": "300.00", "amount_usd": "5.00"}},
            {{"agency_id": "{AGENCY}", "transaction_date": "2025-03-12",
              "category": "deuda", "amount_bs": "200.00"}}
        ]"#
    ))
    .unwrap()
}

fn closures() -> Vec<DailyClosureRecord> {
    serde_json::from_str(&format!(
        r#"[
            {{"agency_id": "{AGENCY}", "session_date": "2025-03-16",
              "total_banco_bs": "1500.00", "pending_prizes": "100.00",
              "exchange_rate": "40.0000", "created_at": "2025-03-16T22:00:00Z"}},
            {{"session_id": "00000000-0000-0000-0000-00000000beef",
              "agency_id": "{AGENCY}", "session_date": "2025-03-15",
              "total_banco_bs": "9999.00", "created_at": "2025-03-15T22:00:00Z"}}
        ]"#
    ))
    .unwrap()
}

fn systems() -> Vec<LotterySystem> {
    serde_json::from_str(&format!(
        r#"[{{"id": "{LOTTO}", "name": "Lotto Activo", "code": "LA"}}]"#
    ))
    .unwrap()
}

fn rates() -> CommissionRates {
    let rates: Vec<CommissionRate> = serde_json::from_str(&format!(
        r#"[{{"lottery_system_id": "{LOTTO}",
              "commission_percentage": "10.00", "commission_percentage_usd": 5}}]"#
    ))
    .unwrap();
    rates.into_iter().collect()
}

fn agency() -> Uuid {
    AGENCY.parse().unwrap()
}

#[test]
fn weekly_closure_from_stored_records() {
    let summary =
        summarize_agency_week(agency(), week(), &details(), &expenses(), &closures(), &systems())
            .unwrap();
    assert_eq!(summary.systems[0].name, "Lotto Activo");
    assert_eq!(summary.total_sales.bs, Money::from_units(10_000));
    assert_eq!(summary.total_prizes.bs, Money::from_units(3_000));
    // the cashier's session record is not an agency-level closure
    assert_eq!(summary.total_banco_bs, Money::from_units(1_500));
    assert_eq!(summary.closure_days, 1);

    let input = WeeklyClosureInput {
        cash_available: engine::MoneyAmount::new(Money::from_units(5_000), Money::from_units(60)),
        apply_excess_usd: true,
        ..Default::default()
    };
    let report =
        compute_weekly_closure(&summary, &input, &BalanceClassifier::default()).unwrap();
    // cuadre: 7000 Bs / 60 USD; usd side 60 + 5 = 65, excess 5 -> 200 Bs at 40
    assert_eq!(report.cuadre.bs, Money::from_units(7_000));
    assert_eq!(report.excess_usd, Money::from_units(5));
    assert_eq!(report.excess_usd_in_bs, Money::from_units(200));
    // 5000 + 1500 + 200 debt + 300 expenses + 200 excess
    assert_eq!(report.sumatoria_bs, Money::from_units(7_200));
    assert_eq!(report.diferencia_cierre, Money::from_units(200));
    assert_eq!(report.premios_por_pagar_source, FieldSource::Engine);
    assert_eq!(report.diferencia_final, Money::from_units(100));
    assert!(report.classification.is_balanced());
}

#[test]
fn profit_over_the_week() {
    let summary =
        summarize_agency_week(agency(), week(), &details(), &expenses(), &closures(), &systems())
            .unwrap();
    let fixed: Vec<FixedExpense> = serde_json::from_str(
        r#"[
            {"category": "alquiler", "amount_bs": "250.00", "expense_date": "2025-03-14",
             "group": "centro"},
            {"category": "banco", "amount_bs": "50.00", "expense_date": "2025-03-14"}
        ]"#,
    )
    .unwrap();

    let overall = compute_profit(std::slice::from_ref(&summary), &rates(), &fixed).unwrap();
    assert_eq!(overall.gross.bs, Money::from_units(1_000));
    assert_eq!(overall.gross.usd, Money::from_units(3));
    assert_eq!(overall.net.bs, Money::from_units(700));
    assert_eq!(overall.final_bs, Money::from_units(400));
    assert!(overall.warnings.is_empty());

    let groups = HashMap::from([(agency(), "centro".to_string())]);
    let by_group = compute_group_profit(&[summary], &groups, &rates(), &fixed).unwrap();
    assert_eq!(by_group.len(), 1);
    assert_ne!(by_group[0].group, UNGROUPED);
    assert_eq!(by_group[0].report.fixed_expenses_bs, Money::from_units(250));
    assert_eq!(by_group[0].report.final_bs, Money::from_units(450));
}
