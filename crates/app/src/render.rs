//! Human-readable rendering of engine reports.
//!
//! Bolívars use the Venezuelan convention (`Bs 1.234,50`), dollars the US one
//! (`$1,234.50`).

use std::fmt::Write;

use engine::{
    AgencyDebtBalance, AgencyReviewSummary, AgencyWeeklySummary, CommissionRunResult,
    CommissionSplit, FieldSource, GroupProfit, Money, PayrollReport, ProfitReport,
    ReconciliationReport, SystemCommissionSummary, SystemsSummary, WeeklyClosureReport,
};

pub fn bs(amount: Money) -> String {
    format!("Bs {}", grouped(amount, '.', ','))
}

pub fn usd(amount: Money) -> String {
    let text = grouped(amount, ',', '.');
    match text.strip_prefix('-') {
        Some(digits) => format!("-${digits}"),
        None => format!("${text}"),
    }
}

fn grouped(amount: Money, thousands: char, decimal: char) -> String {
    let cents = amount.cents().unsigned_abs();
    let digits = (cents / 100).to_string();
    let mut out = String::new();
    if amount.is_negative() {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(thousands);
        }
        out.push(c);
    }
    out.push(decimal);
    let _ = write!(out, "{:02}", cents % 100);
    out
}

fn source(source: FieldSource) -> &'static str {
    match source {
        FieldSource::Engine => "",
        FieldSource::Upstream => " (stored)",
        FieldSource::User => " (typed)",
    }
}

pub fn reconciliation(report: &ReconciliationReport) -> String {
    let t = &report.totals;
    let b = &report.bolivar;
    let mut out = String::new();
    let _ = writeln!(out, "Totales ({} registros)", t.transaction_count);
    let _ = writeln!(
        out,
        "  ventas          {:>18} {:>14}",
        bs(t.total_sales.bs),
        usd(t.total_sales.usd)
    );
    let _ = writeln!(
        out,
        "  premios         {:>18} {:>14}",
        bs(t.total_prizes.bs),
        usd(t.total_prizes.usd)
    );
    let _ = writeln!(
        out,
        "  gastos          {:>18} {:>14}",
        bs(t.expenses.operational.bs),
        usd(t.expenses.operational.usd)
    );
    let _ = writeln!(
        out,
        "  deudas          {:>18} {:>14}",
        bs(t.expenses.debt.bs),
        usd(t.expenses.debt.usd)
    );
    let _ = writeln!(out, "  pago movil rec. {:>18}", bs(t.mobile.received_bs));
    let _ = writeln!(out, "  pago movil pag. {:>18}", bs(t.mobile.paid_bs));
    let _ = writeln!(out, "  punto de venta  {:>18}", bs(t.total_pos_bs));
    let _ = writeln!(out);
    let _ = writeln!(out, "Cuadre en bolivares");
    let _ = writeln!(out, "  cuadre ventas/premios  {:>18}", bs(b.cuadre_ventas_premios_bs));
    let _ = writeln!(out, "  efectivo               {:>18}", bs(report.cash_available.bs));
    let _ = writeln!(
        out,
        "  total banco            {:>18}{}",
        bs(b.total_banco_bs),
        source(b.total_banco_source)
    );
    let _ = writeln!(
        out,
        "  excedente USD          {:>18} ({})",
        bs(b.excess_usd_in_bs),
        usd(b.excess_usd)
    );
    if let Some(rate) = report.exchange_rate {
        let _ = writeln!(out, "  tasa                   {rate:>18}");
    }
    let _ = writeln!(out, "  sumatoria              {:>18}", bs(b.sumatoria_bs));
    let _ = writeln!(out, "  diferencia inicial     {:>18}", bs(b.diferencia_inicial));
    let _ = writeln!(
        out,
        "  premios por pagar      {:>18}{}",
        bs(b.premios_por_pagar_bs),
        source(b.premios_por_pagar_source)
    );
    let _ = writeln!(out, "  diferencia final       {:>18}", bs(b.diferencia_final));
    let _ = writeln!(out);
    let _ = writeln!(out, "Cuadre en dolares");
    let _ = writeln!(out, "  total                  {:>18}", usd(report.usd.total_usd));
    let _ = writeln!(
        out,
        "  diferencia             {:>18} ({:?})",
        usd(report.usd.diferencia_usd),
        report.usd.label
    );
    let _ = writeln!(out);
    let _ = write!(out, "Resultado: {}", verdict(report.classification.is_balanced()));
    out
}

fn verdict(balanced: bool) -> &'static str {
    if balanced { "CUADRADO" } else { "DESCUADRADO" }
}

fn split_line(
    out: &mut String,
    label: &str,
    split: &CommissionSplit,
    fmt: fn(Money) -> String,
) {
    let _ = writeln!(
        out,
        "{label:<38} {:>16} {:>16} {:>16} {:>16} {:>16} {:>16}",
        fmt(split.sales),
        fmt(split.prizes),
        fmt(split.cuadre),
        fmt(split.commission),
        fmt(split.participation),
        fmt(split.final_total),
    );
}

pub fn commission_run(run: &CommissionRunResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Banqueo, participacion {}", run.participation_percentage);
    let _ = writeln!(
        out,
        "{:<38} {:>16} {:>16} {:>16} {:>16} {:>16} {:>16}",
        "sistema", "ventas", "premios", "cuadre", "comision", "participacion", "total"
    );
    for system in &run.systems {
        let id = system.lottery_system_id.to_string();
        split_line(&mut out, &id, &system.bs, bs);
        if !(system.usd.sales.is_zero() && system.usd.prizes.is_zero()) {
            split_line(&mut out, "", &system.usd, usd);
        }
    }
    split_line(&mut out, "TOTAL Bs", &run.totals_bs, bs);
    split_line(&mut out, "TOTAL USD", &run.totals_usd, usd);
    if let (Ok(profit_bs), Ok(profit_usd)) =
        (run.profit_by_banqueo_bs(), run.profit_by_banqueo_usd())
    {
        let _ = write!(
            out,
            "Ganancia por banqueo: {} / {}",
            bs(profit_bs),
            usd(profit_usd)
        );
    }
    out
}

pub fn systems(summary: &SystemsSummary) -> String {
    let mut out = String::new();
    for row in &summary.rows {
        let marker = if row.has_sublevels { " +" } else { "" };
        let _ = writeln!(
            out,
            "{:<24} {:>18} {:>18} {:>14} {:>14}",
            format!("{}{marker}", row.name),
            bs(row.sales.bs),
            bs(row.prizes.bs),
            usd(row.sales.usd),
            usd(row.prizes.usd),
        );
    }
    let _ = write!(
        out,
        "{:<24} {:>18} {:>18} {:>14} {:>14}",
        "TOTAL",
        bs(summary.total_sales.bs),
        bs(summary.total_prizes.bs),
        usd(summary.total_sales.usd),
        usd(summary.total_prizes.usd),
    );
    out
}

pub fn system_commissions(summary: &SystemCommissionSummary) -> String {
    let mut out = String::new();
    for row in &summary.rows {
        let _ = writeln!(
            out,
            "{:<24} neto {:>18} x {:>7} = {:>16} | neto {:>14} x {:>7} = {:>12}",
            row.name,
            bs(row.net.bs),
            row.commission_percentage.to_string(),
            bs(row.total.bs),
            usd(row.net.usd),
            row.commission_percentage_usd.to_string(),
            usd(row.total.usd),
        );
    }
    let _ = write!(
        out,
        "TOTAL comision {} / {}",
        bs(summary.total_commission.bs),
        usd(summary.total_commission.usd)
    );
    out
}

pub fn weekly(summary: &AgencyWeeklySummary, closure: &WeeklyClosureReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Semana {} al {}", summary.week.start, summary.week.end);
    for system in &summary.systems {
        let _ = writeln!(
            out,
            "  {:<22} {:>18} {:>18} {:>14} {:>14}",
            system.name,
            bs(system.sales.bs),
            bs(system.prizes.bs),
            usd(system.sales.usd),
            usd(system.prizes.usd),
        );
    }
    let _ = writeln!(
        out,
        "  cuadre                 {:>18} {:>14}",
        bs(closure.cuadre.bs),
        usd(closure.cuadre.usd)
    );
    let _ = writeln!(
        out,
        "  gastos                 {:>18} {:>14}",
        bs(summary.expenses.operational.bs),
        usd(summary.expenses.operational.usd)
    );
    let _ = writeln!(
        out,
        "  deudas                 {:>18} {:>14}",
        bs(summary.expenses.debt.bs),
        usd(summary.expenses.debt.usd)
    );
    let _ = writeln!(out, "  tasa                   {:>18}", closure.exchange_rate);
    let _ = writeln!(out, "  sumatoria USD          {:>18}", usd(closure.sumatoria_usd));
    let _ = writeln!(
        out,
        "  excedente USD          {:>18} ({})",
        usd(closure.excess_usd),
        bs(closure.excess_usd_in_bs)
    );
    let _ = writeln!(
        out,
        "  total banco            {:>18}{}",
        bs(closure.total_banco_bs),
        source(closure.total_banco_source)
    );
    let _ = writeln!(out, "  sumatoria              {:>18}", bs(closure.sumatoria_bs));
    let _ = writeln!(out, "  diferencia cierre      {:>18}", bs(closure.diferencia_cierre));
    let _ = writeln!(
        out,
        "  premios por pagar      {:>18}{}",
        bs(closure.premios_por_pagar_bs),
        source(closure.premios_por_pagar_source)
    );
    let _ = writeln!(out, "  diferencia final       {:>18}", bs(closure.diferencia_final));
    let _ = write!(out, "Resultado: {}", verdict(closure.classification.is_balanced()));
    out
}

fn profit_block(out: &mut String, title: &str, report: &ProfitReport) {
    let _ = writeln!(out, "{title}");
    let _ = writeln!(
        out,
        "  ganancia bruta   {:>18} {:>14}",
        bs(report.gross.bs),
        usd(report.gross.usd)
    );
    let _ = writeln!(
        out,
        "  gastos           {:>18} {:>14}",
        bs(report.operational_expenses.bs),
        usd(report.operational_expenses.usd)
    );
    let _ = writeln!(
        out,
        "  ganancia neta    {:>18} {:>14}",
        bs(report.net.bs),
        usd(report.net.usd)
    );
    for fixed in &report.fixed_by_category {
        let _ = writeln!(out, "  fijo {:<11} {:>18}", fixed.category, bs(fixed.amount_bs));
    }
    let _ = writeln!(out, "  ganancia final   {:>18}", bs(report.final_bs));
}

pub fn profit(overall: &ProfitReport, groups: &[GroupProfit]) -> String {
    let mut out = String::new();
    profit_block(&mut out, "General", overall);
    for group in groups {
        let title = format!("Grupo {} ({} agencias)", group.group, group.agencies.len());
        profit_block(&mut out, &title, &group.report);
    }
    out.trim_end().to_string()
}

pub fn reviews(stats: &[AgencyReviewSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<38} {:>6} {:>10} {:>9} {:>11} {:>9} {:>9} {:>9}",
        "agencia", "total", "confirm.", "cuadr.", "descuadr.", "pend.", "aprob.", "rech."
    );
    for s in stats {
        let _ = writeln!(
            out,
            "{:<38} {:>6} {:>10} {:>9} {:>11} {:>9} {:>9} {:>9}",
            s.agency_id.to_string(),
            s.total_closures,
            s.confirmed,
            s.balanced,
            s.unbalanced,
            s.pending,
            s.approved,
            s.rejected,
        );
    }
    out.trim_end().to_string()
}

pub fn debts(balances: &[AgencyDebtBalance]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<38} {:>18} {:>18} {:>18} {:>14}",
        "agencia", "le deben", "debe", "balance", "balance USD"
    );
    for b in balances {
        let _ = writeln!(
            out,
            "{:<38} {:>18} {:>18} {:>18} {:>14}",
            b.agency_id.to_string(),
            bs(b.total_owed.bs),
            bs(b.total_owing.bs),
            bs(b.net_balance.bs),
            usd(b.net_balance.usd),
        );
    }
    out.trim_end().to_string()
}

pub fn payroll(report: &PayrollReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Nomina semana {} al {}, tasa {}",
        report.week.start, report.week.end, report.exchange_rate
    );
    for line in &report.lines {
        let e = &line.entry;
        let _ = writeln!(
            out,
            "  {:<22} {:>10} {:>10} {:>10} {:>10} {:>10} {:>12} {:>18}",
            line.name,
            usd(e.weekly_base_salary),
            usd(e.sunday_payment),
            usd(e.bonuses_extras),
            usd(e.absences_deductions),
            usd(e.other_deductions),
            usd(line.total_usd),
            bs(line.total_bs),
        );
    }
    let _ = write!(out, "TOTAL {} / {}", usd(report.total_usd), bs(report.total_bs));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bolivars_use_dot_thousands_and_comma_decimals() {
        assert_eq!(bs(Money::new(123_450)), "Bs 1.234,50");
        assert_eq!(bs(Money::new(-5)), "Bs -0,05");
        assert_eq!(bs(Money::new(100_000_000)), "Bs 1.000.000,00");
        assert_eq!(bs(Money::ZERO), "Bs 0,00");
    }

    #[test]
    fn dollars_use_comma_thousands() {
        assert_eq!(usd(Money::new(123_450)), "$1,234.50");
        assert_eq!(usd(Money::new(-99_999)), "-$999.99");
        assert_eq!(usd(Money::new(12_345_600)), "$123,456.00");
        assert_eq!(usd(Money::new(i64::MIN)), "-$92,233,720,368,547,758.08");
    }

    #[test]
    fn debts_show_the_net_balance() {
        let balance = AgencyDebtBalance {
            agency_id: uuid::Uuid::from_u128(1),
            total_owed: engine::MoneyAmount::ZERO,
            total_owing: engine::MoneyAmount::new(Money::from_units(1500), Money::ZERO),
            net_balance: engine::MoneyAmount::new(Money::from_units(-1500), Money::ZERO),
        };
        let text = debts(&[balance]);
        assert!(text.contains("Bs -1.500,00"));
        assert_eq!(text.lines().count(), 2);
    }
}
