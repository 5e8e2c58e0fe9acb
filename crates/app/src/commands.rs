//! One handler per subcommand: load the snapshot, sanitize the flags, run the
//! engine and render the report.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use engine::{
    AgencyWeeklySummary, BalanceClassifier, CommissionRates, EngineError, EngineWarning,
    GroupProfit, Money, MoneyAmount, Percentage, ProfitReport, ReconciliationInput,
    WeekBoundaries, WeeklyClosureInput, WeeklyClosureReport, compute_commission_run,
    compute_group_profit, compute_profit, compute_reconciliation_with, compute_weekly_closure,
    compute_weekly_payroll, group_systems, latest_exchange_rate, net_inter_agency_debts,
    summarize_agency_week, summarize_reviews, summarize_system_commissions,
};
use serde::Serialize;

use crate::{
    cli::{
        BanqueoArgs, Command, PayrollArgs, ProfitArgs, ReconcileArgs, SnapshotArg, SystemsArgs,
        WeeklyArgs,
    },
    error::{AppError, Result},
    export, render,
    sanitize::{self, ClosureOverrides},
    settings::{OutputFormat, Settings},
    snapshot,
};

pub async fn run(settings: &Settings, command: Command) -> Result<String> {
    match command {
        Command::Reconcile(args) => reconcile(settings, args).await,
        Command::Banqueo(args) => banqueo(settings, args).await,
        Command::Systems(args) => systems(settings, args).await,
        Command::Commissions(args) => commissions(settings, args).await,
        Command::Weekly(args) => weekly(settings, args).await,
        Command::Profit(args) => profit(settings, args).await,
        Command::Review(args) => review(settings, args).await,
        Command::Debts(args) => debts(settings, args).await,
        Command::Payroll(args) => payroll(settings, args).await,
    }
}

fn emit<T: Serialize>(
    settings: &Settings,
    value: &T,
    text: impl FnOnce(&T) -> String,
) -> Result<String> {
    match settings.output {
        OutputFormat::Text => Ok(text(value)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
    }
}

fn log_warnings(warnings: &[EngineWarning]) {
    for warning in warnings {
        tracing::warn!("{warning}");
    }
}

fn classifier(settings: &Settings) -> Result<BalanceClassifier> {
    Ok(BalanceClassifier::new(settings.tolerance()?)?)
}

fn week_of(settings: &Settings, date: Option<NaiveDate>) -> Result<WeekBoundaries> {
    let date = match date {
        Some(date) => date,
        None => settings.today()?,
    };
    WeekBoundaries::containing(date)
        .ok_or_else(|| AppError::Input(format!("no week contains {date}")))
}

async fn reconcile(settings: &Settings, args: ReconcileArgs) -> Result<String> {
    let day = snapshot::load_day(&args.snapshot.snapshot).await?;
    let overrides = ClosureOverrides {
        exchange_rate: args.exchange_rate.as_deref(),
        cash_bs: args.cash_bs.as_deref(),
        cash_usd: args.cash_usd.as_deref(),
    };
    let input = ReconciliationInput {
        transactions: day.transactions(),
        closure: sanitize::closure(day.session.as_ref(), &overrides, settings.default_rate()?)?,
        total_banco_bs: sanitize::field("--banco", args.banco.as_deref())?,
        premios_por_pagar_bs: sanitize::field(
            "--premios-por-pagar",
            args.premios_por_pagar.as_deref(),
        )?,
    };

    let report = compute_reconciliation_with(&input, &classifier(settings)?)?;
    log_warnings(&report.warnings);
    tracing::info!(
        "reconciled {} records, diferencia final {}",
        report.totals.transaction_count,
        report.bolivar.diferencia_final
    );
    emit(settings, &report, render::reconciliation)
}

async fn banqueo(settings: &Settings, args: BanqueoArgs) -> Result<String> {
    let snap = snapshot::load_systems(&args.snapshot.snapshot).await?;
    let participation: Percentage = args.participation.parse()?;
    let rates: CommissionRates = snap.rates.into_iter().collect();

    let run = compute_commission_run(&snap.figures, &rates, participation)?;
    log_warnings(&run.warnings);
    if let Some(path) = &args.csv {
        export::write(path, export::banqueo_csv(&run)?).await?;
    }
    emit(settings, &run, render::commission_run)
}

async fn systems(settings: &Settings, args: SystemsArgs) -> Result<String> {
    let snap = snapshot::load_systems(&args.snapshot.snapshot).await?;
    let summary = group_systems(&snap.figures, &snap.systems)?;
    log_warnings(&summary.warnings);
    if let Some(path) = &args.csv {
        export::write(path, export::systems_csv(&summary)?).await?;
    }
    emit(settings, &summary, render::systems)
}

async fn commissions(settings: &Settings, args: SnapshotArg) -> Result<String> {
    let snap = snapshot::load_systems(&args.snapshot).await?;
    let rates: CommissionRates = snap.rates.into_iter().collect();
    let grouped = group_systems(&snap.figures, &snap.systems)?;
    let summary = summarize_system_commissions(&grouped, &rates)?;
    log_warnings(&summary.warnings);
    emit(settings, &summary, render::system_commissions)
}

#[derive(Serialize)]
struct WeeklyOutput<'a> {
    summary: &'a AgencyWeeklySummary,
    closure: &'a WeeklyClosureReport,
}

async fn weekly(settings: &Settings, args: WeeklyArgs) -> Result<String> {
    let week = week_of(settings, args.week_of)?;
    let snap = snapshot::load_week(&args.snapshot.snapshot).await?;
    let summary = summarize_agency_week(
        args.agency,
        week,
        &snap.details,
        &snap.expenses,
        &snap.closures,
        &snap.systems,
    )?;
    tracing::info!(
        "agency {} week {}..{}: {} systems, {} closure days",
        args.agency,
        week.start,
        week.end,
        summary.systems.len(),
        summary.closure_days
    );

    let mut exchange_rate = sanitize::rate(args.exchange_rate.as_deref())?;
    if exchange_rate.is_none() && summary.sunday_exchange_rate.is_none() {
        exchange_rate = settings.default_rate()?;
        if let Some(rate) = exchange_rate {
            tracing::info!("no Sunday rate for the week, applying configured default {rate}");
        }
    }
    let input = WeeklyClosureInput {
        cash_available: amounts(
            ("--cash-bs", args.cash_bs.as_deref()),
            ("--cash-usd", args.cash_usd.as_deref()),
        )?,
        exchange_rate,
        additional_amount: amounts(
            ("--additional-bs", args.additional_bs.as_deref()),
            ("--additional-usd", args.additional_usd.as_deref()),
        )?,
        apply_excess_usd: !args.no_excess_usd,
        total_banco_bs: sanitize::field("--banco", args.banco.as_deref())?,
        premios_por_pagar_bs: sanitize::field(
            "--premios-por-pagar",
            args.premios_por_pagar.as_deref(),
        )?,
    };

    let closure = compute_weekly_closure(&summary, &input, &classifier(settings)?)?;
    let output = WeeklyOutput {
        summary: &summary,
        closure: &closure,
    };
    emit(settings, &output, |out| render::weekly(out.summary, out.closure))
}

fn amounts(bs: (&str, Option<&str>), usd: (&str, Option<&str>)) -> Result<MoneyAmount> {
    Ok(MoneyAmount::new(
        sanitize::amount(bs.0, bs.1)?.unwrap_or(Money::ZERO),
        sanitize::amount(usd.0, usd.1)?.unwrap_or(Money::ZERO),
    ))
}

#[derive(Serialize)]
struct ProfitOutput {
    week: WeekBoundaries,
    overall: ProfitReport,
    groups: Vec<GroupProfit>,
}

async fn profit(settings: &Settings, args: ProfitArgs) -> Result<String> {
    let week = week_of(settings, args.week_of)?;
    let snap = snapshot::load_week(&args.snapshot.snapshot).await?;

    let agencies: BTreeSet<_> = snap
        .details
        .iter()
        .filter(|d| week.contains(d.transaction_date))
        .map(|d| d.agency_id)
        .chain(
            snap.expenses
                .iter()
                .filter(|e| week.contains(e.scope.transaction_date))
                .filter_map(|e| e.scope.agency_id),
        )
        .collect();
    let summaries = agencies
        .iter()
        .map(|&agency| {
            summarize_agency_week(
                agency,
                week,
                &snap.details,
                &snap.expenses,
                &snap.closures,
                &snap.systems,
            )
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;
    tracing::info!("computing profit for {} agencies", summaries.len());

    let fixed: Vec<_> = snap
        .fixed_expenses
        .into_iter()
        .filter(|e| week.contains(e.expense_date))
        .collect();
    let groups: HashMap<_, _> = snap
        .groups
        .into_iter()
        .map(|g| (g.agency_id, g.group))
        .collect();
    let rates: CommissionRates = snap.rates.into_iter().collect();

    let overall = compute_profit(&summaries, &rates, &fixed)?;
    log_warnings(&overall.warnings);
    let groups = compute_group_profit(&summaries, &groups, &rates, &fixed)?;
    let output = ProfitOutput {
        week,
        overall,
        groups,
    };
    emit(settings, &output, |out| render::profit(&out.overall, &out.groups))
}

async fn review(settings: &Settings, args: SnapshotArg) -> Result<String> {
    let closures = snapshot::load_cashier_closures(&args.snapshot).await?;
    let stats = summarize_reviews(&closures, &classifier(settings)?)?;
    emit(settings, &stats, |stats| render::reviews(stats))
}

async fn debts(settings: &Settings, args: SnapshotArg) -> Result<String> {
    let debts = snapshot::load_debts(&args.snapshot).await?;
    let balances = net_inter_agency_debts(&debts)?;
    tracing::info!("netted {} debts into {} agency balances", debts.len(), balances.len());
    emit(settings, &balances, |balances| render::debts(balances))
}

async fn payroll(settings: &Settings, args: PayrollArgs) -> Result<String> {
    let week = week_of(settings, args.week_of)?;
    let snap = snapshot::load_payroll(&args.snapshot.snapshot).await?;

    let exchange_rate = match sanitize::rate(args.exchange_rate.as_deref())? {
        Some(rate) => Some(rate),
        None => latest_exchange_rate(&snap.closures),
    };
    let exchange_rate = match exchange_rate {
        Some(rate) => rate,
        None => {
            let rate = settings.default_rate()?.ok_or_else(|| {
                EngineError::InvalidRate("no exchange rate for the payroll".to_string())
            })?;
            tracing::info!("no closure carries a rate, applying configured default {rate}");
            rate
        }
    };

    let report = compute_weekly_payroll(week, &snap.employees, &snap.entries, exchange_rate)?;
    tracing::info!(
        "payroll week {}..{}: {} employees, {}",
        week.start,
        week.end,
        report.lines.len(),
        report.total_usd
    );
    emit(settings, &report, render::payroll)
}
