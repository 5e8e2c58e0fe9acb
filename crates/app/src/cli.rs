use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use uuid::Uuid;

use crate::settings::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "cuadre")]
#[command(about = "Cash reconciliation for lottery agencies")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Overrides applied on top of the config file and the environment.
#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Output format.
    #[arg(long, global = true, value_enum)]
    pub output: Option<OutputFormat>,
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub level: Option<String>,
    /// Timezone used to pick "today" (IANA name).
    #[arg(long, global = true)]
    pub timezone: Option<String>,
    /// Balanced/unbalanced tolerance in bolívars.
    #[arg(long, global = true)]
    pub tolerance_bs: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Daily closure of one session or agency day.
    Reconcile(ReconcileArgs),
    /// Commission and participation split per lottery system.
    Banqueo(BanqueoArgs),
    /// Sales and prizes per root lottery system.
    Systems(SystemsArgs),
    /// Commission owed per root lottery system.
    Commissions(SnapshotArg),
    /// Weekly closure of an agency.
    Weekly(WeeklyArgs),
    /// Profit over a week, overall and per agency group.
    Profit(ProfitArgs),
    /// Supervisor review statistics per agency.
    Review(SnapshotArg),
    /// Net position of each agency across inter-agency debts.
    Debts(SnapshotArg),
    /// Weekly employee payroll in dollars and bolívars.
    Payroll(PayrollArgs),
}

#[derive(Args, Debug)]
pub struct SnapshotArg {
    /// Directory holding the JSON snapshot files.
    #[arg(long)]
    pub snapshot: PathBuf,
}

#[derive(Args, Debug)]
pub struct ReconcileArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArg,
    /// Bolívars per dollar; replaces the session's rate.
    #[arg(long)]
    pub exchange_rate: Option<String>,
    /// Cash counted in bolívars; replaces the session's figure.
    #[arg(long)]
    pub cash_bs: Option<String>,
    /// Cash counted in dollars; replaces the session's figure.
    #[arg(long)]
    pub cash_usd: Option<String>,
    /// Bank total typed by the operator instead of the derived one.
    #[arg(long)]
    pub banco: Option<String>,
    /// Pending prizes typed by the operator instead of the derived ones.
    #[arg(long)]
    pub premios_por_pagar: Option<String>,
}

#[derive(Args, Debug)]
pub struct BanqueoArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArg,
    /// Participation percentage shared by every system (0-100).
    #[arg(long)]
    pub participation: String,
    /// Also write the per-system rows to this CSV file.
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SystemsArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArg,
    /// Also write the grouped rows to this CSV file.
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct WeeklyArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArg,
    #[arg(long)]
    pub agency: Uuid,
    /// Any day of the week to close; defaults to today.
    #[arg(long)]
    pub week_of: Option<NaiveDate>,
    /// Bolívars per dollar; defaults to the Sunday closure's rate.
    #[arg(long)]
    pub exchange_rate: Option<String>,
    #[arg(long)]
    pub cash_bs: Option<String>,
    #[arg(long)]
    pub cash_usd: Option<String>,
    #[arg(long)]
    pub additional_bs: Option<String>,
    #[arg(long)]
    pub additional_usd: Option<String>,
    /// Leave the USD excess out of the bolívar sumatoria.
    #[arg(long)]
    pub no_excess_usd: bool,
    #[arg(long)]
    pub banco: Option<String>,
    #[arg(long)]
    pub premios_por_pagar: Option<String>,
}

#[derive(Args, Debug)]
pub struct ProfitArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArg,
    /// Any day of the week; defaults to today.
    #[arg(long)]
    pub week_of: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct PayrollArgs {
    #[command(flatten)]
    pub snapshot: SnapshotArg,
    /// Any day of the week; defaults to today.
    #[arg(long)]
    pub week_of: Option<NaiveDate>,
    /// Bolívars per dollar; defaults to the latest closure's rate.
    #[arg(long)]
    pub exchange_rate: Option<String>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_weekly_with_globals_after_subcommand() {
        let cli = Cli::try_parse_from([
            "cuadre",
            "weekly",
            "--snapshot",
            "data",
            "--agency",
            "00000000-0000-0000-0000-000000000001",
            "--week-of",
            "2025-03-12",
            "--no-excess-usd",
            "--output",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.global.output, Some(OutputFormat::Json));
        let Command::Weekly(args) = cli.command else {
            panic!("expected weekly");
        };
        assert!(args.no_excess_usd);
        assert_eq!(args.week_of, NaiveDate::from_ymd_opt(2025, 3, 12));
    }

    #[test]
    fn parses_payroll() {
        let cli = Cli::try_parse_from([
            "cuadre",
            "payroll",
            "--snapshot",
            "data",
            "--exchange-rate",
            "36.50",
        ])
        .unwrap();
        let Command::Payroll(args) = cli.command else {
            panic!("expected payroll");
        };
        assert_eq!(args.exchange_rate.as_deref(), Some("36.50"));
        assert!(args.week_of.is_none());
    }
}
