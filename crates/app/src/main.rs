use std::process::ExitCode;

use clap::Parser;

mod cli;
mod commands;
mod error;
mod export;
mod render;
mod sanitize;
mod settings;
mod snapshot;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    let settings = match settings::Settings::load(&cli.global) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(err.exit_code());
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "cuadre={level},engine={level}",
            level = settings.level
        ))
        .with_writer(std::io::stderr)
        .init();

    match commands::run(&settings, cli.command).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
