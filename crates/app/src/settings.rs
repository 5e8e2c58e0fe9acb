//! Settings for the `cuadre` binary.
//!
//! Sources, lowest priority first: the TOML file (`config/cuadre.toml` unless
//! `--config` says otherwise, optional), `CUADRE_*` environment variables,
//! then command-line flags.

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use engine::{ExchangeRate, Money};
use serde::Deserialize;

use crate::{
    cli::GlobalArgs,
    error::{AppError, Result},
};

const DEFAULT_CONFIG_PATH: &str = "config/cuadre.toml";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub level: String,
    pub timezone: String,
    /// Rate used when the operator leaves it blank. Unset means a blank rate
    /// is an error.
    pub default_exchange_rate: Option<String>,
    pub tolerance_bs: String,
    pub output: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            timezone: "America/Caracas".to_string(),
            default_exchange_rate: None,
            tolerance_bs: "100.00".to_string(),
            output: OutputFormat::Text,
        }
    }
}

impl Settings {
    pub fn load(args: &GlobalArgs) -> Result<Self> {
        let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        let mut builder = config::Config::builder();
        builder = builder.add_source(config::File::with_name(config_path).required(false));
        builder = builder.add_source(config::Environment::with_prefix("CUADRE"));
        let mut settings: Settings = builder.build()?.try_deserialize()?;

        if let Some(level) = &args.level {
            settings.level = level.clone();
        }
        if let Some(timezone) = &args.timezone {
            settings.timezone = timezone.clone();
        }
        if let Some(tolerance) = &args.tolerance_bs {
            settings.tolerance_bs = tolerance.clone();
        }
        if let Some(output) = args.output {
            settings.output = output;
        }

        Ok(settings)
    }

    pub fn tolerance(&self) -> Result<Money> {
        self.tolerance_bs
            .parse()
            .map_err(|err| AppError::Setting(format!("tolerance_bs: {err}")))
    }

    pub fn default_rate(&self) -> Result<Option<ExchangeRate>> {
        match self.default_exchange_rate.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|err| AppError::Setting(format!("default_exchange_rate: {err}"))),
        }
    }

    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|err| AppError::Setting(format!("timezone '{}': {err}", self.timezone)))
    }

    /// Today's date in the configured timezone.
    pub fn today(&self) -> Result<NaiveDate> {
        Ok(Utc::now().with_timezone(&self.tz()?).date_naive())
    }
}
