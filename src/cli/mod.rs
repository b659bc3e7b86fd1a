//! `spend_control_cli`: read a snapshot and print control progress and dashboard summaries.

pub mod handlers;
pub mod output;
pub mod table;

use std::path::PathBuf;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};

use crate::core::errors::CliError;
use crate::domain::{common::parse_timestamp, ReportRange};

#[derive(Parser, Debug)]
#[command(name = "spend_control_cli")]
#[command(about = "Spending-control progress and dashboard summaries")]
pub struct Cli {
    /// Application directory (also read from `SPEND_CONTROL_HOME`).
    #[arg(long, global = true, env = "SPEND_CONTROL_HOME")]
    pub home: Option<PathBuf>,

    /// Snapshot file; defaults to `snapshot.json` inside the application directory.
    #[arg(long, global = true, env = "SPEND_CONTROL_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Reference instant (RFC 3339 or `YYYY-MM-DD`); defaults to now.
    #[arg(long, global = true)]
    pub date: Option<String>,

    /// Print JSON instead of tables.
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable coloured output.
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Progress of every live control, or of one control.
    Progress(ProgressArgs),
    /// Controls closest to (or past) their limits.
    AtRisk(AtRiskArgs),
    /// Income, expense and balance for a range with change against the previous range.
    Finance(RangeArgs),
    /// Expense split by payment type.
    Payments(RangeArgs),
    /// Expense split by category.
    Categories(RangeArgs),
    /// Income split by source.
    Income(RangeArgs),
    /// Current statement cycle of a credit card.
    Card(CardArgs),
    /// Show or change stored preferences.
    Config(ConfigArgs),
    /// Build information.
    Version,
}

#[derive(Args, Debug)]
pub struct ProgressArgs {
    /// Only this control.
    #[arg(long)]
    pub control: Option<String>,
}

#[derive(Args, Debug)]
pub struct AtRiskArgs {
    /// Number of controls to list; defaults to the configured `top_n`.
    #[arg(long)]
    pub top: Option<usize>,
}

#[derive(Args, Debug)]
pub struct RangeArgs {
    /// The last N days up to the reference date.
    #[arg(long, conflicts_with = "month")]
    pub days: Option<u32>,
    /// A calendar month as `YYYY-MM`.
    #[arg(long)]
    pub month: Option<String>,
}

#[derive(Args, Debug)]
pub struct CardArgs {
    pub card_id: String,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    Show,
    Set { key: String, value: String },
    Path,
}

const DEFAULT_RANGE_DAYS: u32 = 30;

impl RangeArgs {
    pub fn report_range(&self) -> Result<ReportRange, CliError> {
        if let Some(raw) = self.month.as_deref() {
            return parse_month(raw);
        }
        Ok(ReportRange::LastDays {
            days: self.days.unwrap_or(DEFAULT_RANGE_DAYS),
        })
    }
}

fn parse_month(raw: &str) -> Result<ReportRange, CliError> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", raw.trim()), "%Y-%m-%d")
        .map_err(|_| CliError::Input(format!("expected YYYY-MM, got `{raw}`")))?;
    Ok(ReportRange::Month {
        year: first.year(),
        month: first.month(),
    })
}

pub fn parse_reference(raw: &str) -> Result<DateTime<Utc>, CliError> {
    parse_timestamp(raw).ok_or_else(|| CliError::Input(format!("unrecognised date `{raw}`")))
}

pub fn run_cli() -> Result<(), CliError> {
    handlers::run(Cli::parse())
}
