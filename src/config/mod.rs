//! Run configuration: CLI arguments plus environment secrets, resolved once
//! at startup into an immutable [`Config`] passed into the runner.

use std::env;

use chrono::{Datelike, Local};
use clap::Parser;

use crate::error::{Error, Result};

#[derive(Parser, Debug)]
#[command(
    name = "splitsync",
    version,
    about = "Reconcile one month of shared-expense transactions between the \
             ledger and the split-expense service"
)]
pub struct Cli {
    /// Month to process (1-12, defaults to the current month)
    #[arg(long)]
    pub month: Option<u32>,

    /// Year to process (defaults to the current year)
    #[arg(long)]
    pub year: Option<i32>,

    /// Perform mutating calls instead of the default dry-run
    #[arg(long)]
    pub live: bool,

    /// Ask before each mutating call (implies --live)
    #[arg(long)]
    pub confirm: bool,
}

/// How mutating calls are handled for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Reads happen, mutations are only described.
    DryRun,
    /// Mutations are performed.
    Live,
    /// Mutations are performed after an interactive prompt.
    Confirm,
}

impl Mode {
    pub fn is_dry_run(self) -> bool {
        matches!(self, Mode::DryRun)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub year: i32,
    pub month: u32,
    pub mode: Mode,
    pub ledger: LedgerConfig,
    pub shared: SharedExpenseConfig,
}

#[derive(Debug, Clone)]
pub struct LedgerConfig {
    pub base_url: String,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct SharedExpenseConfig {
    pub base_url: String,
    pub token: String,
    pub group_id: u64,
}

impl Config {
    pub fn load(cli: &Cli) -> Result<Self> {
        let today = Local::now().date_naive();

        let month = cli.month.unwrap_or_else(|| today.month());
        if !(1..=12).contains(&month) {
            return Err(Error::Config(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }

        let mode = if cli.confirm {
            Mode::Confirm
        } else if cli.live {
            Mode::Live
        } else {
            Mode::DryRun
        };

        let group_id = required("SPLIT_GROUP_ID")?
            .parse()
            .map_err(|_| Error::Config("SPLIT_GROUP_ID must be a numeric id".to_string()))?;

        Ok(Self {
            year: cli.year.unwrap_or_else(|| today.year()),
            month,
            mode,
            ledger: LedgerConfig {
                base_url: env::var("LEDGER_BASE_URL")
                    .unwrap_or_else(|_| "https://dev.lunchmoney.app".to_string()),
                token: required("LEDGER_API_TOKEN")?,
            },
            shared: SharedExpenseConfig {
                base_url: env::var("SPLIT_BASE_URL")
                    .unwrap_or_else(|_| "https://secure.splitwise.com/api/v3.0".to_string()),
                token: required("SPLIT_API_TOKEN")?,
                group_id,
            },
        })
    }
}

fn required(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("{name} is required")))
}
