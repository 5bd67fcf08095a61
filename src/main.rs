//! splitsync entry point.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use splitsync::config::{Cli, Config};
use splitsync::error::Result;
use splitsync::services::{LedgerClient, ReconciliationRunner, RunSummary, SharedExpenseClient};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // A failed run is reported on error output; the banner prints either way
    // and the process is not retried.
    match run(&cli).await {
        Ok(summary) => tracing::info!(
            split = summary.split,
            split_failed = summary.split_failed,
            reimbursed = summary.reimbursed,
            "reconciliation finished"
        ),
        Err(e) => tracing::error!(error = %e, "reconciliation aborted"),
    }
    println!("Done!");
}

async fn run(cli: &Cli) -> Result<RunSummary> {
    let config = Config::load(cli)?;

    // Log configuration without the tokens.
    tracing::info!(
        year = config.year,
        month = config.month,
        mode = ?config.mode,
        ledger_url = %config.ledger.base_url,
        split_url = %config.shared.base_url,
        group_id = config.shared.group_id,
        "configuration loaded"
    );

    let runner = ReconciliationRunner::new(
        LedgerClient::new(config.ledger.clone()),
        SharedExpenseClient::new(config.shared.clone()),
        config.mode,
    );
    runner.run(config.year, config.month).await
}
