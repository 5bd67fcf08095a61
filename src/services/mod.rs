pub mod ledger;
pub mod runner;
pub mod shared_expense;

pub use ledger::{LedgerClient, SplitOutcome};
pub use runner::{ReconciliationRunner, RunSummary};
pub use shared_expense::SharedExpenseClient;

use crate::error::{Error, Result};

/// Map a non-success status to a remote error, reading the body for context.
async fn check(response: reqwest::Response, service: &'static str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Remote {
        service,
        message: format!("status {status}: {body}"),
    })
}

fn malformed(service: &'static str, message: impl std::fmt::Display) -> Error {
    Error::MalformedResponse {
        service,
        message: message.to_string(),
    }
}
