//! Client for the personal-finance ledger API.

use chrono::NaiveDate;
use reqwest::Client;

use super::{check, malformed};
use crate::config::LedgerConfig;
use crate::error::Result;
use crate::models::{
    CategoriesResponse, Category, SplitResponse, SplitUpdate, TagUpdate, Transaction,
    TransactionsResponse,
};

const SERVICE: &str = "ledger";

pub struct LedgerClient {
    client: Client,
    config: LedgerConfig,
}

/// Outcome of a split update: applied with the ids of the new
/// sub-transactions, or rejected by the API with an error payload.
#[derive(Debug)]
pub enum SplitOutcome {
    Applied(Vec<u64>),
    Rejected(String),
}

impl LedgerClient {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1{}", self.config.base_url, path)
    }

    pub async fn categories(&self) -> Result<Vec<Category>> {
        let response = self
            .client
            .get(self.url("/categories"))
            .bearer_auth(&self.config.token)
            .send()
            .await?;
        let body: CategoriesResponse = check(response, SERVICE)
            .await?
            .json()
            .await
            .map_err(|e| malformed(SERVICE, e))?;
        Ok(body.categories)
    }

    /// Transactions in the inclusive date range.
    pub async fn transactions(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Transaction>> {
        let response = self
            .client
            .get(self.url("/transactions"))
            .query(&[
                ("start_date", start.to_string()),
                ("end_date", end.to_string()),
            ])
            .bearer_auth(&self.config.token)
            .send()
            .await?;
        let body: TransactionsResponse = check(response, SERVICE)
            .await?
            .json()
            .await
            .map_err(|e| malformed(SERVICE, e))?;
        Ok(body.transactions)
    }

    /// Replace a transaction with two categorized halves.
    pub async fn split_transaction(&self, id: u64, update: &SplitUpdate) -> Result<SplitOutcome> {
        let response = self
            .client
            .put(self.url(&format!("/transactions/{id}")))
            .bearer_auth(&self.config.token)
            .json(update)
            .send()
            .await?;
        let body: SplitResponse = check(response, SERVICE)
            .await?
            .json()
            .await
            .map_err(|e| malformed(SERVICE, e))?;

        if let Some(error) = body.error {
            return Ok(SplitOutcome::Rejected(error.to_string()));
        }
        match body.split {
            Some(children) => Ok(SplitOutcome::Applied(children)),
            None => Err(malformed(
                SERVICE,
                "split update response carried neither `split` nor `error`",
            )),
        }
    }

    /// Replace a transaction's tag set.
    pub async fn set_tags(&self, id: u64, tags: Vec<String>) -> Result<()> {
        let response = self
            .client
            .put(self.url(&format!("/transactions/{id}")))
            .bearer_auth(&self.config.token)
            .json(&TagUpdate::tags(tags))
            .send()
            .await?;
        check(response, SERVICE).await?;
        Ok(())
    }
}
