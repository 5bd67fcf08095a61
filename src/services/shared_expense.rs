//! Client for the external split-expense ledger API.

use reqwest::Client;

use super::{check, malformed};
use crate::config::SharedExpenseConfig;
use crate::error::{Error, Result};
use crate::models::{
    CurrentUserResponse, ExpenseCreate, ExpenseCreated, GroupResponse, SharedUser,
};

const SERVICE: &str = "split-expense";

pub struct SharedExpenseClient {
    client: Client,
    config: SharedExpenseConfig,
}

impl SharedExpenseClient {
    pub fn new(config: SharedExpenseConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn group_id(&self) -> u64 {
        self.config.group_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    pub async fn current_user(&self) -> Result<SharedUser> {
        let response = self
            .client
            .get(self.url("/get_current_user"))
            .bearer_auth(&self.config.token)
            .send()
            .await?;
        let body: CurrentUserResponse = check(response, SERVICE)
            .await?
            .json()
            .await
            .map_err(|e| malformed(SERVICE, e))?;
        Ok(body.user)
    }

    pub async fn group_members(&self) -> Result<Vec<SharedUser>> {
        let response = self
            .client
            .get(self.url(&format!("/get_group/{}", self.config.group_id)))
            .bearer_auth(&self.config.token)
            .send()
            .await?;
        let body: GroupResponse = check(response, SERVICE)
            .await?
            .json()
            .await
            .map_err(|e| malformed(SERVICE, e))?;
        Ok(body.group.members)
    }

    /// Record an expense. The API reports failures with a 200 status and a
    /// non-empty `errors` object.
    pub async fn create_expense(&self, expense: &ExpenseCreate) -> Result<()> {
        let response = self
            .client
            .post(self.url("/create_expense"))
            .bearer_auth(&self.config.token)
            .json(expense)
            .send()
            .await?;
        let body: ExpenseCreated = check(response, SERVICE)
            .await?
            .json()
            .await
            .map_err(|e| malformed(SERVICE, e))?;

        match body.error_message() {
            Some(message) => Err(Error::Remote {
                service: SERVICE,
                message,
            }),
            None => Ok(()),
        }
    }
}
