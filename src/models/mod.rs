//! Wire and domain types shared by the ledger and split-expense clients,
//! plus the pure helpers the runner is built from.

use std::collections::HashSet;

use chrono::{Days, Months, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Tag that marks a transaction for halving.
pub const SPLIT_TAG: &str = "split";
/// Tag that marks a transaction as fully paid by one party.
pub const REIMBURSE_TAG: &str = "reimburse";
/// Tag applied to the sub-transactions a split produces.
pub const CHILD_TAG: &str = "Split";
/// Ledger category the second half of every split is filed under.
pub const REIMBURSEMENT_CATEGORY: &str = "reimbursements";

// ============================================================================
// Ledger wire types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    pub name: String,
}

/// A ledger transaction. Read-only except for the fields we PUT back.
#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
    pub id: u64,
    #[serde(default)]
    pub payee: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub category_id: Option<u64>,
    // The ledger omits or nulls the tag list on untagged transactions.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<Tag>,
    pub parent_id: Option<u64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
}

impl Transaction {
    /// Normalized (lower-cased) tag names for membership tests.
    pub fn tag_names(&self) -> HashSet<String> {
        self.tags.iter().map(|t| t.name.to_lowercase()).collect()
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.name.eq_ignore_ascii_case(name))
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<Tag>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Tag>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Deserialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<Transaction>,
}

/// Body for `PUT /v1/transactions/{id}` that replaces the tag set.
#[derive(Debug, Serialize)]
pub struct TagUpdate {
    pub transaction: TransactionPatch,
}

#[derive(Debug, Serialize)]
pub struct TransactionPatch {
    pub tags: Vec<String>,
}

impl TagUpdate {
    pub fn tags(tags: Vec<String>) -> Self {
        Self {
            transaction: TransactionPatch { tags },
        }
    }
}

/// Body for `PUT /v1/transactions/{id}` that replaces the transaction with
/// two categorized halves.
#[derive(Debug, Serialize)]
pub struct SplitUpdate {
    pub split: [SplitHalf; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitHalf {
    pub category_id: Option<u64>,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

impl SplitUpdate {
    /// Halve a transaction in integer cents, any odd cent going to the first
    /// half. The first half keeps the original category, the second is filed
    /// under the reimbursement category.
    pub fn halve(tx: &Transaction, reimbursement_category: u64) -> Result<Self> {
        let cents = to_cents(tx.amount)?;
        let (first, second) = split_cents(cents);
        Ok(Self {
            split: [
                SplitHalf {
                    category_id: tx.category_id,
                    amount: from_cents(first),
                },
                SplitHalf {
                    category_id: Some(reimbursement_category),
                    amount: from_cents(second),
                },
            ],
        })
    }
}

/// Response to a split update: either the ids of the new sub-transactions or
/// an error payload.
#[derive(Debug, Deserialize)]
pub struct SplitResponse {
    #[serde(default)]
    pub split: Option<Vec<u64>>,
    #[serde(default)]
    pub error: Option<Value>,
}

// ============================================================================
// Split-expense wire types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SharedUser {
    pub id: u64,
    #[serde(default)]
    pub first_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CurrentUserResponse {
    pub user: SharedUser,
}

#[derive(Debug, Deserialize)]
pub struct GroupResponse {
    pub group: Group,
}

#[derive(Debug, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub members: Vec<SharedUser>,
}

/// The two members of the shared-expense group, resolved once per run.
#[derive(Debug, Clone, Copy)]
pub struct Participants {
    pub self_id: u64,
    pub partner_id: u64,
}

/// Body for `POST /create_expense`: either an equal split of the full cost or
/// explicit per-user shares.
#[derive(Debug, Serialize)]
pub struct ExpenseCreate {
    pub cost: String,
    pub description: String,
    pub group_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_equally: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<ExpenseShare>,
}

#[derive(Debug, Serialize)]
pub struct ExpenseShare {
    pub user_id: u64,
    pub paid_share: String,
    pub owed_share: String,
}

impl ExpenseCreate {
    pub fn split_equally(group_id: u64, description: &str, cost: Decimal) -> Self {
        Self {
            cost: format_cost(cost),
            description: description.to_string(),
            group_id,
            split_equally: Some(true),
            users: Vec::new(),
        }
    }

    /// `payer` covered the full cost and owes nothing; `ower` owes all of it.
    pub fn single_payer(
        group_id: u64,
        description: &str,
        cost: Decimal,
        payer: u64,
        ower: u64,
    ) -> Self {
        let cost = format_cost(cost);
        Self {
            cost: cost.clone(),
            description: description.to_string(),
            group_id,
            split_equally: None,
            users: vec![
                ExpenseShare {
                    user_id: payer,
                    paid_share: cost.clone(),
                    owed_share: format_cost(Decimal::ZERO),
                },
                ExpenseShare {
                    user_id: ower,
                    paid_share: format_cost(Decimal::ZERO),
                    owed_share: cost,
                },
            ],
        }
    }
}

/// The split-expense API reports failures with a 200 status and a non-empty
/// `errors` object.
#[derive(Debug, Deserialize)]
pub struct ExpenseCreated {
    #[serde(default)]
    pub errors: Option<Value>,
}

impl ExpenseCreated {
    pub fn error_message(&self) -> Option<String> {
        match &self.errors {
            None => None,
            Some(Value::Null) => None,
            Some(Value::Object(map)) if map.is_empty() => None,
            Some(value) => Some(value.to_string()),
        }
    }
}

// ============================================================================
// Pure helpers
// ============================================================================

/// Tagged transactions partitioned by what the run should do with them. A
/// transaction carrying both tags appears in both lists.
#[derive(Debug, Default)]
pub struct Partition {
    pub to_split: Vec<Transaction>,
    pub to_reimburse: Vec<Transaction>,
}

pub fn partition(transactions: Vec<Transaction>) -> Partition {
    let tagged: Vec<Transaction> = transactions
        .into_iter()
        .filter(|tx| !tx.tags.is_empty())
        .collect();

    let to_split = tagged
        .iter()
        .filter(|tx| tx.has_tag(SPLIT_TAG) && tx.parent_id.is_none())
        .cloned()
        .collect();
    let to_reimburse = tagged
        .iter()
        .filter(|tx| tx.has_tag(REIMBURSE_TAG))
        .cloned()
        .collect();

    Partition {
        to_split,
        to_reimburse,
    }
}

pub fn find_category<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
    categories.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}

/// First group member who is not `self_id`.
pub fn pick_partner(members: &[SharedUser], self_id: u64) -> Option<&SharedUser> {
    members.iter().find(|m| m.id != self_id)
}

/// First and last calendar day of the month, inclusive.
pub fn month_range(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| Error::Config(format!("invalid month {year}-{month:02}")))?;
    let last = first + Months::new(1) - Days::new(1);
    Ok((first, last))
}

pub fn to_cents(amount: Decimal) -> Result<i64> {
    (amount * Decimal::ONE_HUNDRED)
        .round()
        .to_i64()
        .ok_or_else(|| Error::InvalidAmount(amount.to_string()))
}

pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Halve a cent amount; for odd amounts the extra cent goes to the first half.
pub fn split_cents(cents: i64) -> (i64, i64) {
    let half = cents / 2;
    (cents - half, half)
}

fn format_cost(amount: Decimal) -> String {
    let mut cost = amount.round_dp(2);
    cost.rescale(2);
    cost.to_string()
}
