//! The sequential reconciliation pipeline.
//!
//! One run resolves the participants and the reimbursement category, fetches
//! the month's transactions, partitions them by tag, then walks the two lists
//! performing one awaited call at a time. Mutating calls are gated by the run
//! [`Mode`]: described in dry-run, performed in live, prompted in confirm.

use std::io::{self, BufRead, Write};

use crate::config::Mode;
use crate::error::{Error, Result};
use crate::models::{
    self, ExpenseCreate, Participants, Partition, SplitUpdate, Transaction, CHILD_TAG,
    REIMBURSEMENT_CATEGORY,
};
use crate::services::{LedgerClient, SharedExpenseClient, SplitOutcome};

pub struct ReconciliationRunner {
    ledger: LedgerClient,
    shared: SharedExpenseClient,
    mode: Mode,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub split: usize,
    pub split_failed: usize,
    pub reimbursed: usize,
}

/// What the mode gate decided for one mutating action.
enum Gate {
    Proceed,
    Simulate,
    Skip,
}

impl ReconciliationRunner {
    pub fn new(ledger: LedgerClient, shared: SharedExpenseClient, mode: Mode) -> Self {
        Self {
            ledger,
            shared,
            mode,
        }
    }

    pub async fn run(&self, year: i32, month: u32) -> Result<RunSummary> {
        let (start, end) = models::month_range(year, month)?;
        tracing::info!(%start, %end, mode = ?self.mode, "running reconciliation");

        let participants = self.resolve_participants().await?;
        let reimbursement_category = self.resolve_reimbursement_category().await?;
        let transactions = self.ledger.transactions(start, end).await?;
        let Partition {
            to_split,
            to_reimburse,
        } = models::partition(transactions);

        tracing::info!(
            to_split = to_split.len(),
            to_reimburse = to_reimburse.len(),
            "partitioned tagged transactions"
        );

        let mut summary = RunSummary::default();

        for tx in &to_split {
            tracing::info!(
                payee = %tx.payee,
                amount = %tx.amount,
                original_name = tx.original_name.as_deref().unwrap_or(""),
                "splitting transaction"
            );
            if self.split_transaction(tx, reimbursement_category).await? {
                self.log_external_expense(&participants, tx, true).await?;
                summary.split += 1;
            } else {
                summary.split_failed += 1;
            }
        }

        for tx in &to_reimburse {
            tracing::info!(
                payee = %tx.payee,
                amount = %tx.amount,
                original_name = tx.original_name.as_deref().unwrap_or(""),
                "reimbursing transaction"
            );
            // Log before clearing: a crash mid-run must not leave an expense
            // cleared in the ledger but absent from the split ledger.
            self.log_external_expense(&participants, tx, false).await?;
            self.mark_reimbursed(tx).await?;
            summary.reimbursed += 1;
        }

        Ok(summary)
    }

    async fn resolve_participants(&self) -> Result<Participants> {
        let me = self.shared.current_user().await?;
        let members = self.shared.group_members().await?;
        let partner = models::pick_partner(&members, me.id).ok_or_else(|| {
            Error::NotFound("split-expense group has no member besides the current user".to_string())
        })?;
        Ok(Participants {
            self_id: me.id,
            partner_id: partner.id,
        })
    }

    async fn resolve_reimbursement_category(&self) -> Result<u64> {
        let categories = self.ledger.categories().await?;
        let category = models::find_category(&categories, REIMBURSEMENT_CATEGORY)
            .ok_or_else(|| {
                Error::NotFound(format!("no ledger category named {REIMBURSEMENT_CATEGORY:?}"))
            })?;
        Ok(category.id)
    }

    /// Split one transaction into two categorized halves and tag the
    /// resulting children. Returns whether the split took effect (or was
    /// simulated), so the caller knows to log it downstream; an error payload
    /// from the API fails only this transaction.
    pub async fn split_transaction(
        &self,
        tx: &Transaction,
        reimbursement_category: u64,
    ) -> Result<bool> {
        let update = SplitUpdate::halve(tx, reimbursement_category)?;
        let action = format!(
            "split transaction {} ({} {}) into {} + {}",
            tx.id, tx.payee, tx.amount, update.split[0].amount, update.split[1].amount
        );
        match self.gate(&action)? {
            Gate::Simulate => return Ok(true),
            Gate::Skip => return Ok(false),
            Gate::Proceed => {}
        }

        match self.ledger.split_transaction(tx.id, &update).await? {
            SplitOutcome::Applied(children) => {
                for child in children {
                    self.tag_child(child).await?;
                }
                Ok(true)
            }
            SplitOutcome::Rejected(message) => {
                tracing::warn!(
                    transaction = tx.id,
                    %message,
                    "ledger rejected split, skipping child tagging and external log"
                );
                Ok(false)
            }
        }
    }

    async fn tag_child(&self, child: u64) -> Result<()> {
        let action = format!("tag sub-transaction {child} with {CHILD_TAG:?}");
        match self.gate(&action)? {
            Gate::Proceed => self.ledger.set_tags(child, vec![CHILD_TAG.to_string()]).await,
            Gate::Simulate | Gate::Skip => Ok(()),
        }
    }

    /// Clear the tag set on a reimbursement-tagged transaction. No-op when
    /// there is nothing to clear.
    pub async fn mark_reimbursed(&self, tx: &Transaction) -> Result<()> {
        if tx.tags.is_empty() {
            tracing::debug!(transaction = tx.id, "tag set already empty");
            return Ok(());
        }
        let action = format!("clear tags on transaction {} ({})", tx.id, tx.payee);
        match self.gate(&action)? {
            Gate::Proceed => self.ledger.set_tags(tx.id, Vec::new()).await,
            Gate::Simulate | Gate::Skip => Ok(()),
        }
    }

    /// Record the expense in the external split ledger: an equal split of the
    /// full amount when the transaction was split, otherwise a single-payer
    /// expense fully owed by the partner.
    pub async fn log_external_expense(
        &self,
        participants: &Participants,
        tx: &Transaction,
        was_split: bool,
    ) -> Result<()> {
        let expense = if was_split {
            ExpenseCreate::split_equally(self.shared.group_id(), &tx.payee, tx.amount)
        } else {
            ExpenseCreate::single_payer(
                self.shared.group_id(),
                &tx.payee,
                tx.amount,
                participants.self_id,
                participants.partner_id,
            )
        };
        let kind = if was_split { "equally-split" } else { "single-payer" };
        let action = format!(
            "record {kind} expense {} ({} {})",
            tx.id, tx.payee, expense.cost
        );
        match self.gate(&action)? {
            Gate::Proceed => self.shared.create_expense(&expense).await,
            Gate::Simulate | Gate::Skip => Ok(()),
        }
    }

    fn gate(&self, action: &str) -> Result<Gate> {
        match self.mode {
            Mode::DryRun => {
                tracing::info!("[dry-run] would {action}");
                Ok(Gate::Simulate)
            }
            Mode::Live => Ok(Gate::Proceed),
            Mode::Confirm => {
                if prompt(action)? {
                    Ok(Gate::Proceed)
                } else {
                    tracing::info!("skipped: {action}");
                    Ok(Gate::Skip)
                }
            }
        }
    }
}

fn prompt(action: &str) -> Result<bool> {
    let mut stderr = io::stderr();
    write!(stderr, "{action}? [y/N] ")?;
    stderr.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let answer = line.trim();
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}
