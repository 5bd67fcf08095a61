//! Reconciles one calendar month of shared-expense transactions between a
//! personal-finance ledger service and a split-expense service.
//!
//! The workflow is strictly sequential: resolve the participants and the
//! reimbursement category, fetch the month's transactions, partition them by
//! tag, then split, tag, log, and clear through the two external APIs. No
//! state is kept locally; everything lives in the remote services.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
