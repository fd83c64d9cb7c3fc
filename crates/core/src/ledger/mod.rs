//! Wallet ledger.
//!
//! This module implements the withdrawal side of the marketplace:
//! - Earning records and the completion predicate
//! - Withdrawal records and their lifecycle
//! - Balance snapshots derived from both
//! - Repository traits for the underlying tables
//! - Balance computation and withdrawal authorization
//! - Per-user serialized withdrawal processing

pub mod balance;
pub mod earning;
pub mod error;
pub mod processor;
pub mod repository;
pub mod service;
pub mod withdrawal;

#[cfg(test)]
mod balance_props;
#[cfg(test)]
mod mocks;

pub use balance::BalanceSnapshot;
pub use earning::{CompletionRule, EarningRecord, EarningSource, EarningStatus};
pub use error::LedgerError;
pub use processor::{WithdrawalOutcome, WithdrawalService, needs_reconciliation};
pub use repository::{EarningRepository, WithdrawalRepository};
pub use service::{BalanceLedger, WithdrawalAuthorization, WithdrawalRequest};
pub use withdrawal::{NewWithdrawal, Settlement, WithdrawalRecord, WithdrawalStatus};
