//! Core wallet ledger logic for ResearchTandem.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence, locking and the payout provider are reached through traits that
//! the `db` and `gateway` crates implement.
//!
//! # Modules
//!
//! - `ledger` - Earnings, withdrawals, balance computation and withdrawal authorization
//! - `payout` - Payout rails, destination validation and the gateway capability
//! - `lock` - Per-user serialization of withdrawals

pub mod ledger;
pub mod lock;
pub mod payout;
