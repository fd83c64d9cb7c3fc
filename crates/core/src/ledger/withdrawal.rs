//! Withdrawal records and their lifecycle.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tandem_shared::types::{UserId, WithdrawalId};

use crate::payout::PayoutService;

/// Lifecycle status of a withdrawal.
///
/// ```text
/// requested ──► pending ──► completed
///     │            │
///     └────────────┴──────► rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalStatus {
    /// Accepted by the gateway, settlement outstanding.
    Pending,
    /// Requested but not yet submitted.
    Requested,
    /// Funds left the platform.
    Completed,
    /// The payout did not happen.
    Rejected,
}

impl WithdrawalStatus {
    /// Returns the status string used in storage and APIs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Requested => "requested",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }

    /// Returns true while the amount is reserved but not yet paid out.
    #[must_use]
    pub const fn is_in_flight(self) -> bool {
        matches!(self, Self::Pending | Self::Requested)
    }

    /// Returns true once the status can no longer change.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Rejected)
    }

    /// Returns true if a record may move from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Requested, Self::Pending)
                | (Self::Requested | Self::Pending, Self::Completed | Self::Rejected)
        )
    }
}

impl std::fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WithdrawalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "requested" => Ok(Self::Requested),
            "completed" => Ok(Self::Completed),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("Unknown withdrawal status: {s}")),
        }
    }
}

/// Final outcome of an in-flight withdrawal, reported by settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Settlement {
    /// Funds were delivered.
    Completed,
    /// Funds were not delivered.
    Rejected,
}

impl Settlement {
    /// Status a settled record moves to.
    #[must_use]
    pub const fn status(self) -> WithdrawalStatus {
        match self {
            Self::Completed => WithdrawalStatus::Completed,
            Self::Rejected => WithdrawalStatus::Rejected,
        }
    }
}

/// A persisted withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalRecord {
    /// Record ID.
    pub id: WithdrawalId,
    /// Owner of the wallet.
    pub user_id: UserId,
    /// Withdrawn amount.
    pub amount: Decimal,
    /// Current status.
    pub status: WithdrawalStatus,
    /// Payout rail.
    pub service: PayoutService,
    /// Payout phone number.
    pub receiver: String,
    /// Gateway transaction reference.
    pub gateway_reference: Option<String>,
    /// The gateway outcome is unknown and needs manual reconciliation.
    pub needs_reconciliation: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last status change.
    pub updated_at: DateTime<Utc>,
}

/// Input for persisting a withdrawal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWithdrawal {
    /// Owner of the wallet.
    pub user_id: UserId,
    /// Withdrawn amount.
    pub amount: Decimal,
    /// Initial status.
    pub status: WithdrawalStatus,
    /// Payout rail.
    pub service: PayoutService,
    /// Payout phone number.
    pub receiver: String,
    /// Gateway transaction reference.
    pub gateway_reference: Option<String>,
    /// The gateway outcome is unknown.
    pub needs_reconciliation: bool,
}
