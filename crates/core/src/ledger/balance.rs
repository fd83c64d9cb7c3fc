//! Wallet balance calculation.
//!
//! `available = total_earnings - (total_withdrawn + pending_withdrawals)`

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::earning::{CompletionRule, EarningRecord};
use super::withdrawal::{WithdrawalRecord, WithdrawalStatus};

/// A user's balance at a point in time. Computed, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSnapshot {
    /// Sum of earnings meeting the completion predicate.
    pub total_earnings: Decimal,
    /// Sum of completed withdrawals.
    pub total_withdrawn: Decimal,
    /// Sum of pending and requested withdrawals.
    pub pending_withdrawals: Decimal,
    /// What the user may still withdraw.
    pub available_balance: Decimal,
}

impl BalanceSnapshot {
    /// A wallet with no history.
    pub const ZERO: Self = Self {
        total_earnings: Decimal::ZERO,
        total_withdrawn: Decimal::ZERO,
        pending_withdrawals: Decimal::ZERO,
        available_balance: Decimal::ZERO,
    };

    /// Builds a snapshot from the three totals.
    #[must_use]
    pub fn from_totals(
        total_earnings: Decimal,
        total_withdrawn: Decimal,
        pending_withdrawals: Decimal,
    ) -> Self {
        Self {
            total_earnings,
            total_withdrawn,
            pending_withdrawals,
            available_balance: total_earnings - (total_withdrawn + pending_withdrawals),
        }
    }

    /// Aggregates earnings and withdrawals into a snapshot.
    #[must_use]
    pub fn compute(
        earnings: &[EarningRecord],
        withdrawals: &[WithdrawalRecord],
        rule: CompletionRule,
    ) -> Self {
        let total_earnings: Decimal = earnings
            .iter()
            .filter(|e| rule.is_complete(e))
            .map(|e| e.amount)
            .sum();

        let mut total_withdrawn = Decimal::ZERO;
        let mut pending_withdrawals = Decimal::ZERO;
        for withdrawal in withdrawals {
            match withdrawal.status {
                WithdrawalStatus::Completed => total_withdrawn += withdrawal.amount,
                WithdrawalStatus::Pending | WithdrawalStatus::Requested => {
                    pending_withdrawals += withdrawal.amount;
                }
                WithdrawalStatus::Rejected => {}
            }
        }

        Self::from_totals(total_earnings, total_withdrawn, pending_withdrawals)
    }

    /// Returns true if `amount` can be withdrawn without going negative.
    #[must_use]
    pub fn covers(&self, amount: Decimal) -> bool {
        amount <= self.available_balance
    }
}

impl Default for BalanceSnapshot {
    fn default() -> Self {
        Self::ZERO
    }
}
