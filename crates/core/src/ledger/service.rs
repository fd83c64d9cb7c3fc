//! Balance computation and withdrawal authorization.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Serialize;
use tandem_shared::LedgerConfig;
use tandem_shared::types::UserId;
use tracing::{debug, info, warn};

use super::balance::BalanceSnapshot;
use super::earning::CompletionRule;
use super::error::LedgerError;
use super::repository::{EarningRepository, WithdrawalRepository};
use crate::payout::{PayoutDestination, PayoutError, PayoutGateway, PayoutInstruction};

/// A user's request to move funds out of the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalRequest {
    /// Wallet owner.
    pub user_id: UserId,
    /// Amount to withdraw.
    pub amount: Decimal,
    /// Where to send it.
    pub destination: PayoutDestination,
}

/// Result of an authorized withdrawal whose payout call returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithdrawalAuthorization {
    /// Wallet owner.
    pub user_id: UserId,
    /// Amount sent to the gateway.
    pub amount: Decimal,
    /// Validated destination.
    pub destination: PayoutDestination,
    /// Balance the request was checked against.
    pub balance_before: BalanceSnapshot,
    /// The gateway accepted and processed the operation.
    pub operation_success: bool,
    /// The funds transfer completed.
    pub transaction_success: bool,
    /// Gateway transaction reference.
    pub reference: Option<String>,
    /// Raw gateway response.
    pub raw: serde_json::Value,
}

/// Computes balances and gates withdrawals against them.
///
/// The ledger only reads earnings and withdrawals. Its single side effect is the
/// payout instruction sent once a request is authorized; recording the withdrawal
/// is left to the caller so nothing is persisted before the payout returns.
pub struct BalanceLedger<E, W, G> {
    earnings: Arc<E>,
    withdrawals: Arc<W>,
    gateway: Arc<G>,
    rule: CompletionRule,
    payout_timeout: Duration,
}

impl<E, W, G> BalanceLedger<E, W, G>
where
    E: EarningRepository,
    W: WithdrawalRepository,
    G: PayoutGateway,
{
    /// Creates a ledger over the given sources and gateway.
    #[must_use]
    pub fn new(
        earnings: Arc<E>,
        withdrawals: Arc<W>,
        gateway: Arc<G>,
        config: &LedgerConfig,
    ) -> Self {
        Self {
            earnings,
            withdrawals,
            gateway,
            rule: CompletionRule::from(config),
            payout_timeout: config.payout_timeout(),
        }
    }

    /// Computes the user's current balance.
    ///
    /// The three reads run concurrently and the first failure aborts the whole
    /// computation. A user with no history gets a zero snapshot.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::DataFetch` if any read fails.
    pub async fn compute_balance(&self, user_id: UserId) -> Result<BalanceSnapshot, LedgerError> {
        let (bookings, jobs, withdrawals) = tokio::try_join!(
            self.earnings.booking_earnings(user_id),
            self.earnings.job_earnings(user_id),
            self.withdrawals.list_for_user(user_id),
        )?;

        let earnings: Vec<_> = bookings.into_iter().chain(jobs).collect();
        let snapshot = BalanceSnapshot::compute(&earnings, &withdrawals, self.rule);

        debug!(
            user_id = %user_id,
            earnings = earnings.len(),
            withdrawals = withdrawals.len(),
            available = %snapshot.available_balance,
            "Computed balance"
        );

        Ok(snapshot)
    }

    /// Checks the request's amount and destination without touching any data.
    ///
    /// Returns the destination with its receiver in canonical form.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` or `InvalidAccount`.
    pub fn validate(&self, request: &WithdrawalRequest) -> Result<PayoutDestination, LedgerError> {
        if request.amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(request.amount));
        }

        request
            .destination
            .normalized()
            .ok_or_else(|| LedgerError::InvalidAccount {
                service: request.destination.service,
                receiver: request.destination.receiver.clone(),
            })
    }

    /// Authorizes a withdrawal against the current balance and executes the payout.
    ///
    /// Steps:
    /// 1. Validates the amount (positive)
    /// 2. Validates the destination for its rail
    /// 3. Computes the balance
    /// 4. Rejects requests above the available balance
    /// 5. Calls the payout gateway, bounded by the configured timeout
    ///
    /// Callers must serialize this per user (see [`crate::lock`]); the ledger
    /// does not lock on its own.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount`, `InvalidAccount`, `InsufficientBalance`,
    /// `DataFetch`, or `PaymentGateway` (including timeouts). Gateway errors are
    /// never retried here.
    pub async fn authorize_withdrawal(
        &self,
        request: &WithdrawalRequest,
    ) -> Result<WithdrawalAuthorization, LedgerError> {
        let destination = self.validate(request)?;
        let balance = self.compute_balance(request.user_id).await?;

        if !balance.covers(request.amount) {
            info!(
                user_id = %request.user_id,
                requested = %request.amount,
                available = %balance.available_balance,
                "Withdrawal rejected: insufficient balance"
            );
            return Err(LedgerError::InsufficientBalance {
                requested: request.amount,
                available: balance.available_balance,
            });
        }

        let instruction = PayoutInstruction {
            amount: request.amount,
            destination: destination.clone(),
            customer_id: request.user_id,
        };

        let receipt = match tokio::time::timeout(
            self.payout_timeout,
            self.gateway.execute_payout(&instruction),
        )
        .await
        {
            Ok(result) => result.inspect_err(|e| {
                warn!(user_id = %request.user_id, error = %e, "Payout call failed");
            })?,
            Err(_) => {
                warn!(
                    user_id = %request.user_id,
                    amount = %request.amount,
                    timeout_secs = self.payout_timeout.as_secs(),
                    "Payout call timed out, outcome unknown"
                );
                return Err(PayoutError::Timeout(self.payout_timeout).into());
            }
        };

        info!(
            user_id = %request.user_id,
            amount = %request.amount,
            service = %destination.service,
            operation_success = receipt.operation_success,
            transaction_success = receipt.transaction_success,
            "Payout executed"
        );

        Ok(WithdrawalAuthorization {
            user_id: request.user_id,
            amount: request.amount,
            destination,
            balance_before: balance,
            operation_success: receipt.operation_success,
            transaction_success: receipt.transaction_success,
            reference: receipt.reference,
            raw: receipt.raw,
        })
    }
}
