//! Withdrawal processing: the only code path that mutates wallet state.
//!
//! Every withdrawal runs under the owner's [`WithdrawalLock`]:
//!
//! ```text
//! lock(user) ─► compute balance ─► check ─► payout ─► record ─► unlock
//! ```
//!
//! The record is written only after the payout call returns, so a failed call
//! never leaves a phantom pending withdrawal that locks funds.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tandem_shared::LedgerConfig;
use tandem_shared::types::{PageRequest, PageResponse, UserId, WithdrawalId};
use tracing::{error, info, warn};

use super::balance::BalanceSnapshot;
use super::error::LedgerError;
use super::repository::{EarningRepository, WithdrawalRepository};
use super::service::{BalanceLedger, WithdrawalAuthorization, WithdrawalRequest};
use super::withdrawal::{NewWithdrawal, Settlement, WithdrawalRecord, WithdrawalStatus};
use crate::lock::WithdrawalLock;
use crate::payout::PayoutGateway;

/// A processed withdrawal and the record written for it.
#[derive(Debug, Clone, Serialize)]
pub struct WithdrawalOutcome {
    /// What the gateway reported.
    pub authorization: WithdrawalAuthorization,
    /// The persisted withdrawal.
    pub record: WithdrawalRecord,
}

impl WithdrawalOutcome {
    /// Status a freshly authorized withdrawal is recorded with.
    #[must_use]
    pub const fn initial_status(authorization: &WithdrawalAuthorization) -> WithdrawalStatus {
        match (authorization.operation_success, authorization.transaction_success) {
            (true, true) => WithdrawalStatus::Completed,
            (true, false) => WithdrawalStatus::Pending,
            (false, _) => WithdrawalStatus::Rejected,
        }
    }
}

/// Serializes, authorizes and records withdrawals.
pub struct WithdrawalService<E, W, G, L> {
    ledger: BalanceLedger<E, W, G>,
    withdrawals: Arc<W>,
    locks: Arc<L>,
    lock_timeout: Duration,
}

impl<E, W, G, L> WithdrawalService<E, W, G, L>
where
    E: EarningRepository,
    W: WithdrawalRepository,
    G: PayoutGateway,
    L: WithdrawalLock,
{
    /// Creates a withdrawal service.
    #[must_use]
    pub fn new(
        earnings: Arc<E>,
        withdrawals: Arc<W>,
        gateway: Arc<G>,
        locks: Arc<L>,
        config: &LedgerConfig,
    ) -> Self {
        Self {
            ledger: BalanceLedger::new(earnings, Arc::clone(&withdrawals), gateway, config),
            withdrawals,
            locks,
            lock_timeout: config.lock_timeout(),
        }
    }

    /// The underlying ledger.
    #[must_use]
    pub const fn ledger(&self) -> &BalanceLedger<E, W, G> {
        &self.ledger
    }

    /// Current balance of a user. Read-only, takes no lock.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::DataFetch` if any read fails.
    pub async fn balance(&self, user_id: UserId) -> Result<BalanceSnapshot, LedgerError> {
        self.ledger.compute_balance(user_id).await
    }

    /// One page of a user's withdrawal history, newest first.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::DataFetch` if the read fails.
    pub async fn list_withdrawals(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<PageResponse<WithdrawalRecord>, LedgerError> {
        self.withdrawals
            .page_for_user(user_id, page.normalized())
            .await
    }

    /// Processes a withdrawal request end to end.
    ///
    /// The recorded status follows the gateway outcome:
    /// - transaction succeeded: `completed`
    /// - operation accepted, transaction outstanding: `pending`
    /// - operation declined: `rejected` (kept for audit, reserves nothing)
    ///
    /// When the gateway outcome is unknown (timeout, interrupted connection,
    /// unreadable answer) a `pending` record flagged for reconciliation is
    /// written so the funds stay reserved, and the gateway error is returned.
    /// Nothing is recorded for any other failure.
    ///
    /// # Errors
    ///
    /// Returns validation, balance, lock, fetch, gateway or persistence errors.
    /// Returns `UnrecordedPayout` if the outcome is unknown and the held record
    /// could not be written.
    pub async fn request_withdrawal(
        &self,
        request: WithdrawalRequest,
    ) -> Result<WithdrawalOutcome, LedgerError> {
        // Fail fast on malformed input without queuing behind the lock.
        self.ledger.validate(&request)?;

        let _guard = self.lock(request.user_id).await?;

        match self.ledger.authorize_withdrawal(&request).await {
            Ok(authorization) => {
                let status = WithdrawalOutcome::initial_status(&authorization);
                let input = NewWithdrawal {
                    user_id: authorization.user_id,
                    amount: authorization.amount,
                    status,
                    service: authorization.destination.service,
                    receiver: authorization.destination.receiver.clone(),
                    gateway_reference: authorization.reference.clone(),
                    needs_reconciliation: false,
                };

                let record = self.withdrawals.insert(input).await.inspect_err(|e| {
                    error!(
                        user_id = %authorization.user_id,
                        amount = %authorization.amount,
                        reference = ?authorization.reference,
                        status = %status,
                        error = %e,
                        "Payout executed but withdrawal could not be recorded"
                    );
                })?;

                info!(
                    user_id = %record.user_id,
                    withdrawal_id = %record.id,
                    amount = %record.amount,
                    status = %record.status,
                    "Withdrawal recorded"
                );

                Ok(WithdrawalOutcome {
                    authorization,
                    record,
                })
            }
            Err(LedgerError::PaymentGateway(err)) if err.outcome_unknown() => {
                match self.record_unknown_outcome(&request).await {
                    Ok(()) => Err(LedgerError::PaymentGateway(err)),
                    Err(cause) => {
                        error!(
                            user_id = %request.user_id,
                            amount = %request.amount,
                            gateway_error = %err,
                            error = %cause,
                            "Payout outcome unknown and withdrawal could not be held"
                        );
                        Err(LedgerError::UnrecordedPayout {
                            user_id: request.user_id,
                            amount: request.amount,
                            gateway: err,
                            cause: cause.to_string(),
                        })
                    }
                }
            }
            Err(err) => Err(err),
        }
    }

    /// Withdrawals held after a gateway timeout, oldest first. These are the
    /// candidates for [`Self::settle_withdrawal`].
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::DataFetch` if the read fails.
    pub async fn awaiting_reconciliation(&self) -> Result<Vec<WithdrawalRecord>, LedgerError> {
        self.withdrawals.awaiting_reconciliation().await
    }

    /// Applies the final outcome of an in-flight withdrawal.
    ///
    /// # Errors
    ///
    /// Returns `WithdrawalNotFound`, `InvalidStatusTransition`, lock, fetch or
    /// persistence errors.
    pub async fn settle_withdrawal(
        &self,
        id: WithdrawalId,
        settlement: Settlement,
    ) -> Result<WithdrawalRecord, LedgerError> {
        let existing = self
            .withdrawals
            .find_by_id(id)
            .await?
            .ok_or(LedgerError::WithdrawalNotFound(id))?;

        let _guard = self.lock(existing.user_id).await?;

        // Re-read under the lock: the status may have moved while we waited.
        let current = self
            .withdrawals
            .find_by_id(id)
            .await?
            .ok_or(LedgerError::WithdrawalNotFound(id))?;

        let target = settlement.status();
        if !current.status.can_transition_to(target) {
            return Err(LedgerError::InvalidStatusTransition {
                from: current.status,
                to: target,
            });
        }

        let record = self.withdrawals.update_status(id, target, false).await?;

        info!(
            withdrawal_id = %id,
            user_id = %record.user_id,
            from = %current.status,
            to = %record.status,
            "Withdrawal settled"
        );

        Ok(record)
    }

    async fn lock(&self, user_id: UserId) -> Result<L::Guard, LedgerError> {
        tokio::time::timeout(self.lock_timeout, self.locks.acquire(user_id))
            .await
            .map_err(|_| {
                warn!(user_id = %user_id, "Timed out waiting for wallet lock");
                LedgerError::ConcurrentWithdrawal(user_id)
            })?
    }

    async fn record_unknown_outcome(&self, request: &WithdrawalRequest) -> Result<(), LedgerError> {
        let destination = self.ledger.validate(request)?;
        let record = self
            .withdrawals
            .insert(NewWithdrawal {
                user_id: request.user_id,
                amount: request.amount,
                status: WithdrawalStatus::Pending,
                service: destination.service,
                receiver: destination.receiver,
                gateway_reference: None,
                needs_reconciliation: true,
            })
            .await?;

        warn!(
            user_id = %request.user_id,
            withdrawal_id = %record.id,
            amount = %request.amount,
            "Payout outcome unknown, withdrawal held for reconciliation"
        );
        Ok(())
    }
}

/// Convenience for callers that only need to know whether a gateway failure
/// left money in an unknown state.
#[must_use]
pub fn needs_reconciliation(err: &LedgerError) -> bool {
    match err {
        LedgerError::PaymentGateway(e) => e.outcome_unknown(),
        LedgerError::UnrecordedPayout { .. } => true,
        _ => false,
    }
}
