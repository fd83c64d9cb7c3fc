//! Repository traits for the data the ledger reads and writes.
//!
//! These traits are implemented by the db crate to provide actual database operations.
//! Read failures are reported as [`LedgerError::DataFetch`], write failures as
//! [`LedgerError::Persistence`].

use std::future::Future;

use tandem_shared::types::{PageRequest, PageResponse, UserId, WithdrawalId};

use super::earning::EarningRecord;
use super::error::LedgerError;
use super::withdrawal::{NewWithdrawal, WithdrawalRecord, WithdrawalStatus};

/// Read access to the tables earnings are derived from.
pub trait EarningRepository: Send + Sync {
    /// Bookings where the user is the provider, status confirmed or completed,
    /// payment status paid.
    fn booking_earnings(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<EarningRecord>, LedgerError>> + Send;

    /// Accepted job applications of the user, valued at the parent job's budget.
    fn job_earnings(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<EarningRecord>, LedgerError>> + Send;
}

/// Access to persisted withdrawals.
pub trait WithdrawalRepository: Send + Sync {
    /// All withdrawals of a user, any status.
    fn list_for_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<WithdrawalRecord>, LedgerError>> + Send;

    /// One page of a user's withdrawals, newest first.
    fn page_for_user(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> impl Future<Output = Result<PageResponse<WithdrawalRecord>, LedgerError>> + Send;

    /// Withdrawals whose gateway outcome is unknown, oldest first.
    fn awaiting_reconciliation(
        &self,
    ) -> impl Future<Output = Result<Vec<WithdrawalRecord>, LedgerError>> + Send;

    /// Finds a withdrawal by ID.
    fn find_by_id(
        &self,
        id: WithdrawalId,
    ) -> impl Future<Output = Result<Option<WithdrawalRecord>, LedgerError>> + Send;

    /// Persists a new withdrawal.
    fn insert(
        &self,
        input: NewWithdrawal,
    ) -> impl Future<Output = Result<WithdrawalRecord, LedgerError>> + Send;

    /// Changes the status of a withdrawal and clears or sets its reconciliation flag.
    fn update_status(
        &self,
        id: WithdrawalId,
        status: WithdrawalStatus,
        needs_reconciliation: bool,
    ) -> impl Future<Output = Result<WithdrawalRecord, LedgerError>> + Send;
}
