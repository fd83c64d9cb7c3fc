//! Cross-instance wallet locks using `PostgreSQL` advisory locks.
//!
//! A lock is a transaction holding an advisory transaction lock on a key
//! derived from the user ID. The lock lives exactly as long as the transaction,
//! so it is released on commit, rollback, drop, or when the connection dies.
//!
//! Waiters poll with `pg_try_advisory_xact_lock` and hand their connection back
//! to the pool between attempts. Only the holder keeps a connection, which
//! leaves the rest of the pool to the reads and writes it runs under the lock.
//!
//! # Usage
//!
//! ```ignore
//! use tandem_core::lock::WithdrawalLock;
//! use tandem_db::AdvisoryLock;
//!
//! let locks = AdvisoryLock::new(db.clone());
//! let guard = locks.acquire(user_id).await?;
//! // ... check balance, pay out, record ...
//! guard.release().await?;
//! ```

use std::time::Duration;

use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, DatabaseTransaction, DbErr, Statement,
    TransactionTrait,
};
use tandem_core::ledger::LedgerError;
use tandem_core::lock::WithdrawalLock;
use tandem_shared::types::UserId;
use tracing::{debug, trace};

/// Takes the user's wallet key for the transaction if nobody holds it.
const TRY_LOCK_SQL: &str =
    "SELECT pg_try_advisory_xact_lock(hashtextextended($1::text, 0)) AS locked";

const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(20);
const MAX_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Per-user wallet lock shared by every server instance on the same database.
#[derive(Debug, Clone)]
pub struct AdvisoryLock {
    db: DatabaseConnection,
}

impl AdvisoryLock {
    /// Creates a lock registry over the given pool.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Holds a pooled connection with an open transaction until dropped.
pub struct AdvisoryGuard {
    txn: DatabaseTransaction,
    user_id: UserId,
}

impl AdvisoryGuard {
    /// The locked wallet.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Releases the lock by ending its transaction.
    ///
    /// Dropping the guard also releases it; this variant surfaces errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails.
    pub async fn release(self) -> Result<(), DbErr> {
        self.txn.commit().await
    }
}

impl std::fmt::Debug for AdvisoryGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvisoryGuard")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

/// Builds the statement that tries to take the lock for a user.
fn lock_statement(user_id: UserId) -> Statement {
    Statement::from_sql_and_values(
        DatabaseBackend::Postgres,
        TRY_LOCK_SQL,
        [user_id.to_string().into()],
    )
}

/// Delay before the next attempt, doubling up to [`MAX_RETRY_DELAY`].
fn retry_delay(attempt: u32) -> Duration {
    INITIAL_RETRY_DELAY
        .saturating_mul(2u32.saturating_pow(attempt))
        .min(MAX_RETRY_DELAY)
}

impl AdvisoryLock {
    /// One attempt. Returns the open transaction if it now owns the key.
    async fn try_acquire(&self, user_id: UserId) -> Result<Option<DatabaseTransaction>, DbErr> {
        let txn = self.db.begin().await?;
        let locked = txn
            .query_one(lock_statement(user_id))
            .await?
            .map(|row| row.try_get::<bool>("", "locked"))
            .transpose()?
            .unwrap_or(false);

        if locked {
            Ok(Some(txn))
        } else {
            txn.rollback().await?;
            Ok(None)
        }
    }
}

impl WithdrawalLock for AdvisoryLock {
    type Guard = AdvisoryGuard;

    /// Polls until the key is free. Callers bound the wait.
    async fn acquire(&self, user_id: UserId) -> Result<Self::Guard, LedgerError> {
        let mut attempt = 0;
        loop {
            if let Some(txn) = self
                .try_acquire(user_id)
                .await
                .map_err(|e| LedgerError::DataFetch(e.to_string()))?
            {
                debug!(
                    user_id = %user_id,
                    attempts = attempt + 1,
                    "Acquired wallet advisory lock"
                );
                return Ok(AdvisoryGuard { txn, user_id });
            }

            let delay = retry_delay(attempt);
            trace!(user_id = %user_id, delay = ?delay, "Wallet locked, retrying");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
