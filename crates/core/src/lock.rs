//! Per-user serialization of withdrawals.
//!
//! Balance verification and the write that follows it form a check-then-act
//! sequence. Two withdrawals for the same user must never interleave inside it,
//! otherwise both can observe the same available balance and overdraw the wallet.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use tandem_shared::types::UserId;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::ledger::LedgerError;

/// Grants exclusive access to a user's wallet for the lifetime of a guard.
///
/// The in-process implementation lives here; the db crate provides a
/// PostgreSQL advisory-lock implementation that also serializes across instances.
pub trait WithdrawalLock: Send + Sync {
    /// Held while the wallet is locked. Dropping it releases the lock.
    type Guard: Send;

    /// Waits until the user's wallet is free, then locks it.
    fn acquire(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Self::Guard, LedgerError>> + Send;
}

type Slots = DashMap<UserId, Arc<Mutex<()>>>;

/// Lock registry for a single process.
///
/// Serializes withdrawals only among tasks of the same process. Deployments
/// with more than one server instance need the database-backed lock.
/// A user's entry is dropped as soon as nobody holds or waits for it.
#[derive(Debug, Default)]
pub struct InProcessLock {
    slots: Arc<Slots>,
}

impl InProcessLock {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Held while a user's wallet is locked in this process.
#[derive(Debug)]
pub struct InProcessGuard {
    guard: Option<OwnedMutexGuard<()>>,
    slots: Arc<Slots>,
    user_id: UserId,
}

impl Drop for InProcessGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Waiters hold a clone of the slot, so only an idle slot has a count of 1.
        self.slots
            .remove_if(&self.user_id, |_, slot| Arc::strong_count(slot) == 1);
    }
}

impl WithdrawalLock for InProcessLock {
    type Guard = InProcessGuard;

    async fn acquire(&self, user_id: UserId) -> Result<Self::Guard, LedgerError> {
        // The map shard guard must be released before awaiting.
        let slot = Arc::clone(self.slots.entry(user_id).or_default().value());
        let guard = slot.lock_owned().await;
        Ok(InProcessGuard {
            guard: Some(guard),
            slots: Arc::clone(&self.slots),
            user_id,
        })
    }
}
