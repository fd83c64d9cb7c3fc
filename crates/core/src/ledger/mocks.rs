//! In-memory test doubles for the ledger's collaborators.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use tandem_shared::types::{PageRequest, PageResponse, UserId, WithdrawalId};

use super::earning::EarningRecord;
use super::error::LedgerError;
use super::repository::{EarningRepository, WithdrawalRepository};
use super::withdrawal::{NewWithdrawal, WithdrawalRecord, WithdrawalStatus};
use crate::payout::{
    PayoutError, PayoutGateway, PayoutInstruction, PayoutReceipt, PayoutService,
};

/// Earnings keyed by user.
#[derive(Default)]
pub struct MemoryEarnings {
    bookings: Mutex<Vec<(UserId, EarningRecord)>>,
    jobs: Mutex<Vec<(UserId, EarningRecord)>>,
    job_failure: Mutex<Option<String>>,
}

impl MemoryEarnings {
    pub fn add_booking(&self, user: UserId, record: EarningRecord) {
        self.bookings.lock().unwrap().push((user, record));
    }

    pub fn add_job(&self, user: UserId, record: EarningRecord) {
        self.jobs.lock().unwrap().push((user, record));
    }

    pub fn fail_jobs(&self, message: &str) {
        *self.job_failure.lock().unwrap() = Some(message.to_string());
    }

    fn for_user(rows: &Mutex<Vec<(UserId, EarningRecord)>>, user: UserId) -> Vec<EarningRecord> {
        rows.lock()
            .unwrap()
            .iter()
            .filter(|(owner, _)| *owner == user)
            .map(|(_, record)| record.clone())
            .collect()
    }
}

impl EarningRepository for MemoryEarnings {
    async fn booking_earnings(&self, user_id: UserId) -> Result<Vec<EarningRecord>, LedgerError> {
        Ok(Self::for_user(&self.bookings, user_id))
    }

    async fn job_earnings(&self, user_id: UserId) -> Result<Vec<EarningRecord>, LedgerError> {
        if let Some(message) = self.job_failure.lock().unwrap().clone() {
            return Err(LedgerError::DataFetch(message));
        }
        Ok(Self::for_user(&self.jobs, user_id))
    }
}

/// Withdrawals stored in insertion order.
#[derive(Default)]
pub struct MemoryWithdrawals {
    records: Mutex<Vec<WithdrawalRecord>>,
    read_failure: Mutex<Option<String>>,
    write_failure: Mutex<Option<String>>,
}

impl MemoryWithdrawals {
    pub fn seed(
        &self,
        user: UserId,
        amount: Decimal,
        status: WithdrawalStatus,
    ) -> WithdrawalRecord {
        let now = Utc::now();
        let record = WithdrawalRecord {
            id: WithdrawalId::new(),
            user_id: user,
            amount,
            status,
            service: PayoutService::Mtn,
            receiver: "670000000".to_string(),
            gateway_reference: None,
            needs_reconciliation: false,
            created_at: now,
            updated_at: now,
        };
        self.records.lock().unwrap().push(record.clone());
        record
    }

    pub fn fail_reads(&self, message: &str) {
        *self.read_failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn fail_writes(&self, message: &str) {
        *self.write_failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn all(&self) -> Vec<WithdrawalRecord> {
        self.records.lock().unwrap().clone()
    }

    fn check_read(&self) -> Result<(), LedgerError> {
        match self.read_failure.lock().unwrap().clone() {
            Some(message) => Err(LedgerError::DataFetch(message)),
            None => Ok(()),
        }
    }

    fn check_write(&self) -> Result<(), LedgerError> {
        match self.write_failure.lock().unwrap().clone() {
            Some(message) => Err(LedgerError::Persistence(message)),
            None => Ok(()),
        }
    }
}

impl WithdrawalRepository for MemoryWithdrawals {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<WithdrawalRecord>, LedgerError> {
        self.check_read()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn page_for_user(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<PageResponse<WithdrawalRecord>, LedgerError> {
        self.check_read()?;
        let mut mine: Vec<_> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        mine.reverse();
        let total = mine.len() as u64;
        let data = mine
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap())
            .take(usize::try_from(page.limit()).unwrap())
            .collect();
        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    async fn awaiting_reconciliation(&self) -> Result<Vec<WithdrawalRecord>, LedgerError> {
        self.check_read()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.needs_reconciliation)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: WithdrawalId) -> Result<Option<WithdrawalRecord>, LedgerError> {
        self.check_read()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn insert(&self, input: NewWithdrawal) -> Result<WithdrawalRecord, LedgerError> {
        self.check_write()?;
        let now = Utc::now();
        let record = WithdrawalRecord {
            id: WithdrawalId::new(),
            user_id: input.user_id,
            amount: input.amount,
            status: input.status,
            service: input.service,
            receiver: input.receiver,
            gateway_reference: input.gateway_reference,
            needs_reconciliation: input.needs_reconciliation,
            created_at: now,
            updated_at: now,
        };
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn update_status(
        &self,
        id: WithdrawalId,
        status: WithdrawalStatus,
        needs_reconciliation: bool,
    ) -> Result<WithdrawalRecord, LedgerError> {
        self.check_write()?;
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(LedgerError::WithdrawalNotFound(id))?;
        record.status = status;
        record.needs_reconciliation = needs_reconciliation;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }
}

/// How the scripted gateway answers.
#[derive(Clone)]
pub enum GatewayBehavior {
    /// Operation and transaction succeed.
    Succeed,
    /// Operation succeeds, transaction still pending.
    PendingTransaction,
    /// Provider declines the operation.
    DeclineOperation,
    /// Provider call fails.
    Fail(PayoutError),
    /// Never answers.
    Hang,
    /// Succeeds after a delay.
    Delay(Duration),
}

/// Gateway double that records what it was asked to do.
pub struct ScriptedGateway {
    behavior: GatewayBehavior,
    calls: AtomicUsize,
    last: Mutex<Option<PayoutInstruction>>,
}

impl ScriptedGateway {
    pub fn new(behavior: GatewayBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_instruction(&self) -> Option<PayoutInstruction> {
        self.last.lock().unwrap().clone()
    }

    fn receipt(operation_success: bool, transaction_success: bool) -> PayoutReceipt {
        PayoutReceipt {
            operation_success,
            transaction_success,
            reference: operation_success.then(|| "MS-REF-1".to_string()),
            message: None,
            raw: serde_json::json!({ "success": operation_success }),
        }
    }
}

impl PayoutGateway for ScriptedGateway {
    async fn execute_payout(
        &self,
        instruction: &PayoutInstruction,
    ) -> Result<PayoutReceipt, PayoutError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(instruction.clone());

        match &self.behavior {
            GatewayBehavior::Succeed => Ok(Self::receipt(true, true)),
            GatewayBehavior::PendingTransaction => Ok(Self::receipt(true, false)),
            GatewayBehavior::DeclineOperation => Ok(Self::receipt(false, false)),
            GatewayBehavior::Fail(err) => Err(err.clone()),
            GatewayBehavior::Hang => std::future::pending().await,
            GatewayBehavior::Delay(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(Self::receipt(true, true))
            }
        }
    }
}
