//! Withdrawal persistence.

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tandem_core::ledger::{
    LedgerError, NewWithdrawal, WithdrawalRecord, WithdrawalRepository,
    WithdrawalStatus as CoreStatus,
};
use tandem_core::payout::PayoutService as CoreService;
use tandem_shared::types::{PageRequest, PageResponse, UserId, WithdrawalId};
use uuid::Uuid;

use crate::entities::{
    sea_orm_active_enums::{PayoutService, WithdrawalStatus},
    withdrawals,
};

/// Withdrawal store backed by the `withdrawals` table.
#[derive(Debug, Clone)]
pub struct DbWithdrawalRepository {
    db: DatabaseConnection,
}

impl DbWithdrawalRepository {
    /// Creates a new withdrawal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl WithdrawalRepository for DbWithdrawalRepository {
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<WithdrawalRecord>, LedgerError> {
        let rows = withdrawals::Entity::find()
            .filter(withdrawals::Column::UserId.eq(user_id.into_inner()))
            .all(&self.db)
            .await
            .map_err(fetch_error)?;

        Ok(rows.into_iter().map(model_to_record).collect())
    }

    async fn page_for_user(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<PageResponse<WithdrawalRecord>, LedgerError> {
        let query = withdrawals::Entity::find()
            .filter(withdrawals::Column::UserId.eq(user_id.into_inner()));

        let total = query.clone().count(&self.db).await.map_err(fetch_error)?;

        let rows = query
            .order_by_desc(withdrawals::Column::CreatedAt)
            .order_by_desc(withdrawals::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(fetch_error)?;

        Ok(PageResponse::new(
            rows.into_iter().map(model_to_record).collect(),
            page.page,
            page.per_page,
            total,
        ))
    }

    async fn awaiting_reconciliation(&self) -> Result<Vec<WithdrawalRecord>, LedgerError> {
        let rows = withdrawals::Entity::find()
            .filter(withdrawals::Column::NeedsReconciliation.eq(true))
            .order_by_asc(withdrawals::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(fetch_error)?;

        Ok(rows.into_iter().map(model_to_record).collect())
    }

    async fn find_by_id(&self, id: WithdrawalId) -> Result<Option<WithdrawalRecord>, LedgerError> {
        let row = withdrawals::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(fetch_error)?;

        Ok(row.map(model_to_record))
    }

    async fn insert(&self, input: NewWithdrawal) -> Result<WithdrawalRecord, LedgerError> {
        let now: DateTimeWithTimeZone = Utc::now().into();

        let model = withdrawals::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(input.user_id.into_inner()),
            amount: Set(input.amount),
            status: Set(status_to_db(input.status)),
            service: Set(service_to_db(input.service)),
            receiver: Set(input.receiver),
            gateway_reference: Set(input.gateway_reference),
            needs_reconciliation: Set(input.needs_reconciliation),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(persist_error)?;

        Ok(model_to_record(model))
    }

    async fn update_status(
        &self,
        id: WithdrawalId,
        status: CoreStatus,
        needs_reconciliation: bool,
    ) -> Result<WithdrawalRecord, LedgerError> {
        let existing = withdrawals::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(fetch_error)?
            .ok_or(LedgerError::WithdrawalNotFound(id))?;

        let mut active = existing.into_active_model();
        active.status = Set(status_to_db(status));
        active.needs_reconciliation = Set(needs_reconciliation);
        active.updated_at = Set(Utc::now().into());

        let model = active.update(&self.db).await.map_err(persist_error)?;
        Ok(model_to_record(model))
    }
}

// ============================================================================
// Conversion helpers
// ============================================================================

fn fetch_error(err: DbErr) -> LedgerError {
    LedgerError::DataFetch(err.to_string())
}

fn persist_error(err: DbErr) -> LedgerError {
    LedgerError::Persistence(err.to_string())
}

fn model_to_record(model: withdrawals::Model) -> WithdrawalRecord {
    WithdrawalRecord {
        id: WithdrawalId::from_uuid(model.id),
        user_id: UserId::from_uuid(model.user_id),
        amount: model.amount,
        status: status_to_core(model.status),
        service: service_to_core(model.service),
        receiver: model.receiver,
        gateway_reference: model.gateway_reference,
        needs_reconciliation: model.needs_reconciliation,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

const fn status_to_core(status: WithdrawalStatus) -> CoreStatus {
    match status {
        WithdrawalStatus::Pending => CoreStatus::Pending,
        WithdrawalStatus::Requested => CoreStatus::Requested,
        WithdrawalStatus::Completed => CoreStatus::Completed,
        WithdrawalStatus::Rejected => CoreStatus::Rejected,
    }
}

const fn status_to_db(status: CoreStatus) -> WithdrawalStatus {
    match status {
        CoreStatus::Pending => WithdrawalStatus::Pending,
        CoreStatus::Requested => WithdrawalStatus::Requested,
        CoreStatus::Completed => WithdrawalStatus::Completed,
        CoreStatus::Rejected => WithdrawalStatus::Rejected,
    }
}

const fn service_to_core(service: PayoutService) -> CoreService {
    match service {
        PayoutService::Mtn => CoreService::Mtn,
        PayoutService::Orange => CoreService::Orange,
    }
}

const fn service_to_db(service: CoreService) -> PayoutService {
    match service {
        CoreService::Mtn => PayoutService::Mtn,
        CoreService::Orange => PayoutService::Orange,
    }
}
