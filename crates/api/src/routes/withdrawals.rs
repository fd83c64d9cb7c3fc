//! Withdrawal routes.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tandem_core::ledger::{Settlement, WithdrawalOutcome, WithdrawalRecord, WithdrawalRequest};
use tandem_core::payout::{PayoutDestination, PayoutService};
use tandem_shared::types::{PageRequest, UserId, WithdrawalId};
use tracing::info;
use uuid::Uuid;

use crate::AppState;
use crate::error::{
    bad_request, json_rejection_response, ledger_error_response, query_rejection_response,
};

/// Creates the withdrawal routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/withdrawals", post(request_withdrawal))
        .route("/withdrawals/reconciliation", get(awaiting_reconciliation))
        .route("/withdrawals/{withdrawal_id}/settle", post(settle_withdrawal))
        .route("/users/{user_id}/withdrawals", get(list_withdrawals))
}

/// Request body for a withdrawal.
#[derive(Debug, Deserialize)]
pub struct CreateWithdrawalRequest {
    /// Mobile-money number to pay.
    pub receiver: String,
    /// Amount in XAF, as a JSON number or string.
    pub amount: Decimal,
    /// Payout rail: `MTN` or `ORANGE`.
    pub service: PayoutService,
    /// Wallet owner.
    pub customer: String,
}

/// Response for an accepted withdrawal.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalResponse {
    /// The gateway processed the operation.
    pub operation_success: bool,
    /// The funds transfer completed.
    pub transaction_success: bool,
    /// ID of the recorded withdrawal.
    pub withdrawal_id: WithdrawalId,
    /// Recorded status.
    pub status: String,
    /// Gateway transaction reference.
    pub reference: Option<String>,
    /// Raw gateway response.
    pub raw: serde_json::Value,
}

impl From<WithdrawalOutcome> for WithdrawalResponse {
    fn from(outcome: WithdrawalOutcome) -> Self {
        Self {
            operation_success: outcome.authorization.operation_success,
            transaction_success: outcome.authorization.transaction_success,
            withdrawal_id: outcome.record.id,
            status: outcome.record.status.to_string(),
            reference: outcome.authorization.reference,
            raw: outcome.authorization.raw,
        }
    }
}

/// Request body for settling an in-flight withdrawal.
#[derive(Debug, Deserialize)]
pub struct SettleWithdrawalRequest {
    /// `completed` or `rejected`.
    pub status: Settlement,
}

/// A withdrawal as returned by history and settlement.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRecordResponse {
    /// Withdrawal ID.
    pub id: WithdrawalId,
    /// Wallet owner.
    pub user_id: UserId,
    /// Withdrawn amount.
    pub amount: String,
    /// Current status.
    pub status: String,
    /// Payout rail.
    pub service: PayoutService,
    /// Payout phone number.
    pub receiver: String,
    /// Gateway transaction reference.
    pub gateway_reference: Option<String>,
    /// Awaiting manual reconciliation.
    pub needs_reconciliation: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last status change.
    pub updated_at: DateTime<Utc>,
}

impl From<WithdrawalRecord> for WithdrawalRecordResponse {
    fn from(record: WithdrawalRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            amount: record.amount.to_string(),
            status: record.status.to_string(),
            service: record.service,
            receiver: record.receiver,
            gateway_reference: record.gateway_reference,
            needs_reconciliation: record.needs_reconciliation,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// POST `/withdrawals` - Authorize and record a withdrawal.
async fn request_withdrawal(
    State(state): State<AppState>,
    payload: Result<Json<CreateWithdrawalRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return json_rejection_response(&rejection),
    };

    let Ok(customer) = payload.customer.parse::<Uuid>() else {
        return bad_request(
            "INVALID_CUSTOMER",
            format!("Invalid customer id: {}", payload.customer),
        );
    };

    let request = WithdrawalRequest {
        user_id: UserId::from_uuid(customer),
        amount: payload.amount,
        destination: PayoutDestination::new(payload.service, payload.receiver),
    };

    match state.ledger.request_withdrawal(request).await {
        Ok(outcome) => {
            info!(
                withdrawal_id = %outcome.record.id,
                status = %outcome.record.status,
                "Withdrawal processed"
            );
            (StatusCode::OK, Json(WithdrawalResponse::from(outcome))).into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}

/// POST `/withdrawals/{withdrawal_id}/settle` - Record the final outcome of a withdrawal.
async fn settle_withdrawal(
    State(state): State<AppState>,
    Path(withdrawal_id): Path<Uuid>,
    payload: Result<Json<SettleWithdrawalRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return json_rejection_response(&rejection),
    };

    match state
        .ledger
        .settle_withdrawal(WithdrawalId::from_uuid(withdrawal_id), payload.status)
        .await
    {
        Ok(record) => {
            (StatusCode::OK, Json(WithdrawalRecordResponse::from(record))).into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}

/// GET `/withdrawals/reconciliation` - Withdrawals held after a gateway timeout.
async fn awaiting_reconciliation(State(state): State<AppState>) -> Response {
    match state.ledger.awaiting_reconciliation().await {
        Ok(records) => {
            let data: Vec<WithdrawalRecordResponse> = records.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(data)).into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}

/// GET `/users/{user_id}/withdrawals` - Withdrawal history, newest first.
async fn list_withdrawals(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    page: Result<Query<PageRequest>, QueryRejection>,
) -> Response {
    let Query(page) = match page {
        Ok(page) => page,
        Err(rejection) => return query_rejection_response(&rejection),
    };

    match state
        .ledger
        .list_withdrawals(UserId::from_uuid(user_id), page)
        .await
    {
        Ok(page) => {
            let response = page.map(WithdrawalRecordResponse::from);
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}
