//! Balance routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use tandem_core::ledger::BalanceSnapshot;
use tandem_shared::types::UserId;
use uuid::Uuid;

use crate::AppState;
use crate::error::ledger_error_response;

/// Creates the balance routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/users/{user_id}/balance", get(get_balance))
}

/// A user's wallet balance.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    /// Wallet owner.
    pub user_id: UserId,
    /// Sum of completed earnings.
    pub total_earnings: String,
    /// Sum of completed withdrawals.
    pub total_withdrawn: String,
    /// Sum of in-flight withdrawals.
    pub pending_withdrawals: String,
    /// What the user may withdraw now.
    pub available_balance: String,
}

impl BalanceResponse {
    fn new(user_id: UserId, snapshot: &BalanceSnapshot) -> Self {
        Self {
            user_id,
            total_earnings: snapshot.total_earnings.to_string(),
            total_withdrawn: snapshot.total_withdrawn.to_string(),
            pending_withdrawals: snapshot.pending_withdrawals.to_string(),
            available_balance: snapshot.available_balance.to_string(),
        }
    }
}

/// GET `/users/{user_id}/balance` - Current balance.
async fn get_balance(State(state): State<AppState>, Path(user_id): Path<Uuid>) -> Response {
    let user_id = UserId::from_uuid(user_id);

    match state.ledger.balance(user_id).await {
        Ok(snapshot) => {
            (StatusCode::OK, Json(BalanceResponse::new(user_id, &snapshot))).into_response()
        }
        Err(e) => ledger_error_response(&e),
    }
}
