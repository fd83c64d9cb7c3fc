//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for balances, withdrawals and settlement
//! - Mapping of ledger errors to HTTP responses
//! - Application state and router assembly

pub mod error;
pub mod routes;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use axum::Router;
use tandem_core::ledger::WithdrawalService;
use tandem_db::{AdvisoryLock, DbEarningRepository, DbWithdrawalRepository};
use tandem_gateway::MesombClient;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

/// Withdrawal service wired to `PostgreSQL` and MeSomb.
pub type LedgerService =
    WithdrawalService<DbEarningRepository, DbWithdrawalRepository, MesombClient, AdvisoryLock>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Balance and withdrawal operations.
    pub ledger: Arc<LedgerService>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
