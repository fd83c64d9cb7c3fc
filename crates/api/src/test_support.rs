//! Router fixtures for handler tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use http_body_util::BodyExt;
use sea_orm::{DatabaseBackend, DbErr, MockDatabase};
use serde_json::Value;
use tandem_core::ledger::WithdrawalService;
use tandem_db::{AdvisoryLock, DbEarningRepository, DbWithdrawalRepository};
use tandem_gateway::MesombClient;
use tandem_shared::types::Currency;
use tandem_shared::{LedgerConfig, PayoutConfig};
use tower::ServiceExt;

use crate::{AppState, create_router};

/// State whose database fails every statement and whose gateway points at a
/// closed port.
pub fn offline_state() -> AppState {
    let outage = || DbErr::Custom("connection refused".to_string());
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_errors([outage(), outage(), outage()])
        .into_connection();
    let gateway = MesombClient::new(PayoutConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        application_key: "app-key".to_string(),
        access_key: "access-key".to_string(),
        secret_key: "secret-key".to_string(),
        country: "CM".to_string(),
        currency: Currency::Xaf,
        town: "Yaounde".to_string(),
        region: "Centre".to_string(),
        product_name: "Earnings withdrawal".to_string(),
    })
    .expect("offline gateway config is valid");

    AppState {
        ledger: Arc::new(WithdrawalService::new(
            Arc::new(DbEarningRepository::new(db.clone())),
            Arc::new(DbWithdrawalRepository::new(db.clone())),
            Arc::new(gateway),
            Arc::new(AdvisoryLock::new(db)),
            &LedgerConfig::default(),
        )),
    }
}

pub fn app() -> Router {
    create_router(offline_state())
}

pub async fn send(request: Request<Body>) -> Response<Body> {
    app().oneshot(request).await.unwrap()
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Asserts the status and returns the decoded JSON body.
pub async fn expect_json(response: Response<Body>, status: StatusCode) -> Value {
    assert_eq!(response.status(), status);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
