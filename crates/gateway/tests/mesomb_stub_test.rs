//! MeSomb client tests against a local stub server.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use rust_decimal_macros::dec;
use serde_json::json;
use tandem_core::payout::{
    PayoutDestination, PayoutError, PayoutGateway, PayoutInstruction, PayoutService,
};
use tandem_gateway::MesombClient;
use tandem_shared::PayoutConfig;
use tandem_shared::types::{Currency, UserId};
use tokio::net::TcpListener;

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    body: String,
    seen: Seen,
}

async fn deposit(State(stub): State<Stub>, headers: HeaderMap, body: String) -> Response {
    stub.seen.lock().unwrap().push((headers, body));
    (
        stub.status,
        [("content-type", "application/json")],
        stub.body.clone(),
    )
        .into_response()
}

type Seen = Arc<Mutex<Vec<(HeaderMap, String)>>>;

/// Starts a stub answering every deposit with `status` and `body`.
async fn start_stub(status: StatusCode, body: &str) -> (String, Seen) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let stub = Stub {
        status,
        body: body.to_string(),
        seen: Arc::clone(&seen),
    };
    let app = Router::new()
        .route("/en/api/v1.1/payment/deposit/", post(deposit))
        .with_state(stub);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), seen)
}

fn config(base_url: String) -> PayoutConfig {
    PayoutConfig {
        base_url,
        application_key: "app-key".to_string(),
        access_key: "access-key".to_string(),
        secret_key: "secret-key".to_string(),
        country: "CM".to_string(),
        currency: Currency::Xaf,
        town: "Yaounde".to_string(),
        region: "Centre".to_string(),
        product_name: "Earnings withdrawal".to_string(),
    }
}

fn instruction() -> PayoutInstruction {
    PayoutInstruction {
        amount: dec!(50000),
        destination: PayoutDestination::new(PayoutService::Mtn, "670123456"),
        customer_id: UserId::new(),
    }
}

#[tokio::test]
async fn test_successful_deposit_is_signed_and_mapped() {
    let (base, seen) = start_stub(
        StatusCode::OK,
        r#"{"success": true, "message": "Deposit done", "transaction": {"pk": "MS-0042", "status": "SUCCESS"}}"#,
    )
    .await;
    let client = MesombClient::new(config(base)).unwrap();
    let instruction = instruction();

    let receipt = client.execute_payout(&instruction).await.unwrap();

    assert!(receipt.operation_success);
    assert!(receipt.transaction_success);
    assert_eq!(receipt.reference.as_deref(), Some("MS-0042"));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (headers, body) = &seen[0];
    assert_eq!(headers["x-mesomb-application"], "app-key");
    assert_eq!(headers["x-mesomb-operationmode"], "synchronous");
    assert!(headers.contains_key("x-mesomb-trxid"));
    assert!(headers.contains_key("x-mesomb-nonce"));
    let authorization = headers["authorization"].to_str().unwrap();
    assert!(authorization.starts_with("HMAC-SHA1 Credential=access-key/"));
    assert!(authorization.contains("SignedHeaders=content-type;host;x-mesomb-date;x-mesomb-nonce"));

    let body: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(body["receiver"], "670123456");
    assert_eq!(body["service"], "MTN");
    assert_eq!(body["customer"]["id"], instruction.customer_id.to_string());
}

#[tokio::test]
async fn test_pending_transaction_is_not_reported_as_complete() {
    let (base, _) = start_stub(
        StatusCode::OK,
        r#"{"success": true, "transaction": {"pk": "MS-0043", "status": "PENDING"}}"#,
    )
    .await;
    let client = MesombClient::new(config(base)).unwrap();

    let receipt = client.execute_payout(&instruction()).await.unwrap();

    assert!(receipt.operation_success);
    assert!(!receipt.transaction_success);
}

#[tokio::test]
async fn test_error_status_preserves_provider_message() {
    let body = json!({
        "detail": "Insufficient merchant balance",
        "code": "insufficient-balance",
    });
    let (base, _) = start_stub(StatusCode::BAD_REQUEST, &body.to_string()).await;
    let client = MesombClient::new(config(base)).unwrap();

    let err = client.execute_payout(&instruction()).await.unwrap_err();

    assert_eq!(
        err,
        PayoutError::Rejected {
            status: 400,
            message: "Insufficient merchant balance".to_string(),
        }
    );
}

#[tokio::test]
async fn test_undecodable_success_body_leaves_outcome_unknown() {
    let (base, seen) = start_stub(StatusCode::OK, "<html>maintenance</html>").await;
    let client = MesombClient::new(config(base)).unwrap();

    let err = client.execute_payout(&instruction()).await.unwrap_err();

    assert!(matches!(err, PayoutError::UnreadableResponse { status: 200, .. }));
    assert!(err.outcome_unknown());
    assert_eq!(seen.lock().unwrap().len(), 1, "the deposit reached the provider");
}

#[tokio::test]
async fn test_undecodable_error_body_is_still_a_rejection() {
    let (base, _) = start_stub(StatusCode::BAD_GATEWAY, "<html>upstream down</html>").await;
    let client = MesombClient::new(config(base)).unwrap();

    let err = client.execute_payout(&instruction()).await.unwrap_err();

    assert!(matches!(err, PayoutError::Rejected { status: 502, .. }));
    assert!(!err.outcome_unknown());
}

#[tokio::test]
async fn test_unreachable_gateway_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = MesombClient::new(config(format!("http://{addr}"))).unwrap();

    let err = client.execute_payout(&instruction()).await.unwrap_err();

    assert!(matches!(err, PayoutError::Transport(_)));
    assert!(!err.outcome_unknown());
}
