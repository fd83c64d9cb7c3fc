//! Mapping of ledger errors to HTTP responses.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tandem_core::ledger::{LedgerError, needs_reconciliation};
use tracing::{error, warn};

/// Builds the `{error, code, details?}` body returned for every failure.
fn error_body(message: &str, code: &str, details: Option<Value>) -> Value {
    match details {
        Some(details) => json!({ "error": message, "code": code, "details": details }),
        None => json!({ "error": message, "code": code }),
    }
}

/// Converts a ledger error into an HTTP response.
///
/// Infrastructure failures are logged with their cause and answered with a
/// generic message. Gateway messages are passed through unchanged.
pub fn ledger_error_response(err: &LedgerError) -> Response {
    let status = StatusCode::from_u16(err.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let code = err.error_code();

    let (message, details) = match err {
        LedgerError::InsufficientBalance {
            requested,
            available,
        } => (
            err.to_string(),
            Some(json!({
                "requested": requested.to_string(),
                "available": available.to_string(),
            })),
        ),
        LedgerError::DataFetch(cause) => {
            error!(error = %cause, "Failed to read ledger data");
            ("Failed to fetch balance data".to_string(), None)
        }
        LedgerError::Persistence(cause) => {
            error!(error = %cause, "Failed to persist withdrawal");
            ("Failed to record withdrawal".to_string(), None)
        }
        LedgerError::PaymentGateway(_) => {
            warn!(error = %err, "Payout failed");
            let details = needs_reconciliation(err).then(|| json!({ "needsReconciliation": true }));
            (err.to_string(), details)
        }
        LedgerError::UnrecordedPayout { gateway, cause, .. } => {
            error!(
                gateway_error = %gateway,
                error = %cause,
                "Payout outcome unknown and unrecorded"
            );
            (
                "Payout outcome unknown and the withdrawal could not be recorded".to_string(),
                Some(json!({ "needsReconciliation": true })),
            )
        }
        LedgerError::ConcurrentWithdrawal(_) => {
            (err.to_string(), Some(json!({ "retryable": true })))
        }
        _ => (err.to_string(), None),
    };

    (status, Json(error_body(&message, code, details))).into_response()
}

/// 400 response for a request that failed validation before reaching the ledger.
pub fn bad_request(code: &str, message: impl AsRef<str>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(error_body(message.as_ref(), code, None)),
    )
        .into_response()
}

/// 400 response for a body axum could not decode.
pub fn json_rejection_response(rejection: &JsonRejection) -> Response {
    bad_request("INVALID_REQUEST", rejection.body_text())
}

/// 400 response for a query string axum could not decode.
pub fn query_rejection_response(rejection: &QueryRejection) -> Response {
    bad_request("INVALID_REQUEST", rejection.body_text())
}
