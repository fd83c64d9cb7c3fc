//! Ledger error types.
//!
//! Client errors (fixable by the user) map to 4xx, infrastructure and upstream
//! failures map to 5xx, so callers can decide whether to offer a retry.

use rust_decimal::Decimal;
use tandem_shared::types::{UserId, WithdrawalId};
use thiserror::Error;

use super::withdrawal::WithdrawalStatus;
use crate::payout::{PayoutError, PayoutService};

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Client Errors ==========
    /// Requested amount is zero, negative, or malformed.
    #[error("Withdrawal amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    /// Payout destination does not match the rail's format.
    #[error("Invalid {service} payout account: {receiver}")]
    InvalidAccount {
        /// Payout rail.
        service: PayoutService,
        /// Receiver as submitted.
        receiver: String,
    },

    /// Requested amount exceeds the available balance.
    #[error("Insufficient balance. Requested: {requested}, available: {available}")]
    InsufficientBalance {
        /// Amount the user asked for.
        requested: Decimal,
        /// Balance computed at request time.
        available: Decimal,
    },

    // ========== Withdrawal State Errors ==========
    /// Withdrawal not found.
    #[error("Withdrawal not found: {0}")]
    WithdrawalNotFound(WithdrawalId),

    /// Status change not allowed by the withdrawal lifecycle.
    #[error("Cannot move withdrawal from {from} to {to}")]
    InvalidStatusTransition {
        /// Current status.
        from: WithdrawalStatus,
        /// Requested status.
        to: WithdrawalStatus,
    },

    // ========== Concurrency Errors ==========
    /// Another withdrawal for the same user held the wallet for too long.
    #[error("Another withdrawal is in progress for user {0}, please retry")]
    ConcurrentWithdrawal(UserId),

    // ========== Infrastructure Errors ==========
    /// Reading earnings or withdrawals failed.
    #[error("Failed to fetch ledger data: {0}")]
    DataFetch(String),

    /// Writing a withdrawal failed.
    #[error("Failed to persist withdrawal: {0}")]
    Persistence(String),

    /// The payout call failed or timed out.
    #[error("Payment gateway error: {0}")]
    PaymentGateway(#[from] PayoutError),

    /// The payout outcome is unknown and the pending record that would hold
    /// the funds could not be written.
    #[error("Payout outcome unknown and not recorded ({gateway}): {cause}")]
    UnrecordedPayout {
        /// Owner of the wallet.
        user_id: UserId,
        /// Amount that may have been paid out.
        amount: Decimal,
        /// Gateway failure that left the outcome unknown.
        gateway: PayoutError,
        /// Why the record could not be written.
        cause: String,
    },
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InvalidAccount { .. } => "INVALID_ACCOUNT",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::WithdrawalNotFound(_) => "WITHDRAWAL_NOT_FOUND",
            Self::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::ConcurrentWithdrawal(_) => "CONCURRENT_WITHDRAWAL",
            Self::DataFetch(_) => "DATA_FETCH_ERROR",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
            Self::PaymentGateway(PayoutError::Timeout(_)) => "PAYMENT_GATEWAY_TIMEOUT",
            Self::PaymentGateway(err) if err.outcome_unknown() => {
                "PAYMENT_GATEWAY_OUTCOME_UNKNOWN"
            }
            Self::PaymentGateway(_) => "PAYMENT_GATEWAY_ERROR",
            Self::UnrecordedPayout { .. } => "UNRECORDED_PAYOUT",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - fixable by the user
            Self::InvalidAmount(_)
            | Self::InvalidAccount { .. }
            | Self::InsufficientBalance { .. } => 400,

            // 404 Not Found
            Self::WithdrawalNotFound(_) => 404,

            // 409 Conflict
            Self::InvalidStatusTransition { .. } | Self::ConcurrentWithdrawal(_) => 409,

            // 500 Internal Server Error - infrastructure and upstream
            Self::DataFetch(_)
            | Self::Persistence(_)
            | Self::PaymentGateway(_)
            | Self::UnrecordedPayout { .. } => 500,
        }
    }

    /// Returns true if this error is retryable.
    ///
    /// Gateway failures with an unknown outcome are excluded: the payout may
    /// have gone through.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConcurrentWithdrawal(_) | Self::DataFetch(_) | Self::Persistence(_) => true,
            Self::PaymentGateway(err) => !err.outcome_unknown(),
            _ => false,
        }
    }

    /// Returns true if this is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.http_status_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::InvalidAmount(dec!(0)).error_code(), "INVALID_AMOUNT");
        assert_eq!(
            LedgerError::InsufficientBalance {
                requested: dec!(50001),
                available: dec!(50000),
            }
            .error_code(),
            "INSUFFICIENT_BALANCE"
        );
        assert_eq!(
            LedgerError::from(PayoutError::Timeout(Duration::from_secs(30))).error_code(),
            "PAYMENT_GATEWAY_TIMEOUT"
        );
        assert_eq!(
            LedgerError::from(PayoutError::Transport("refused".into())).error_code(),
            "PAYMENT_GATEWAY_ERROR"
        );
        assert_eq!(
            LedgerError::from(PayoutError::Interrupted("reset".into())).error_code(),
            "PAYMENT_GATEWAY_OUTCOME_UNKNOWN"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::InvalidAmount(dec!(-1)).http_status_code(), 400);
        assert_eq!(
            LedgerError::InvalidAccount {
                service: PayoutService::Mtn,
                receiver: "123".into(),
            }
            .http_status_code(),
            400
        );
        assert_eq!(
            LedgerError::WithdrawalNotFound(WithdrawalId::new()).http_status_code(),
            404
        );
        assert_eq!(
            LedgerError::ConcurrentWithdrawal(UserId::new()).http_status_code(),
            409
        );
        assert_eq!(LedgerError::DataFetch("x".into()).http_status_code(), 500);
        assert_eq!(
            LedgerError::from(PayoutError::Rejected {
                status: 502,
                message: "upstream".into(),
            })
            .http_status_code(),
            500
        );
    }

    #[test]
    fn test_retryable_errors() {
        assert!(LedgerError::ConcurrentWithdrawal(UserId::new()).is_retryable());
        assert!(LedgerError::DataFetch("timeout".into()).is_retryable());
        assert!(LedgerError::from(PayoutError::Transport("refused".into())).is_retryable());
        assert!(!LedgerError::from(PayoutError::Timeout(Duration::from_secs(30))).is_retryable());
        assert!(!LedgerError::from(PayoutError::Interrupted("reset".into())).is_retryable());
        assert!(
            !LedgerError::UnrecordedPayout {
                user_id: UserId::new(),
                amount: dec!(1000),
                gateway: PayoutError::Timeout(Duration::from_secs(30)),
                cause: "disk full".into(),
            }
            .is_retryable()
        );
        assert!(
            !LedgerError::InsufficientBalance {
                requested: dec!(2),
                available: dec!(1),
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::InsufficientBalance {
            requested: dec!(50001),
            available: dec!(50000),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient balance. Requested: 50001, available: 50000"
        );
        assert!(err.is_client_error());

        let err = LedgerError::InvalidStatusTransition {
            from: WithdrawalStatus::Completed,
            to: WithdrawalStatus::Rejected,
        };
        assert_eq!(err.to_string(), "Cannot move withdrawal from completed to rejected");
    }
}
