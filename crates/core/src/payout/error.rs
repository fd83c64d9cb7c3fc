//! Payout gateway error types.

use std::time::Duration;

use thiserror::Error;

/// Errors reported by a payout gateway call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PayoutError {
    /// The call did not complete within its bound. The remote outcome is unknown.
    #[error("payout gateway did not answer within {}s", .0.as_secs())]
    Timeout(Duration),

    /// The provider answered with an error status.
    #[error("payout rejected by gateway (HTTP {status}): {message}")]
    Rejected {
        /// HTTP status returned by the provider.
        status: u16,
        /// Provider message, preserved verbatim.
        message: String,
    },

    /// The request was never delivered to the provider.
    #[error("payout gateway unreachable: {0}")]
    Transport(String),

    /// The connection failed after the request may have reached the provider.
    #[error("payout gateway connection interrupted: {0}")]
    Interrupted(String),

    /// The provider accepted the request but its answer could not be read.
    #[error("unreadable payout gateway response (HTTP {status}): {reason}")]
    UnreadableResponse {
        /// HTTP status returned by the provider.
        status: u16,
        /// Why the body could not be read or decoded.
        reason: String,
    },
}

impl PayoutError {
    /// Returns true when the provider may have executed the payout anyway.
    #[must_use]
    pub fn outcome_unknown(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Interrupted(_) | Self::UnreadableResponse { .. }
        )
    }
}
