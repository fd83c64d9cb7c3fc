//! Payout gateway capability.

use std::future::Future;

use super::error::PayoutError;
use super::types::{PayoutInstruction, PayoutReceipt};

/// Executes payouts against an external payment provider.
///
/// This trait is implemented by the gateway crate; tests use in-memory doubles.
/// Implementations must not retry on their own: retry policy belongs to callers.
pub trait PayoutGateway: Send + Sync {
    /// Sends money to the instruction's destination.
    fn execute_payout(
        &self,
        instruction: &PayoutInstruction,
    ) -> impl Future<Output = Result<PayoutReceipt, PayoutError>> + Send;
}
