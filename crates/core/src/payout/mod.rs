//! Payout rails and the outbound payment capability.
//!
//! The ledger never talks to a payment provider directly. It hands a
//! [`PayoutInstruction`] to a [`PayoutGateway`] and receives a [`PayoutReceipt`]
//! carrying two independent outcomes:
//!
//! - operation success: the provider accepted and processed the request
//! - transaction success: the funds transfer itself went through
//!
//! An operation can succeed while the transaction is still pending, so both
//! flags are relayed as-is.

mod error;
mod gateway;
pub mod phone;
mod types;

pub use error::PayoutError;
pub use gateway::PayoutGateway;
pub use types::{PayoutDestination, PayoutInstruction, PayoutReceipt, PayoutService};
