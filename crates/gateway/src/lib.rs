//! MeSomb payout gateway for ResearchTandem.
//!
//! Implements [`tandem_core::payout::PayoutGateway`] over the MeSomb deposit
//! API. The client does not bound the overall call; the ledger wraps every
//! payout in its own timeout.

mod client;
mod signature;

pub use client::MesombClient;
pub use signature::{RequestSigner, SignedRequest};
