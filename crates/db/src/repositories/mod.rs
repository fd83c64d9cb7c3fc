//! Repository implementations for the ledger's data access traits.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod earning;
pub mod withdrawal;

pub use earning::DbEarningRepository;
pub use withdrawal::DbWithdrawalRepository;
