//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the marketplace and withdrawal tables
//! - Implementations of the ledger's repository traits
//! - A `PostgreSQL` advisory-lock implementation of the wallet lock
//! - Database migrations

pub mod entities;
pub mod lock;
pub mod migration;
pub mod repositories;

pub use lock::{AdvisoryGuard, AdvisoryLock};
pub use repositories::{DbEarningRepository, DbWithdrawalRepository};

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tandem_shared::config::DatabaseConfig;

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}

/// Establishes a pooled connection sized from configuration.
///
/// A withdrawal holding its advisory lock keeps one pooled connection and
/// needs up to three more for its balance reads. Waiting withdrawals hold none.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect_with(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10));

    Database::connect(options).await
}
