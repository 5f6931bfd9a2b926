//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the wallet tables
//! - Repository abstractions owning every atomic unit of work
//! - Database migrations
//!
//! Repositories are the only writers of wallet state; each multi-step
//! operation runs inside one database transaction with row-level locks, so
//! no caller can observe a partially-applied mutation.

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    BackupRepository, BalanceRepository, DepositAddressRepository, HoldRepository,
    LedgerRepository, TransferRepository,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
