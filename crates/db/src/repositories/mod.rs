//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations, hiding
//! the `SeaORM` implementation details from the rest of the application.
//! They are the only writers of wallet state; multi-step operations run as
//! one database transaction with row-level locks.

pub mod backup;
pub mod balance;
pub mod deposit_address;
pub mod hold;
pub mod ledger;
pub mod transfer;

pub use backup::BackupRepository;
pub use balance::BalanceRepository;
pub use deposit_address::DepositAddressRepository;
pub use hold::HoldRepository;
pub use ledger::{LedgerRepository, NewLedgerEntry};
pub use transfer::TransferRepository;
