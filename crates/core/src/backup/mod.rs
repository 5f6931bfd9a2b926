//! Encrypted wallet snapshot export/import.
//!
//! A backup is the user's balances and deposit addresses, serialized and
//! sealed with a password-derived key. Import verifies a backup and reports
//! its contents; it never writes live balances.

pub mod codec;
pub mod types;

pub use codec::{export, import};
pub use types::{AddressRecord, BalanceRecord, ImportSummary, WalletBackup, WalletSnapshot};
