//! Wallet ledger domain logic.
//!
//! This module implements the pure half of the wallet ledger:
//! - Balance arithmetic and the `0 <= held <= amount` invariant
//! - The hold state machine (`Active -> {Released, Captured}`)
//! - Transfer validation and balanced ledger-pair planning
//! - The ledger entry vocabulary and operation result structs
//! - The wallet error taxonomy
//!
//! Everything that needs an atomic unit of work against the durable store
//! lives in the database crate and calls into this module.

pub mod balance;
pub mod error;
pub mod hold;
pub mod transfer;
pub mod types;

pub use balance::BalanceSnapshot;
pub use error::WalletError;
pub use transfer::{LedgerPair, PlannedEntry};
pub use types::{
    validate_currency, BalanceView, CaptureResult, DepositAddressView, HoldResult, HoldState,
    LedgerEntryKind, LedgerEntryStatus, LedgerEntryView, TransferResult,
};
