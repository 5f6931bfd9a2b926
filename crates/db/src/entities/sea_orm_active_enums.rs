//! `SeaORM` active enums backing the Postgres enum types.
//!
//! Each enum mirrors a closed domain enum from `tally-core`; the `From`
//! conversions keep the two vocabularies in lockstep.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::wallet::{HoldState as DomainHoldState, LedgerEntryKind, LedgerEntryStatus};

/// State of a wallet hold (`wallet_hold_state`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "wallet_hold_state")]
#[serde(rename_all = "lowercase")]
pub enum HoldState {
    /// Funds are reserved.
    #[sea_orm(string_value = "active")]
    Active,
    /// Funds were returned to the holder.
    #[sea_orm(string_value = "released")]
    Released,
    /// Funds were paid to a counterparty.
    #[sea_orm(string_value = "captured")]
    Captured,
}

/// Kind of a ledger entry (`wallet_entry_kind`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "wallet_entry_kind")]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Deposit / top-up.
    #[sea_orm(string_value = "credit")]
    Credit,
    /// Withdrawal.
    #[sea_orm(string_value = "debit")]
    Debit,
    /// Incoming transfer side.
    #[sea_orm(string_value = "transfer_in")]
    TransferIn,
    /// Outgoing transfer side.
    #[sea_orm(string_value = "transfer_out")]
    TransferOut,
    /// Either side of a captured hold.
    #[sea_orm(string_value = "payment")]
    Payment,
}

/// Status of a ledger entry (`wallet_entry_status`).
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "wallet_entry_status")]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Recorded, not yet settled.
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Settled; `completed_at` is stamped.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Failed; kept for audit.
    #[sea_orm(string_value = "failed")]
    Failed,
}

impl From<DomainHoldState> for HoldState {
    fn from(state: DomainHoldState) -> Self {
        match state {
            DomainHoldState::Active => Self::Active,
            DomainHoldState::Released => Self::Released,
            DomainHoldState::Captured => Self::Captured,
        }
    }
}

impl From<HoldState> for DomainHoldState {
    fn from(state: HoldState) -> Self {
        match state {
            HoldState::Active => Self::Active,
            HoldState::Released => Self::Released,
            HoldState::Captured => Self::Captured,
        }
    }
}

impl From<LedgerEntryKind> for EntryKind {
    fn from(kind: LedgerEntryKind) -> Self {
        match kind {
            LedgerEntryKind::Credit => Self::Credit,
            LedgerEntryKind::Debit => Self::Debit,
            LedgerEntryKind::TransferIn => Self::TransferIn,
            LedgerEntryKind::TransferOut => Self::TransferOut,
            LedgerEntryKind::Payment => Self::Payment,
        }
    }
}

impl From<EntryKind> for LedgerEntryKind {
    fn from(kind: EntryKind) -> Self {
        match kind {
            EntryKind::Credit => Self::Credit,
            EntryKind::Debit => Self::Debit,
            EntryKind::TransferIn => Self::TransferIn,
            EntryKind::TransferOut => Self::TransferOut,
            EntryKind::Payment => Self::Payment,
        }
    }
}

impl From<LedgerEntryStatus> for EntryStatus {
    fn from(status: LedgerEntryStatus) -> Self {
        match status {
            LedgerEntryStatus::Pending => Self::Pending,
            LedgerEntryStatus::Completed => Self::Completed,
            LedgerEntryStatus::Failed => Self::Failed,
        }
    }
}

impl From<EntryStatus> for LedgerEntryStatus {
    fn from(status: EntryStatus) -> Self {
        match status {
            EntryStatus::Pending => Self::Pending,
            EntryStatus::Completed => Self::Completed,
            EntryStatus::Failed => Self::Failed,
        }
    }
}
