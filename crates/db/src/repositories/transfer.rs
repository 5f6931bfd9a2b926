//! Transfer repository: direct peer-to-peer balance moves.

use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::info;

use tally_core::wallet::transfer::plan_transfer;
use tally_core::wallet::{validate_currency, LedgerEntryStatus, TransferResult, WalletError};
use tally_shared::types::UserId;

use super::balance::{apply_locked, lock, lock_or_init};
use super::ledger::{insert_entry, NewLedgerEntry};

/// Transfer repository.
#[derive(Debug, Clone)]
pub struct TransferRepository {
    db: DatabaseConnection,
}

impl TransferRepository {
    /// Creates a new transfer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Moves available funds from one user to another.
    ///
    /// One transaction: both balance rows are locked in ascending user-UUID
    /// order (the recipient's row is created lazily), the sender's available
    /// balance is checked under the lock, both deltas apply, and the
    /// `transfer_out`/`transfer_in` ledger pair is appended as completed.
    /// Both sides commit together or not at all.
    ///
    /// # Errors
    ///
    /// - `InvalidRecipient` if `to == from`.
    /// - `InvalidAmount` unless `amount > 0`.
    /// - `InsufficientBalance` if the sender cannot cover the amount.
    pub async fn transfer(
        &self,
        from: UserId,
        to: UserId,
        currency: &str,
        amount: i64,
    ) -> Result<TransferResult, WalletError> {
        validate_currency(currency)?;
        let plan = plan_transfer(from, to, amount)?;

        let txn = self.db.begin().await.map_err(WalletError::storage)?;

        // Fixed global lock order: ascending user UUID, so two transfers
        // running in opposite directions between the same pair cannot
        // deadlock.
        let (from_row, to_row) = if from.into_inner() <= to.into_inner() {
            let f = lock(&txn, from.into_inner(), currency).await?;
            let t = lock_or_init(&txn, to.into_inner(), currency).await?;
            (f, t)
        } else {
            let t = lock_or_init(&txn, to.into_inner(), currency).await?;
            let f = lock(&txn, from.into_inner(), currency).await?;
            (f, t)
        };

        let from_row = from_row.ok_or(WalletError::InsufficientBalance)?;
        if !from_row.snapshot().has_available(amount) {
            return Err(WalletError::InsufficientBalance);
        }

        apply_locked(&txn, from_row, -amount, 0).await?;
        apply_locked(&txn, to_row, amount, 0).await?;

        insert_entry(
            &txn,
            NewLedgerEntry::from_planned(
                &plan.debit,
                currency,
                &plan.reference_id,
                LedgerEntryStatus::Completed,
            ),
        )
        .await?;
        insert_entry(
            &txn,
            NewLedgerEntry::from_planned(
                &plan.credit,
                currency,
                &plan.reference_id,
                LedgerEntryStatus::Completed,
            ),
        )
        .await?;

        txn.commit().await.map_err(WalletError::storage)?;
        info!(from = %from, to = %to, currency, amount, "transfer completed");

        Ok(TransferResult {
            from,
            to,
            currency: currency.to_string(),
            amount,
            reference_id: plan.reference_id,
        })
    }
}
