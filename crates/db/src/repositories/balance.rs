//! Balance repository: the single choke point for balance mutation.
//!
//! Every write of a `wallet_balances` row in this crate goes through
//! [`apply_locked`], which goes through the core
//! `BalanceSnapshot::apply_delta` arithmetic. Rows are always locked
//! (`SELECT ... FOR UPDATE`) inside the transaction that mutates them, so
//! check-then-update sequences against the same balance serialize instead of
//! racing.

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use tally_core::wallet::{
    validate_currency, BalanceView, LedgerEntryKind, LedgerEntryStatus, WalletError,
};
use tally_shared::types::UserId;

use super::ledger::{insert_entry, NewLedgerEntry};
use crate::entities::wallet_balances;

/// Locks a balance row for the rest of the transaction.
///
/// Returns `None` if the (user, currency) pair has no row yet.
pub(crate) async fn lock(
    txn: &DatabaseTransaction,
    user: Uuid,
    currency: &str,
) -> Result<Option<wallet_balances::Model>, WalletError> {
    wallet_balances::Entity::find()
        .filter(wallet_balances::Column::UserId.eq(user))
        .filter(wallet_balances::Column::Currency.eq(currency))
        .lock_exclusive()
        .one(txn)
        .await
        .map_err(WalletError::storage)
}

/// Locks a balance row, creating a zero row first if none exists.
///
/// The insert uses ON CONFLICT DO NOTHING, so two transactions racing to
/// create the same row converge on the same locked row.
pub(crate) async fn lock_or_init(
    txn: &DatabaseTransaction,
    user: Uuid,
    currency: &str,
) -> Result<wallet_balances::Model, WalletError> {
    if let Some(row) = lock(txn, user, currency).await? {
        return Ok(row);
    }

    let zero = wallet_balances::ActiveModel {
        user_id: Set(user),
        currency: Set(currency.to_string()),
        amount: Set(0),
        held: Set(0),
        updated_at: Set(Utc::now().into()),
    };
    wallet_balances::Entity::insert(zero)
        .on_conflict(
            OnConflict::columns([
                wallet_balances::Column::UserId,
                wallet_balances::Column::Currency,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(txn)
        .await
        .map_err(WalletError::storage)?;

    lock(txn, user, currency)
        .await?
        .ok_or_else(|| WalletError::Internal("balance row vanished after upsert".to_string()))
}

/// Applies signed deltas to a locked balance row.
///
/// The arithmetic and the `0 <= held <= amount` invariant live in
/// `BalanceSnapshot::apply_delta`; a violation aborts the enclosing
/// transaction, so no partial write survives.
pub(crate) async fn apply_locked(
    txn: &DatabaseTransaction,
    row: wallet_balances::Model,
    amount_delta: i64,
    held_delta: i64,
) -> Result<wallet_balances::Model, WalletError> {
    let next = row.snapshot().apply_delta(amount_delta, held_delta)?;

    let mut active: wallet_balances::ActiveModel = row.into();
    active.amount = Set(next.amount);
    active.held = Set(next.held);
    active.updated_at = Set(Utc::now().into());

    active.update(txn).await.map_err(WalletError::storage)
}

/// Balance repository for reads and external credits/debits.
#[derive(Debug, Clone)]
pub struct BalanceRepository {
    db: DatabaseConnection,
}

impl BalanceRepository {
    /// Creates a new balance repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the balance for (user, currency); zeros if no row exists.
    pub async fn get(&self, user: UserId, currency: &str) -> Result<BalanceView, WalletError> {
        validate_currency(currency)?;

        let row = wallet_balances::Entity::find_by_id((user.into_inner(), currency.to_string()))
            .one(&self.db)
            .await
            .map_err(WalletError::storage)?;

        Ok(row.map_or_else(|| BalanceView::empty(user, currency), Into::into))
    }

    /// Lists all of a user's balances.
    pub async fn list(&self, user: UserId) -> Result<Vec<BalanceView>, WalletError> {
        let rows = wallet_balances::Entity::find()
            .filter(wallet_balances::Column::UserId.eq(user.into_inner()))
            .order_by_asc(wallet_balances::Column::Currency)
            .all(&self.db)
            .await
            .map_err(WalletError::storage)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Credits funds arriving from outside the ledger (deposit, top-up).
    ///
    /// Upserts the balance row and appends a completed `credit` entry in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` unless `amount > 0`.
    pub async fn credit(
        &self,
        user: UserId,
        currency: &str,
        amount: i64,
    ) -> Result<BalanceView, WalletError> {
        validate_currency(currency)?;
        if amount <= 0 {
            return Err(WalletError::InvalidAmount);
        }

        let txn = self.db.begin().await.map_err(WalletError::storage)?;

        let row = lock_or_init(&txn, user.into_inner(), currency).await?;
        let updated = apply_locked(&txn, row, amount, 0).await?;

        insert_entry(
            &txn,
            NewLedgerEntry {
                user_id: user.into_inner(),
                kind: LedgerEntryKind::Credit,
                currency: currency.to_string(),
                amount,
                fee: 0,
                status: LedgerEntryStatus::Completed,
                reference_id: format!("credit:{}", Uuid::new_v4()),
            },
        )
        .await?;

        txn.commit().await.map_err(WalletError::storage)?;
        debug!(user = %user, currency, amount, "credited balance");

        Ok(updated.into())
    }

    /// Debits funds leaving the ledger (withdrawal).
    ///
    /// Requires `available >= amount`; appends a completed `debit` entry.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` unless `amount > 0`.
    /// - `InsufficientBalance` if the available balance cannot cover it.
    pub async fn debit(
        &self,
        user: UserId,
        currency: &str,
        amount: i64,
    ) -> Result<BalanceView, WalletError> {
        validate_currency(currency)?;
        if amount <= 0 {
            return Err(WalletError::InvalidAmount);
        }

        let txn = self.db.begin().await.map_err(WalletError::storage)?;

        let row = lock(&txn, user.into_inner(), currency)
            .await?
            .ok_or(WalletError::InsufficientBalance)?;
        if !row.snapshot().has_available(amount) {
            return Err(WalletError::InsufficientBalance);
        }
        let updated = apply_locked(&txn, row, -amount, 0).await?;

        insert_entry(
            &txn,
            NewLedgerEntry {
                user_id: user.into_inner(),
                kind: LedgerEntryKind::Debit,
                currency: currency.to_string(),
                amount: -amount,
                fee: 0,
                status: LedgerEntryStatus::Completed,
                reference_id: format!("debit:{}", Uuid::new_v4()),
            },
        )
        .await?;

        txn.commit().await.map_err(WalletError::storage)?;
        debug!(user = %user, currency, amount, "debited balance");

        Ok(updated.into())
    }
}
