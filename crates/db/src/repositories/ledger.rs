//! Ledger repository: the append-only log of balance-affecting events.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use tally_core::wallet::{
    validate_currency, LedgerEntryKind, LedgerEntryStatus, LedgerEntryView, PlannedEntry,
    WalletError,
};
use tally_shared::types::{LedgerEntryId, PageRequest, PageResponse, UserId};

use crate::entities::wallet_transactions;

/// Input for one ledger entry.
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    /// The affected party.
    pub user_id: Uuid,
    /// Entry kind.
    pub kind: LedgerEntryKind,
    /// Currency code.
    pub currency: String,
    /// Signed amount; positive increases the named user's balance.
    pub amount: i64,
    /// Fee in minor units (non-negative).
    pub fee: i64,
    /// Initial status.
    pub status: LedgerEntryStatus,
    /// Correlates the paired rows of a two-sided event.
    pub reference_id: String,
}

impl NewLedgerEntry {
    /// Builds an entry from one planned side of a paired movement.
    pub(crate) fn from_planned(
        planned: &PlannedEntry,
        currency: &str,
        reference_id: &str,
        status: LedgerEntryStatus,
    ) -> Self {
        Self {
            user_id: planned.user_id.into_inner(),
            kind: planned.kind,
            currency: currency.to_string(),
            amount: planned.amount,
            fee: planned.fee,
            status,
            reference_id: reference_id.to_string(),
        }
    }
}

/// Inserts one ledger row on any connection (pooled or mid-transaction).
///
/// `completed_at` is stamped iff the entry is born `Completed`.
pub(crate) async fn insert_entry<C: sea_orm::ConnectionTrait>(
    conn: &C,
    input: NewLedgerEntry,
) -> Result<wallet_transactions::Model, WalletError> {
    let now = Utc::now();
    let completed_at = matches!(input.status, LedgerEntryStatus::Completed).then_some(now.into());

    let entry = wallet_transactions::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(input.user_id),
        kind: Set(input.kind.into()),
        currency: Set(input.currency),
        amount: Set(input.amount),
        fee: Set(input.fee),
        status: Set(input.status.into()),
        reference_id: Set(input.reference_id),
        created_at: Set(now.into()),
        completed_at: Set(completed_at),
    };

    entry.insert(conn).await.map_err(WalletError::storage)
}

/// Ledger repository for append and read operations.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Appends one immutable entry.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` for a zero amount or negative fee, and
    /// `Storage` if the insert fails.
    pub async fn append(&self, input: NewLedgerEntry) -> Result<LedgerEntryView, WalletError> {
        if input.amount == 0 || input.fee < 0 {
            return Err(WalletError::InvalidAmount);
        }
        validate_currency(&input.currency)?;

        let model = insert_entry(&self.db, input).await?;
        Ok(model.into())
    }

    /// Moves a pending entry to `Completed`, stamping `completed_at` once.
    ///
    /// # Errors
    ///
    /// - `TransactionNotFound` if the entry does not exist.
    /// - `AlreadyFinal` if the entry is not pending.
    pub async fn mark_completed(&self, id: LedgerEntryId) -> Result<LedgerEntryView, WalletError> {
        let entry = wallet_transactions::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(WalletError::storage)?
            .ok_or(WalletError::TransactionNotFound(id.into_inner()))?;

        if !LedgerEntryStatus::from(entry.status.clone()).is_pending() {
            return Err(WalletError::AlreadyFinal);
        }

        let mut active: wallet_transactions::ActiveModel = entry.into();
        active.status = Set(LedgerEntryStatus::Completed.into());
        active.completed_at = Set(Some(Utc::now().into()));

        let updated = active.update(&self.db).await.map_err(WalletError::storage)?;
        Ok(updated.into())
    }

    /// Lists a user's entries newest-first.
    ///
    /// Ordered by `(created_at, id)` descending so pages stay stable under
    /// concurrent appends (within snapshot-read skew).
    pub async fn list_by_user(
        &self,
        user: UserId,
        page: &PageRequest,
    ) -> Result<PageResponse<LedgerEntryView>, WalletError> {
        let filter = wallet_transactions::Column::UserId.eq(user.into_inner());

        let total = wallet_transactions::Entity::find()
            .filter(filter.clone())
            .count(&self.db)
            .await
            .map_err(WalletError::storage)?;

        let entries = wallet_transactions::Entity::find()
            .filter(filter)
            .order_by_desc(wallet_transactions::Column::CreatedAt)
            .order_by_desc(wallet_transactions::Column::Id)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(WalletError::storage)?;

        let data = entries.into_iter().map(Into::into).collect();
        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Fetches one entry, visible only to its owner.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` if the entry does not exist *or*
    /// belongs to another user; the two cases are indistinguishable.
    pub async fn get_by_id(
        &self,
        id: LedgerEntryId,
        user: UserId,
    ) -> Result<LedgerEntryView, WalletError> {
        wallet_transactions::Entity::find_by_id(id.into_inner())
            .filter(wallet_transactions::Column::UserId.eq(user.into_inner()))
            .one(&self.db)
            .await
            .map_err(WalletError::storage)?
            .map(Into::into)
            .ok_or(WalletError::TransactionNotFound(id.into_inner()))
    }
}
