//! Hold repository: the Active -> {Released, Captured} state machine
//! against the durable store.
//!
//! Each operation is one database transaction. The hold row and every
//! touched balance row are locked FOR UPDATE, so concurrent holds against
//! the same balance serialize and can never jointly over-commit it.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{debug, info};
use uuid::Uuid;

use tally_core::wallet::hold::{
    ensure_active, ensure_owner, normalize_ttl, plan_capture, validate_hold_amount,
};
use tally_core::wallet::{
    validate_currency, CaptureResult, HoldResult, LedgerEntryStatus, WalletError,
};
use tally_shared::config::WalletConfig;
use tally_shared::types::{HoldId, OrderId, UserId};

use super::balance::{apply_locked, lock, lock_or_init};
use super::ledger::{insert_entry, NewLedgerEntry};
use crate::entities::sea_orm_active_enums::HoldState;
use crate::entities::{wallet_balances, wallet_holds};

/// Hold repository for placing, releasing, and capturing holds.
#[derive(Debug, Clone)]
pub struct HoldRepository {
    db: DatabaseConnection,
    config: WalletConfig,
}

impl HoldRepository {
    /// Creates a new hold repository.
    ///
    /// Configuration is passed in explicitly; nothing is read from ambient
    /// globals.
    #[must_use]
    pub const fn new(db: DatabaseConnection, config: WalletConfig) -> Self {
        Self { db, config }
    }

    /// Places a hold against the caller's available balance.
    ///
    /// One transaction: lock the balance row, check availability, insert the
    /// Active hold, raise `held`. A missing balance row means nothing is
    /// available.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` unless `amount > 0`.
    /// - `InsufficientBalance` if `available < amount`.
    pub async fn place(
        &self,
        user: UserId,
        currency: &str,
        amount: i64,
        order_id: Option<OrderId>,
        ttl_secs: Option<i64>,
    ) -> Result<HoldResult, WalletError> {
        validate_currency(currency)?;
        validate_hold_amount(amount)?;

        let now = Utc::now();
        let expires_at = now + normalize_ttl(ttl_secs, self.config.default_hold_ttl_secs);

        let txn = self.db.begin().await.map_err(WalletError::storage)?;

        let row = lock(&txn, user.into_inner(), currency)
            .await?
            .ok_or(WalletError::InsufficientBalance)?;
        if !row.snapshot().has_available(amount) {
            return Err(WalletError::InsufficientBalance);
        }

        let hold_id = Uuid::new_v4();
        let hold = wallet_holds::ActiveModel {
            id: Set(hold_id),
            user_id: Set(user.into_inner()),
            order_id: Set(order_id.map(OrderId::into_inner)),
            currency: Set(currency.to_string()),
            amount: Set(amount),
            state: Set(HoldState::Active),
            expires_at: Set(expires_at.into()),
            released_at: Set(None),
            created_at: Set(now.into()),
        };
        hold.insert(&txn).await.map_err(WalletError::storage)?;

        apply_locked(&txn, row, 0, amount).await?;

        txn.commit().await.map_err(WalletError::storage)?;
        debug!(user = %user, currency, amount, hold = %hold_id, "placed hold");

        Ok(HoldResult {
            id: HoldId::from_uuid(hold_id),
            expires_at,
        })
    }

    /// Releases an Active hold, returning the funds to the holder's
    /// available balance.
    ///
    /// # Errors
    ///
    /// - `HoldNotFound` if no such hold exists.
    /// - `Forbidden` if the caller is not the holder.
    /// - `AlreadyFinal` if the hold was already released or captured.
    pub async fn release(&self, hold_id: HoldId, caller: UserId) -> Result<(), WalletError> {
        let txn = self.db.begin().await.map_err(WalletError::storage)?;

        let hold = lock_hold(&txn, hold_id.into_inner())
            .await?
            .ok_or(WalletError::HoldNotFound(hold_id.into_inner()))?;
        ensure_owner(UserId::from_uuid(hold.user_id), caller)?;
        ensure_active(hold.state.clone().into())?;

        let user = hold.user_id;
        let currency = hold.currency.clone();
        let amount = hold.amount;

        finalize(&txn, hold, HoldState::Released).await?;

        let row = lock(&txn, user, &currency)
            .await?
            .ok_or_else(|| WalletError::Internal("balance row missing for active hold".to_string()))?;
        apply_locked(&txn, row, 0, -amount).await?;

        txn.commit().await.map_err(WalletError::storage)?;
        debug!(hold = %hold_id, "released hold");

        Ok(())
    }

    /// Captures an Active hold: the held funds leave the holder's balance
    /// and arrive, unheld, at the counterparty's.
    ///
    /// Only the holder may authorize capture (a buyer confirming delivery).
    /// Appends the paired `payment` ledger rows sharing
    /// `reference_id = "hold:<hold_id>"`. Irreversible from the ledger's
    /// point of view; a refund is a new transfer.
    ///
    /// # Errors
    ///
    /// - `HoldNotFound`, `Forbidden`, `AlreadyFinal` as for release.
    /// - `InvalidRecipient` if the counterparty is the holder.
    pub async fn capture(
        &self,
        hold_id: HoldId,
        caller: UserId,
        counterparty: UserId,
    ) -> Result<CaptureResult, WalletError> {
        let txn = self.db.begin().await.map_err(WalletError::storage)?;

        let hold = lock_hold(&txn, hold_id.into_inner())
            .await?
            .ok_or(WalletError::HoldNotFound(hold_id.into_inner()))?;
        let holder = UserId::from_uuid(hold.user_id);
        ensure_owner(holder, caller)?;
        ensure_active(hold.state.clone().into())?;

        let plan = plan_capture(hold_id, holder, counterparty, hold.amount)?;
        let currency = hold.currency.clone();
        let amount = hold.amount;

        // Lock both balance rows in ascending user-UUID order so two
        // captures running in opposite directions cannot deadlock.
        let (holder_row, counterparty_row) = if holder.into_inner() <= counterparty.into_inner() {
            let h = lock_holder_row(&txn, holder.into_inner(), &currency).await?;
            let c = lock_or_init(&txn, counterparty.into_inner(), &currency).await?;
            (h, c)
        } else {
            let c = lock_or_init(&txn, counterparty.into_inner(), &currency).await?;
            let h = lock_holder_row(&txn, holder.into_inner(), &currency).await?;
            (h, c)
        };

        finalize(&txn, hold, HoldState::Captured).await?;

        // Holder: amount and held both drop by the captured amount.
        apply_locked(&txn, holder_row, -amount, -amount).await?;
        // Counterparty: credit arrives immediately, unheld.
        apply_locked(&txn, counterparty_row, amount, 0).await?;

        insert_entry(
            &txn,
            NewLedgerEntry::from_planned(
                &plan.debit,
                &currency,
                &plan.reference_id,
                LedgerEntryStatus::Completed,
            ),
        )
        .await?;
        insert_entry(
            &txn,
            NewLedgerEntry::from_planned(
                &plan.credit,
                &currency,
                &plan.reference_id,
                LedgerEntryStatus::Completed,
            ),
        )
        .await?;

        txn.commit().await.map_err(WalletError::storage)?;
        info!(hold = %hold_id, counterparty = %counterparty, amount, "captured hold");

        Ok(CaptureResult {
            hold_id,
            counterparty,
            currency,
            amount,
            reference_id: plan.reference_id,
        })
    }

    /// Releases expired-but-Active holds, one atomic unit each.
    ///
    /// Expiry is advisory until this sweep (or an explicit release/capture)
    /// runs: an expired unswept hold still blocks funds. Intended for a
    /// periodic operational job, not the request path. Returns the number of
    /// holds released; the batch size comes from the wallet configuration.
    pub async fn release_expired(&self) -> Result<u64, WalletError> {
        let now = Utc::now();
        let expired = wallet_holds::Entity::find()
            .filter(wallet_holds::Column::State.eq(HoldState::Active))
            .filter(wallet_holds::Column::ExpiresAt.lt(now))
            .order_by_asc(wallet_holds::Column::ExpiresAt)
            .limit(self.config.sweep_batch_size)
            .all(&self.db)
            .await
            .map_err(WalletError::storage)?;

        let mut released = 0u64;
        for hold in expired {
            if self.release_one_expired(hold.id).await? {
                released += 1;
            }
        }

        if released > 0 {
            info!(released, "expired hold sweep finished");
        }
        Ok(released)
    }

    /// Releases a single expired hold; returns false if it raced to a
    /// terminal state (or vanished) between the scan and the lock.
    async fn release_one_expired(&self, hold_id: Uuid) -> Result<bool, WalletError> {
        let txn = self.db.begin().await.map_err(WalletError::storage)?;

        let Some(hold) = lock_hold(&txn, hold_id).await? else {
            return Ok(false);
        };
        if hold.state != HoldState::Active {
            return Ok(false);
        }

        let user = hold.user_id;
        let currency = hold.currency.clone();
        let amount = hold.amount;

        finalize(&txn, hold, HoldState::Released).await?;

        let row = lock(&txn, user, &currency)
            .await?
            .ok_or_else(|| WalletError::Internal("balance row missing for active hold".to_string()))?;
        apply_locked(&txn, row, 0, -amount).await?;

        txn.commit().await.map_err(WalletError::storage)?;
        Ok(true)
    }
}

/// Locks a hold row for the rest of the transaction.
async fn lock_hold(
    txn: &DatabaseTransaction,
    hold_id: Uuid,
) -> Result<Option<wallet_holds::Model>, WalletError> {
    wallet_holds::Entity::find_by_id(hold_id)
        .lock_exclusive()
        .one(txn)
        .await
        .map_err(WalletError::storage)
}

/// Locks the holder's balance row; an Active hold guarantees it exists.
async fn lock_holder_row(
    txn: &DatabaseTransaction,
    holder: Uuid,
    currency: &str,
) -> Result<wallet_balances::Model, WalletError> {
    lock(txn, holder, currency)
        .await?
        .ok_or_else(|| WalletError::Internal("balance row missing for active hold".to_string()))
}

/// Moves a hold to a terminal state, stamping `released_at` once.
async fn finalize(
    txn: &DatabaseTransaction,
    hold: wallet_holds::Model,
    state: HoldState,
) -> Result<wallet_holds::Model, WalletError> {
    let mut active: wallet_holds::ActiveModel = hold.into();
    active.state = Set(state);
    active.released_at = Set(Some(Utc::now().into()));
    active.update(txn).await.map_err(WalletError::storage)
}
