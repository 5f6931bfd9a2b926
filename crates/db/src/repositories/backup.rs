//! Backup repository: assembles the wallet snapshot and seals it.
//!
//! The codec itself is pure and lives in `tally-core`; this repository only
//! gathers the user's rows. Import needs no database access at all —
//! verification happens entirely in the core codec.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use tally_core::backup::{self, AddressRecord, BalanceRecord, WalletBackup, WalletSnapshot};
use tally_core::wallet::WalletError;
use tally_shared::types::UserId;

use crate::entities::{wallet_balances, wallet_deposit_addresses};

/// Backup repository.
#[derive(Debug, Clone)]
pub struct BackupRepository {
    db: DatabaseConnection,
}

impl BackupRepository {
    /// Creates a new backup repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Exports the user's balances and deposit addresses as a sealed backup.
    pub async fn export(&self, user: UserId, password: &str) -> Result<WalletBackup, WalletError> {
        let balances = wallet_balances::Entity::find()
            .filter(wallet_balances::Column::UserId.eq(user.into_inner()))
            .order_by_asc(wallet_balances::Column::Currency)
            .all(&self.db)
            .await
            .map_err(WalletError::storage)?
            .into_iter()
            .map(|row| BalanceRecord {
                currency: row.currency,
                amount: row.amount,
                held: row.held,
                updated_at: Some(row.updated_at.into()),
            })
            .collect();

        let addresses = wallet_deposit_addresses::Entity::find()
            .filter(wallet_deposit_addresses::Column::UserId.eq(user.into_inner()))
            .order_by_asc(wallet_deposit_addresses::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(WalletError::storage)?
            .into_iter()
            .map(|row| AddressRecord {
                currency: row.currency,
                address: row.address,
                network: row.network,
            })
            .collect();

        let snapshot = WalletSnapshot::new(user, balances, addresses);
        backup::export(&snapshot, password)
    }
}
