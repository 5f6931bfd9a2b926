//! Deposit address repository.
//!
//! Addresses are part of the wallet backup payload and listed per user.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use tally_core::wallet::{validate_currency, DepositAddressView, WalletError};
use tally_shared::types::UserId;

use crate::entities::wallet_deposit_addresses;

/// Default network when the caller supplies none.
const DEFAULT_NETWORK: &str = "mainnet";

/// Deposit address repository.
#[derive(Debug, Clone)]
pub struct DepositAddressRepository {
    db: DatabaseConnection,
}

impl DepositAddressRepository {
    /// Creates a new deposit address repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a deposit address for (user, currency).
    ///
    /// Generates a placeholder address; a real deployment would ask a chain
    /// gateway for one.
    pub async fn create(
        &self,
        user: UserId,
        currency: &str,
        network: Option<&str>,
    ) -> Result<DepositAddressView, WalletError> {
        validate_currency(currency)?;
        let network = match network {
            Some(n) if !n.is_empty() => n,
            _ => DEFAULT_NETWORK,
        };

        let address = format!("0x{}", Uuid::new_v4().simple());

        let row = wallet_deposit_addresses::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.into_inner()),
            currency: Set(currency.to_string()),
            address: Set(address),
            network: Set(network.to_string()),
            created_at: Set(Utc::now().into()),
            last_used_at: Set(None),
        };

        let model = row.insert(&self.db).await.map_err(WalletError::storage)?;
        Ok(model.into())
    }

    /// Lists a user's deposit addresses, newest-first.
    pub async fn list(&self, user: UserId) -> Result<Vec<DepositAddressView>, WalletError> {
        let rows = wallet_deposit_addresses::Entity::find()
            .filter(wallet_deposit_addresses::Column::UserId.eq(user.into_inner()))
            .order_by_desc(wallet_deposit_addresses::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(WalletError::storage)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
