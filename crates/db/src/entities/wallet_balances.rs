//! `SeaORM` Entity for the wallet_balances table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::wallet::{BalanceSnapshot, BalanceView};
use tally_shared::types::UserId;

/// One balance row per (user, currency); the invariant `0 <= held <= amount`
/// is also enforced by a table CHECK constraint.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "wallet_balances")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub currency: String,
    pub amount: i64,
    pub held: i64,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// The row's balance as a domain snapshot.
    #[must_use]
    pub const fn snapshot(&self) -> BalanceSnapshot {
        BalanceSnapshot {
            amount: self.amount,
            held: self.held,
        }
    }
}

impl From<Model> for BalanceView {
    fn from(model: Model) -> Self {
        let available = model.snapshot().available();
        Self {
            user_id: UserId::from_uuid(model.user_id),
            currency: model.currency,
            amount: model.amount,
            held: model.held,
            available,
            updated_at: Some(model.updated_at.into()),
        }
    }
}
