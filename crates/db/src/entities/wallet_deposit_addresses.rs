//! `SeaORM` Entity for the wallet_deposit_addresses table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::wallet::DepositAddressView;
use tally_shared::types::DepositAddressId;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "wallet_deposit_addresses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub currency: String,
    #[sea_orm(unique)]
    pub address: String,
    pub network: String,
    pub created_at: DateTimeWithTimeZone,
    pub last_used_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for DepositAddressView {
    fn from(model: Model) -> Self {
        Self {
            id: DepositAddressId::from_uuid(model.id),
            currency: model.currency,
            address: model.address,
            network: model.network,
            created_at: model.created_at.into(),
            last_used_at: model.last_used_at.map(Into::into),
        }
    }
}
