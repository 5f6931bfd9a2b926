//! `SeaORM` Entity for the wallet_holds table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::HoldState;

/// A temporary reservation against a balance. Never hard-deleted; terminal
/// rows keep their `released_at` stamp.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "wallet_holds")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    /// Opaque correlation key from the order-management collaborator.
    pub order_id: Option<Uuid>,
    pub currency: String,
    pub amount: i64,
    pub state: HoldState,
    pub expires_at: DateTimeWithTimeZone,
    /// Set exactly once, on the terminal transition.
    pub released_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
