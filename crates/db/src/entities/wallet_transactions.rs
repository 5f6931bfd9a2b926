//! `SeaORM` Entity for the wallet_transactions table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::wallet::LedgerEntryView;
use tally_shared::types::{LedgerEntryId, UserId};

use super::sea_orm_active_enums::{EntryKind, EntryStatus};

/// One immutable ledger row. Only `status`/`completed_at` may move, once,
/// from pending to completed; everything else is append-only.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "wallet_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: EntryKind,
    pub currency: String,
    /// Signed amount; positive increases the named user's balance.
    pub amount: i64,
    pub fee: i64,
    pub status: EntryStatus,
    /// Correlates the paired rows of a two-sided event.
    pub reference_id: String,
    pub created_at: DateTimeWithTimeZone,
    pub completed_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for LedgerEntryView {
    fn from(model: Model) -> Self {
        Self {
            id: LedgerEntryId::from_uuid(model.id),
            user_id: UserId::from_uuid(model.user_id),
            kind: model.kind.into(),
            currency: model.currency,
            amount: model.amount,
            fee: model.fee,
            status: model.status.into(),
            reference_id: model.reference_id,
            created_at: model.created_at.into(),
            completed_at: model.completed_at.map(Into::into),
        }
    }
}
