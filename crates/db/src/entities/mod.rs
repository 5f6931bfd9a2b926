//! `SeaORM` entity definitions for the wallet tables.

pub mod sea_orm_active_enums;
pub mod wallet_balances;
pub mod wallet_deposit_addresses;
pub mod wallet_holds;
pub mod wallet_transactions;
