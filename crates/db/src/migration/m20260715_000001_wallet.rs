//! Wallet ledger migration.
//!
//! Creates the balance, hold, transaction, and deposit-address tables plus
//! the enum types backing hold states and ledger entry kinds/statuses.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(WALLET_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            "DROP TABLE IF EXISTS wallet_deposit_addresses CASCADE;
             DROP TABLE IF EXISTS wallet_transactions CASCADE;
             DROP TABLE IF EXISTS wallet_holds CASCADE;
             DROP TABLE IF EXISTS wallet_balances CASCADE;
             DROP TYPE IF EXISTS wallet_entry_status;
             DROP TYPE IF EXISTS wallet_entry_kind;
             DROP TYPE IF EXISTS wallet_hold_state;",
        )
        .await?;
        Ok(())
    }
}

const WALLET_SQL: &str = r"
-- Enum types for hold states and ledger entries
CREATE TYPE wallet_hold_state AS ENUM ('active', 'released', 'captured');
CREATE TYPE wallet_entry_kind AS ENUM ('credit', 'debit', 'transfer_in', 'transfer_out', 'payment');
CREATE TYPE wallet_entry_status AS ENUM ('pending', 'completed', 'failed');

-- One balance row per (user, currency); minor units, no floats
CREATE TABLE wallet_balances (
    user_id UUID NOT NULL,
    currency VARCHAR(16) NOT NULL,
    amount BIGINT NOT NULL DEFAULT 0,
    held BIGINT NOT NULL DEFAULT 0,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (user_id, currency),
    -- Database-level backstop for the core invariant
    CONSTRAINT chk_held_within_amount CHECK (held >= 0 AND held <= amount)
);

-- Temporary reservations against balances
CREATE TABLE wallet_holds (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL,
    order_id UUID,
    currency VARCHAR(16) NOT NULL,
    amount BIGINT NOT NULL,
    state wallet_hold_state NOT NULL DEFAULT 'active',
    expires_at TIMESTAMPTZ NOT NULL,
    released_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_hold_amount_positive CHECK (amount > 0),
    -- released_at is set exactly when the hold leaves the active state
    CONSTRAINT chk_released_at_matches_state CHECK ((state = 'active') = (released_at IS NULL))
);

-- Active holds per balance
CREATE INDEX idx_wallet_holds_active ON wallet_holds(user_id, currency) WHERE state = 'active';

-- Expiry sweep scan
CREATE INDEX idx_wallet_holds_expiry ON wallet_holds(expires_at) WHERE state = 'active';

-- Append-only ledger of balance-affecting events
CREATE TABLE wallet_transactions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL,
    kind wallet_entry_kind NOT NULL,
    currency VARCHAR(16) NOT NULL,
    amount BIGINT NOT NULL,
    fee BIGINT NOT NULL DEFAULT 0,
    status wallet_entry_status NOT NULL DEFAULT 'pending',
    reference_id VARCHAR(64) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    completed_at TIMESTAMPTZ,
    CONSTRAINT chk_fee_non_negative CHECK (fee >= 0)
);

-- Newest-first listing per user (id as stable tiebreak)
CREATE INDEX idx_wallet_transactions_user ON wallet_transactions(user_id, created_at DESC, id DESC);

-- Pair lookup for two-sided events
CREATE INDEX idx_wallet_transactions_reference ON wallet_transactions(reference_id);

-- Deposit addresses (part of the backup payload)
CREATE TABLE wallet_deposit_addresses (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL,
    currency VARCHAR(16) NOT NULL,
    address VARCHAR(128) NOT NULL UNIQUE,
    network VARCHAR(32) NOT NULL DEFAULT 'mainnet',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    last_used_at TIMESTAMPTZ
);

CREATE INDEX idx_wallet_deposit_addresses_user ON wallet_deposit_addresses(user_id, created_at DESC);
";
