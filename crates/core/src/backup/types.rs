//! Backup payload and result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_shared::types::UserId;

/// Current backup payload version.
pub const EXPORT_VERSION: u32 = 1;

/// One balance row inside a backup payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRecord {
    /// Currency code.
    pub currency: String,
    /// Total amount in minor units.
    pub amount: i64,
    /// Amount reserved by active holds at export time.
    pub held: i64,
    /// Last mutation time.
    pub updated_at: Option<DateTime<Utc>>,
}

/// One deposit address inside a backup payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    /// Currency the address receives.
    pub currency: String,
    /// The address string.
    pub address: String,
    /// Network name.
    pub network: String,
}

/// The plaintext backup payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSnapshot {
    /// Payload format version.
    pub version: u32,
    /// The wallet owner; import rejects a caller mismatch.
    pub user_id: UserId,
    /// Export time.
    pub exported_at: DateTime<Utc>,
    /// Balance rows.
    pub balances: Vec<BalanceRecord>,
    /// Deposit addresses.
    pub addresses: Vec<AddressRecord>,
}

impl WalletSnapshot {
    /// Creates a snapshot stamped with the current version and time.
    #[must_use]
    pub fn new(
        user_id: UserId,
        balances: Vec<BalanceRecord>,
        addresses: Vec<AddressRecord>,
    ) -> Self {
        Self {
            version: EXPORT_VERSION,
            user_id,
            exported_at: Utc::now(),
            balances,
            addresses,
        }
    }
}

/// A sealed backup as handed to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletBackup {
    /// Payload format version (also embedded in the ciphertext).
    pub version: u32,
    /// `nonce || ciphertext` (the 12-byte AES-GCM nonce is the prefix).
    pub ciphertext: Vec<u8>,
    /// The random KDF salt; required for import, not secret.
    pub salt: Vec<u8>,
}

/// Count-only result of verifying a backup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Payload format version.
    pub version: u32,
    /// When the backup was exported.
    pub exported_at: DateTime<Utc>,
    /// Number of balance rows in the payload.
    pub balance_count: usize,
    /// Number of deposit addresses in the payload.
    pub address_count: usize,
}
