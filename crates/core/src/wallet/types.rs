//! Wallet domain types: ledger entry vocabulary, hold states, and the
//! result structs returned by wallet operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_shared::types::{DepositAddressId, HoldId, LedgerEntryId, UserId};

use super::error::WalletError;

/// Validates a currency code: a short uppercase string such as `"USD"`.
///
/// Codes are not checked against an ISO list; collaborators own that choice.
///
/// # Errors
///
/// Returns `InvalidCurrency` for an empty, overlong, or non-uppercase code.
pub fn validate_currency(currency: &str) -> Result<(), WalletError> {
    let ok = !currency.is_empty()
        && currency.len() <= 16
        && currency.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
    if ok {
        Ok(())
    } else {
        Err(WalletError::InvalidCurrency)
    }
}

/// Kind of a ledger entry.
///
/// A closed set rather than a free string, so adding a consumer forces an
/// exhaustive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerEntryKind {
    /// Funds credited from outside the ledger (deposit, top-up).
    Credit,
    /// Funds debited to outside the ledger (withdrawal).
    Debit,
    /// Incoming side of a peer-to-peer transfer.
    TransferIn,
    /// Outgoing side of a peer-to-peer transfer.
    TransferOut,
    /// Either side of a captured hold.
    Payment,
}

impl LedgerEntryKind {
    /// Stable wire name of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
            Self::TransferIn => "transfer_in",
            Self::TransferOut => "transfer_out",
            Self::Payment => "payment",
        }
    }
}

impl std::fmt::Display for LedgerEntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerEntryStatus {
    /// The event has been recorded but not yet settled.
    Pending,
    /// The event is settled; `completed_at` is stamped.
    Completed,
    /// The event failed; the row remains for audit.
    Failed,
}

impl LedgerEntryStatus {
    /// Returns true if the entry can still move to `Completed`.
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// State of a wallet hold.
///
/// `Active` is the only non-terminal state: a hold transitions at most once,
/// to either `Released` or `Captured`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoldState {
    /// Funds are reserved against the holder's balance.
    Active,
    /// Funds were returned to the holder's available balance.
    Released,
    /// Funds were paid out to a counterparty.
    Captured,
}

impl HoldState {
    /// Returns true if the hold has reached a terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Released | Self::Captured)
    }

    /// Returns true if the hold still reserves funds.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// A user's balance in one currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceView {
    /// The balance owner.
    pub user_id: UserId,
    /// Currency code (short uppercase string, e.g. "USD").
    pub currency: String,
    /// Total amount in minor units.
    pub amount: i64,
    /// Amount reserved by active holds.
    pub held: i64,
    /// Freely spendable amount (`amount - held`).
    pub available: i64,
    /// Last mutation time; `None` for a never-written balance.
    pub updated_at: Option<DateTime<Utc>>,
}

impl BalanceView {
    /// A zero balance for a (user, currency) pair with no stored row.
    #[must_use]
    pub fn empty(user_id: UserId, currency: impl Into<String>) -> Self {
        Self {
            user_id,
            currency: currency.into(),
            amount: 0,
            held: 0,
            available: 0,
            updated_at: None,
        }
    }
}

/// Result of placing a hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldResult {
    /// The new hold's ID.
    pub id: HoldId,
    /// When the hold expires (advisory until swept).
    pub expires_at: DateTime<Utc>,
}

/// Result of capturing a hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureResult {
    /// The captured hold's ID.
    pub hold_id: HoldId,
    /// The counterparty credited by the capture.
    pub counterparty: UserId,
    /// Currency of the captured amount.
    pub currency: String,
    /// Captured amount in minor units.
    pub amount: i64,
    /// Correlates the paired ledger rows (`hold:<hold_id>`).
    pub reference_id: String,
}

/// Result of a peer-to-peer transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferResult {
    /// Sender.
    pub from: UserId,
    /// Recipient.
    pub to: UserId,
    /// Currency of the moved amount.
    pub currency: String,
    /// Moved amount in minor units.
    pub amount: i64,
    /// Correlates the paired ledger rows (`transfer:<uuid>`).
    pub reference_id: String,
}

/// An immutable ledger entry as seen by its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntryView {
    /// Entry ID.
    pub id: LedgerEntryId,
    /// The affected party.
    pub user_id: UserId,
    /// Entry kind.
    pub kind: LedgerEntryKind,
    /// Currency code.
    pub currency: String,
    /// Signed amount in minor units; positive increases the owner's balance.
    pub amount: i64,
    /// Fee in minor units (non-negative).
    pub fee: i64,
    /// Entry status.
    pub status: LedgerEntryStatus,
    /// Correlates the paired rows of a two-sided event.
    pub reference_id: String,
    /// Insertion time.
    pub created_at: DateTime<Utc>,
    /// Settlement time; set once, when status moves to `Completed`.
    pub completed_at: Option<DateTime<Utc>>,
}

/// A deposit address owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositAddressView {
    /// Address ID.
    pub id: DepositAddressId,
    /// Currency the address receives.
    pub currency: String,
    /// The address string.
    pub address: String,
    /// Network name (e.g. "mainnet").
    pub network: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last time a deposit arrived through this address.
    pub last_used_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_kind_wire_names() {
        assert_eq!(LedgerEntryKind::Credit.as_str(), "credit");
        assert_eq!(LedgerEntryKind::TransferIn.as_str(), "transfer_in");
        assert_eq!(LedgerEntryKind::TransferOut.as_str(), "transfer_out");
        assert_eq!(LedgerEntryKind::Payment.to_string(), "payment");
    }

    #[test]
    fn test_hold_state_terminal() {
        assert!(!HoldState::Active.is_terminal());
        assert!(HoldState::Released.is_terminal());
        assert!(HoldState::Captured.is_terminal());
        assert!(HoldState::Active.is_active());
    }

    #[test]
    fn test_entry_status_pending() {
        assert!(LedgerEntryStatus::Pending.is_pending());
        assert!(!LedgerEntryStatus::Completed.is_pending());
        assert!(!LedgerEntryStatus::Failed.is_pending());
    }

    #[test]
    fn test_empty_balance_view() {
        let view = BalanceView::empty(UserId::new(), "USD");
        assert_eq!(view.amount, 0);
        assert_eq!(view.held, 0);
        assert_eq!(view.available, 0);
        assert!(view.updated_at.is_none());
    }

    #[test]
    fn test_validate_currency() {
        assert!(validate_currency("USD").is_ok());
        assert!(validate_currency("USDT20").is_ok());
        assert!(matches!(
            validate_currency(""),
            Err(WalletError::InvalidCurrency)
        ));
        assert!(matches!(
            validate_currency("usd"),
            Err(WalletError::InvalidCurrency)
        ));
        assert!(matches!(
            validate_currency("THIS-IS-NOT-A-CURRENCY"),
            Err(WalletError::InvalidCurrency)
        ));
    }

    #[test]
    fn test_entry_kind_serde_round_trip() {
        let json = serde_json::to_string(&LedgerEntryKind::TransferOut).unwrap();
        assert_eq!(json, "\"transfer_out\"");
        let back: LedgerEntryKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, LedgerEntryKind::TransferOut);
    }
}
