//! Transfer planning: validation and the balanced ledger pair.
//!
//! A transfer moves available funds directly between two users. Planning is
//! pure; the database layer executes the plan inside one atomic unit of work.

use tally_shared::types::UserId;
use uuid::Uuid;

use super::error::WalletError;
use super::types::LedgerEntryKind;

/// One planned ledger row of a two-sided event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEntry {
    /// The affected party.
    pub user_id: UserId,
    /// Entry kind.
    pub kind: LedgerEntryKind,
    /// Signed amount; positive increases the party's balance.
    pub amount: i64,
    /// Fee in minor units (currently always zero).
    pub fee: i64,
}

/// The two ledger rows of a paired monetary movement, sharing one
/// `reference_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerPair {
    /// Correlates the two rows.
    pub reference_id: String,
    /// The debited side (negative amount).
    pub debit: PlannedEntry,
    /// The credited side (positive amount).
    pub credit: PlannedEntry,
}

impl LedgerPair {
    /// Net signed movement of the pair: `debit + credit + fees`.
    ///
    /// Zero for every pair this module plans (conservation).
    #[must_use]
    pub const fn net(&self) -> i64 {
        self.debit.amount + self.credit.amount + self.debit.fee + self.credit.fee
    }
}

/// Validates a transfer request and plans its balanced ledger pair.
///
/// The pair shares a fresh `reference_id = "transfer:<uuid>"`; the sender's
/// row is `transfer_out` with a negative amount, the recipient's
/// `transfer_in` with the matching positive amount.
///
/// # Errors
///
/// - `InvalidRecipient` if `to == from`.
/// - `InvalidAmount` unless `amount > 0`.
pub fn plan_transfer(from: UserId, to: UserId, amount: i64) -> Result<LedgerPair, WalletError> {
    if to == from {
        return Err(WalletError::InvalidRecipient);
    }
    if amount <= 0 {
        return Err(WalletError::InvalidAmount);
    }

    Ok(LedgerPair {
        reference_id: format!("transfer:{}", Uuid::new_v4()),
        debit: PlannedEntry {
            user_id: from,
            kind: LedgerEntryKind::TransferOut,
            amount: -amount,
            fee: 0,
        },
        credit: PlannedEntry {
            user_id: to,
            kind: LedgerEntryKind::TransferIn,
            amount,
            fee: 0,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_plan_transfer_pair() {
        let from = UserId::new();
        let to = UserId::new();
        let pair = plan_transfer(from, to, 500).unwrap();

        assert!(pair.reference_id.starts_with("transfer:"));
        assert_eq!(pair.debit.user_id, from);
        assert_eq!(pair.debit.kind, LedgerEntryKind::TransferOut);
        assert_eq!(pair.debit.amount, -500);
        assert_eq!(pair.credit.user_id, to);
        assert_eq!(pair.credit.kind, LedgerEntryKind::TransferIn);
        assert_eq!(pair.credit.amount, 500);
    }

    #[test]
    fn test_plan_transfer_rejects_self() {
        let user = UserId::new();
        assert!(matches!(
            plan_transfer(user, user, 500),
            Err(WalletError::InvalidRecipient)
        ));
    }

    #[test]
    fn test_plan_transfer_rejects_non_positive_amount() {
        let from = UserId::new();
        let to = UserId::new();
        assert!(matches!(
            plan_transfer(from, to, 0),
            Err(WalletError::InvalidAmount)
        ));
        assert!(matches!(
            plan_transfer(from, to, -1),
            Err(WalletError::InvalidAmount)
        ));
    }

    #[test]
    fn test_reference_ids_are_unique_per_plan() {
        let from = UserId::new();
        let to = UserId::new();
        let a = plan_transfer(from, to, 100).unwrap();
        let b = plan_transfer(from, to, 100).unwrap();
        assert_ne!(a.reference_id, b.reference_id);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        /// Conservation: the signed amounts of every planned pair sum to
        /// zero (no fee is charged today, so net movement is exactly zero).
        #[test]
        fn prop_transfer_pair_conserves_funds(amount in 1i64..=i64::MAX) {
            let pair = plan_transfer(UserId::new(), UserId::new(), amount).unwrap();
            prop_assert_eq!(pair.net(), 0);
            prop_assert_eq!(pair.debit.amount + pair.credit.amount, 0);
        }
    }
}
