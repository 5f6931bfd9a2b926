//! Balance arithmetic and the core invariant `0 <= held <= amount`.
//!
//! Every balance mutation in the system routes through
//! [`BalanceSnapshot::apply_delta`]; the database layer never writes a
//! balance row it has not produced here first.

use serde::{Deserialize, Serialize};

use super::error::WalletError;

/// A point-in-time balance for one (user, currency) pair.
///
/// Amounts are integers in the currency's minor unit. Floating point never
/// touches money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    /// Total amount in minor units.
    pub amount: i64,
    /// Amount reserved by active holds.
    pub held: i64,
}

impl BalanceSnapshot {
    /// The zero balance, used for (user, currency) pairs with no stored row.
    pub const ZERO: Self = Self { amount: 0, held: 0 };

    /// Creates a snapshot, validating the invariant.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientBalance` if `0 <= held <= amount` does not hold.
    pub const fn new(amount: i64, held: i64) -> Result<Self, WalletError> {
        let snapshot = Self { amount, held };
        if snapshot.is_valid() {
            Ok(snapshot)
        } else {
            Err(WalletError::InsufficientBalance)
        }
    }

    /// Returns true if `0 <= held <= amount`.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        0 <= self.held && self.held <= self.amount
    }

    /// The freely spendable portion: `amount - held`.
    #[must_use]
    pub const fn available(self) -> i64 {
        self.amount - self.held
    }

    /// Returns true if `requested` more minor units could be held or spent.
    #[must_use]
    pub const fn has_available(self, requested: i64) -> bool {
        self.available() >= requested
    }

    /// Applies signed deltas to `amount` and `held`, re-checking the
    /// invariant on the result.
    ///
    /// This is the single arithmetic choke point for balance mutation.
    ///
    /// # Errors
    ///
    /// - `AmountOverflow` if either addition leaves the `i64` range.
    /// - `InsufficientBalance` if the resulting state violates
    ///   `0 <= held <= amount`.
    pub fn apply_delta(self, amount_delta: i64, held_delta: i64) -> Result<Self, WalletError> {
        let amount = self
            .amount
            .checked_add(amount_delta)
            .ok_or(WalletError::AmountOverflow)?;
        let held = self
            .held
            .checked_add(held_delta)
            .ok_or(WalletError::AmountOverflow)?;

        Self::new(amount, held)
    }
}

impl Default for BalanceSnapshot {
    fn default() -> Self {
        Self::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_balance() {
        assert_eq!(BalanceSnapshot::ZERO.amount, 0);
        assert_eq!(BalanceSnapshot::ZERO.available(), 0);
        assert!(BalanceSnapshot::ZERO.is_valid());
    }

    #[test]
    fn test_available() {
        let b = BalanceSnapshot::new(1000, 300).unwrap();
        assert_eq!(b.available(), 700);
        assert!(b.has_available(700));
        assert!(!b.has_available(701));
    }

    #[test]
    fn test_new_rejects_held_above_amount() {
        assert!(matches!(
            BalanceSnapshot::new(100, 101),
            Err(WalletError::InsufficientBalance)
        ));
    }

    #[test]
    fn test_new_rejects_negative_held() {
        assert!(matches!(
            BalanceSnapshot::new(100, -1),
            Err(WalletError::InsufficientBalance)
        ));
    }

    #[test]
    fn test_apply_delta_place_hold() {
        let b = BalanceSnapshot::new(1000, 0).unwrap();
        let b = b.apply_delta(0, 300).unwrap();
        assert_eq!(b, BalanceSnapshot { amount: 1000, held: 300 });
    }

    #[test]
    fn test_apply_delta_release_hold() {
        let b = BalanceSnapshot::new(1000, 300).unwrap();
        let b = b.apply_delta(0, -300).unwrap();
        assert_eq!(b, BalanceSnapshot { amount: 1000, held: 0 });
    }

    #[test]
    fn test_apply_delta_capture_debits_both() {
        let b = BalanceSnapshot::new(1000, 300).unwrap();
        let b = b.apply_delta(-300, -300).unwrap();
        assert_eq!(b, BalanceSnapshot { amount: 700, held: 0 });
    }

    #[test]
    fn test_apply_delta_rejects_overdraw() {
        let b = BalanceSnapshot::new(400, 0).unwrap();
        assert!(matches!(
            b.apply_delta(-500, 0),
            Err(WalletError::InsufficientBalance)
        ));
    }

    #[test]
    fn test_apply_delta_rejects_over_hold() {
        let b = BalanceSnapshot::new(1000, 600).unwrap();
        // A second 600 hold would push held past amount.
        assert!(matches!(
            b.apply_delta(0, 600),
            Err(WalletError::InsufficientBalance)
        ));
    }

    #[test]
    fn test_apply_delta_overflow() {
        let b = BalanceSnapshot::new(i64::MAX, 0).unwrap();
        assert!(matches!(
            b.apply_delta(1, 0),
            Err(WalletError::AmountOverflow)
        ));
        let b = BalanceSnapshot::new(1000, 0).unwrap();
        assert!(matches!(
            b.apply_delta(0, i64::MIN),
            Err(WalletError::AmountOverflow)
        ));
    }

    // Strategy for valid snapshots: 0 <= held <= amount.
    fn snapshot_strategy() -> impl Strategy<Value = BalanceSnapshot> {
        (0i64..1_000_000_000).prop_flat_map(|amount| {
            (Just(amount), 0i64..=amount)
                .prop_map(|(amount, held)| BalanceSnapshot { amount, held })
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        /// apply_delta either fails or yields a snapshot that still satisfies
        /// the invariant; it never produces an invalid state.
        #[test]
        fn prop_apply_delta_preserves_invariant(
            snapshot in snapshot_strategy(),
            amount_delta in -2_000_000_000i64..2_000_000_000,
            held_delta in -2_000_000_000i64..2_000_000_000,
        ) {
            if let Ok(next) = snapshot.apply_delta(amount_delta, held_delta) {
                prop_assert!(next.is_valid());
                prop_assert!(next.available() >= 0);
            }
        }

        /// A successful delta is exactly reversible.
        #[test]
        fn prop_apply_delta_reversible(
            snapshot in snapshot_strategy(),
            amount_delta in -1_000_000i64..1_000_000,
            held_delta in -1_000_000i64..1_000_000,
        ) {
            if let Ok(next) = snapshot.apply_delta(amount_delta, held_delta) {
                let back = next.apply_delta(-amount_delta, -held_delta);
                prop_assert_eq!(back.unwrap(), snapshot);
            }
        }

        /// available() is never negative for a valid snapshot.
        #[test]
        fn prop_available_non_negative(snapshot in snapshot_strategy()) {
            prop_assert!(snapshot.available() >= 0);
        }
    }
}
