//! Hold lifecycle rules.
//!
//! A hold reserves part of a balance without debiting it. The state machine
//! is `Active -> {Released, Captured}`; both ends are terminal and a hold
//! transitions at most once. Acting on a terminal hold is rejected, never
//! silently ignored.

use chrono::Duration;
use tally_shared::types::{HoldId, UserId};

use super::error::WalletError;
use super::transfer::{LedgerPair, PlannedEntry};
use super::types::{HoldState, LedgerEntryKind};

/// Validates the amount of a new hold.
///
/// # Errors
///
/// Returns `InvalidAmount` unless `amount > 0`.
pub const fn validate_hold_amount(amount: i64) -> Result<(), WalletError> {
    if amount > 0 {
        Ok(())
    } else {
        Err(WalletError::InvalidAmount)
    }
}

/// Normalizes a requested hold TTL.
///
/// A missing or non-positive TTL falls back to the configured default.
#[must_use]
pub fn normalize_ttl(requested_secs: Option<i64>, default_secs: u64) -> Duration {
    let secs = match requested_secs {
        Some(s) if s > 0 => s,
        _ => i64::try_from(default_secs).unwrap_or(604_800),
    };
    Duration::seconds(secs)
}

/// Checks that `caller` owns the hold.
///
/// # Errors
///
/// Returns `Forbidden` if the caller is not the holder.
pub fn ensure_owner(holder: UserId, caller: UserId) -> Result<(), WalletError> {
    if holder == caller {
        Ok(())
    } else {
        Err(WalletError::Forbidden)
    }
}

/// Checks that the hold can still transition.
///
/// # Errors
///
/// Returns `AlreadyFinal` if the hold is released or captured.
pub const fn ensure_active(state: HoldState) -> Result<(), WalletError> {
    if state.is_active() {
        Ok(())
    } else {
        Err(WalletError::AlreadyFinal)
    }
}

/// Plans the paired `payment` ledger rows of a capture.
///
/// The holder is debited, the counterparty credited; both rows share
/// `reference_id = "hold:<hold_id>"` and their signed amounts sum to zero.
///
/// # Errors
///
/// Returns `InvalidRecipient` if the counterparty is the holder (capturing
/// to self would double-book one balance row).
pub fn plan_capture(
    hold_id: HoldId,
    holder: UserId,
    counterparty: UserId,
    amount: i64,
) -> Result<LedgerPair, WalletError> {
    if counterparty == holder {
        return Err(WalletError::InvalidRecipient);
    }
    validate_hold_amount(amount)?;

    Ok(LedgerPair {
        reference_id: format!("hold:{hold_id}"),
        debit: PlannedEntry {
            user_id: holder,
            kind: LedgerEntryKind::Payment,
            amount: -amount,
            fee: 0,
        },
        credit: PlannedEntry {
            user_id: counterparty,
            kind: LedgerEntryKind::Payment,
            amount,
            fee: 0,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_hold_amount() {
        assert!(validate_hold_amount(1).is_ok());
        assert!(matches!(
            validate_hold_amount(0),
            Err(WalletError::InvalidAmount)
        ));
        assert!(matches!(
            validate_hold_amount(-5),
            Err(WalletError::InvalidAmount)
        ));
    }

    #[test]
    fn test_ttl_defaults_to_seven_days() {
        let default = 604_800;
        assert_eq!(normalize_ttl(None, default), Duration::days(7));
        assert_eq!(normalize_ttl(Some(0), default), Duration::days(7));
        assert_eq!(normalize_ttl(Some(-10), default), Duration::days(7));
        assert_eq!(normalize_ttl(Some(3600), default), Duration::hours(1));
    }

    #[test]
    fn test_ensure_owner() {
        let holder = UserId::new();
        assert!(ensure_owner(holder, holder).is_ok());
        assert!(matches!(
            ensure_owner(holder, UserId::new()),
            Err(WalletError::Forbidden)
        ));
    }

    #[test]
    fn test_ensure_active_rejects_terminal_states() {
        assert!(ensure_active(HoldState::Active).is_ok());
        assert!(matches!(
            ensure_active(HoldState::Released),
            Err(WalletError::AlreadyFinal)
        ));
        assert!(matches!(
            ensure_active(HoldState::Captured),
            Err(WalletError::AlreadyFinal)
        ));
    }

    #[test]
    fn test_plan_capture_pair_balances() {
        let hold_id = HoldId::new();
        let holder = UserId::new();
        let counterparty = UserId::new();

        let pair = plan_capture(hold_id, holder, counterparty, 300).unwrap();
        assert_eq!(pair.reference_id, format!("hold:{hold_id}"));
        assert_eq!(pair.debit.amount, -300);
        assert_eq!(pair.credit.amount, 300);
        assert_eq!(pair.debit.amount + pair.credit.amount, 0);
        assert_eq!(pair.debit.kind, LedgerEntryKind::Payment);
        assert_eq!(pair.credit.kind, LedgerEntryKind::Payment);
        assert_eq!(pair.debit.user_id, holder);
        assert_eq!(pair.credit.user_id, counterparty);
    }

    #[test]
    fn test_plan_capture_rejects_self_capture() {
        let holder = UserId::new();
        assert!(matches!(
            plan_capture(HoldId::new(), holder, holder, 300),
            Err(WalletError::InvalidRecipient)
        ));
    }
}
