//! Wallet error types for validation and state errors.
//!
//! This module defines all errors that can occur during wallet operations:
//! input validation, balance checks, hold state transitions, backup
//! decryption, and storage failures.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during wallet ledger operations.
#[derive(Debug, Error)]
pub enum WalletError {
    // ========== Validation Errors ==========
    /// Amount must be positive.
    #[error("Amount must be positive")]
    InvalidAmount,

    /// Amount arithmetic overflowed the minor-unit range.
    #[error("Amount arithmetic overflowed the minor-unit range")]
    AmountOverflow,

    /// Recipient is missing or the same as the sender.
    #[error("Invalid recipient")]
    InvalidRecipient,

    /// Currency code is missing or malformed.
    #[error("Invalid currency code")]
    InvalidCurrency,

    // ========== Balance Errors ==========
    /// Available balance is less than the requested amount.
    #[error("Insufficient balance")]
    InsufficientBalance,

    // ========== Hold Errors ==========
    /// Hold not found.
    #[error("Hold not found: {0}")]
    HoldNotFound(Uuid),

    /// Caller is not the owner of the hold.
    #[error("Caller is not the owner of the hold")]
    Forbidden,

    /// The target is already in a terminal state (a released or captured
    /// hold, or a settled ledger entry).
    #[error("Already in a terminal state")]
    AlreadyFinal,

    // ========== Ledger Errors ==========
    /// Ledger entry not found (or not visible to the caller).
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),

    // ========== Backup Errors ==========
    /// Backup decryption failed: wrong password or corrupted data.
    #[error("Wrong password or corrupted backup")]
    WrongPasswordOrCorrupted,

    // ========== Storage Errors ==========
    /// The atomic unit of work could not commit.
    #[error("Storage failure: {0}")]
    Storage(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WalletError {
    /// Wraps a storage-layer failure.
    ///
    /// The database layer maps its driver errors through this constructor.
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::AmountOverflow => "AMOUNT_OVERFLOW",
            Self::InvalidRecipient => "INVALID_RECIPIENT",
            Self::InvalidCurrency => "INVALID_CURRENCY",
            Self::InsufficientBalance => "INSUFFICIENT_BALANCE",
            Self::HoldNotFound(_) => "HOLD_NOT_FOUND",
            Self::Forbidden => "FORBIDDEN",
            Self::AlreadyFinal => "ALREADY_FINAL",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::WrongPasswordOrCorrupted => "WRONG_PASSWORD_OR_CORRUPTED",
            Self::Storage(_) => "STORAGE_FAILURE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    ///
    /// The ledger knows nothing about HTTP beyond this mapping; the owning
    /// HTTP layer picks the response shape.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation and balance errors
            Self::InvalidAmount
            | Self::AmountOverflow
            | Self::InvalidRecipient
            | Self::InvalidCurrency
            | Self::InsufficientBalance
            | Self::WrongPasswordOrCorrupted => 400,

            // 403 Forbidden - ownership errors
            Self::Forbidden => 403,

            // 404 Not Found
            Self::HoldNotFound(_) | Self::TransactionNotFound(_) => 404,

            // 409 Conflict - terminal-state errors
            Self::AlreadyFinal => 409,

            // 500 Internal Server Error
            Self::Storage(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns true if this error is transient and the caller may retry.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(WalletError::InvalidAmount.error_code(), "INVALID_AMOUNT");
        assert_eq!(WalletError::AmountOverflow.error_code(), "AMOUNT_OVERFLOW");
        assert_eq!(
            WalletError::InsufficientBalance.error_code(),
            "INSUFFICIENT_BALANCE"
        );
        assert_eq!(
            WalletError::HoldNotFound(Uuid::nil()).error_code(),
            "HOLD_NOT_FOUND"
        );
        assert_eq!(WalletError::AlreadyFinal.error_code(), "ALREADY_FINAL");
        assert_eq!(
            WalletError::WrongPasswordOrCorrupted.error_code(),
            "WRONG_PASSWORD_OR_CORRUPTED"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(WalletError::InvalidAmount.http_status_code(), 400);
        assert_eq!(WalletError::InsufficientBalance.http_status_code(), 400);
        assert_eq!(WalletError::Forbidden.http_status_code(), 403);
        assert_eq!(WalletError::HoldNotFound(Uuid::nil()).http_status_code(), 404);
        assert_eq!(WalletError::AlreadyFinal.http_status_code(), 409);
        assert_eq!(
            WalletError::Storage("boom".to_string()).http_status_code(),
            500
        );
    }

    #[test]
    fn test_retryable_errors() {
        assert!(WalletError::Storage(String::new()).is_retryable());
        assert!(!WalletError::InsufficientBalance.is_retryable());
        assert!(!WalletError::AlreadyFinal.is_retryable());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            WalletError::InsufficientBalance.to_string(),
            "Insufficient balance"
        );
        let id = Uuid::nil();
        assert_eq!(
            WalletError::HoldNotFound(id).to_string(),
            format!("Hold not found: {id}")
        );
    }
}
