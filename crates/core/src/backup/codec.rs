//! The backup codec: Argon2id key derivation + AES-256-GCM sealing.
//!
//! Wire format is `nonce || ciphertext` — the 12-byte nonce is carried as a
//! prefix so a backup is self-contained next to its salt. Decryption
//! failures collapse into a single error kind: the difference between a
//! wrong password and a corrupted blob is not observable.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use tally_shared::types::UserId;

use super::types::{ImportSummary, WalletBackup, WalletSnapshot, EXPORT_VERSION};
use crate::wallet::WalletError;

/// Derived key length (AES-256).
const KEY_LEN: usize = 32;
/// Random salt length for new exports.
const SALT_LEN: usize = 16;
/// Minimum salt length accepted on import.
const MIN_SALT_LEN: usize = 8;
/// AES-GCM nonce length.
const NONCE_LEN: usize = 12;
/// AES-GCM authentication tag length.
const TAG_LEN: usize = 16;

/// Argon2id memory cost in KiB (64 MiB).
const ARGON2_M_COST: u32 = 64 * 1024;
/// Argon2id iteration count.
const ARGON2_T_COST: u32 = 1;
/// Argon2id lane count.
const ARGON2_P_COST: u32 = 4;

/// Derives the symmetric key from a password and salt.
fn derive_key(password: &str, salt: &[u8]) -> Result<[u8; KEY_LEN], WalletError> {
    let params = Params::new(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST, Some(KEY_LEN))
        .map_err(|e| WalletError::Internal(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = [0u8; KEY_LEN];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut key)
        .map_err(|e| WalletError::Internal(e.to_string()))?;
    Ok(key)
}

/// Seals a wallet snapshot under a password.
///
/// A fresh 16-byte salt and 96-bit nonce are drawn from the OS RNG for
/// every export; the nonce is prepended to the ciphertext.
///
/// # Errors
///
/// Returns `Internal` if key derivation, serialization, or encryption fails.
pub fn export(snapshot: &WalletSnapshot, password: &str) -> Result<WalletBackup, WalletError> {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);

    let key = derive_key(password, &salt)?;
    let plaintext =
        serde_json::to_vec(snapshot).map_err(|e| WalletError::Internal(e.to_string()))?;

    let cipher = Aes256Gcm::new_from_slice(&key)
        .map_err(|e| WalletError::Internal(e.to_string()))?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::rngs::OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let sealed = cipher
        .encrypt(nonce, plaintext.as_slice())
        .map_err(|_| WalletError::Internal("encryption failed".to_string()))?;

    let mut ciphertext = Vec::with_capacity(NONCE_LEN + sealed.len());
    ciphertext.extend_from_slice(&nonce_bytes);
    ciphertext.extend_from_slice(&sealed);

    Ok(WalletBackup {
        version: EXPORT_VERSION,
        ciphertext,
        salt: salt.to_vec(),
    })
}

/// Verifies a sealed backup and reports its contents.
///
/// Verification only: the snapshot is decrypted, checked against the
/// caller, and summarized — live balances are never written.
///
/// # Errors
///
/// - `WrongPasswordOrCorrupted` for any authentication or decode failure
///   (deliberately one kind, no oracle).
/// - `Forbidden` if the embedded owner is not the caller.
pub fn import(
    caller: UserId,
    ciphertext: &[u8],
    salt: &[u8],
    password: &str,
) -> Result<ImportSummary, WalletError> {
    if salt.len() < MIN_SALT_LEN || ciphertext.len() < NONCE_LEN + TAG_LEN {
        return Err(WalletError::WrongPasswordOrCorrupted);
    }

    let key = derive_key(password, salt)?;
    let cipher = Aes256Gcm::new_from_slice(&key)
        .map_err(|e| WalletError::Internal(e.to_string()))?;

    let (nonce_bytes, sealed) = ciphertext.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let plaintext = cipher
        .decrypt(nonce, sealed)
        .map_err(|_| WalletError::WrongPasswordOrCorrupted)?;

    let snapshot: WalletSnapshot =
        serde_json::from_slice(&plaintext).map_err(|_| WalletError::WrongPasswordOrCorrupted)?;

    if snapshot.user_id != caller {
        return Err(WalletError::Forbidden);
    }

    Ok(ImportSummary {
        version: snapshot.version,
        exported_at: snapshot.exported_at,
        balance_count: snapshot.balances.len(),
        address_count: snapshot.addresses.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::super::types::{AddressRecord, BalanceRecord};
    use super::*;

    fn sample_snapshot(user_id: UserId) -> WalletSnapshot {
        WalletSnapshot::new(
            user_id,
            vec![
                BalanceRecord {
                    currency: "USD".to_string(),
                    amount: 1000,
                    held: 300,
                    updated_at: None,
                },
                BalanceRecord {
                    currency: "EUR".to_string(),
                    amount: 50,
                    held: 0,
                    updated_at: None,
                },
            ],
            vec![AddressRecord {
                currency: "USD".to_string(),
                address: "0xdeadbeef".to_string(),
                network: "mainnet".to_string(),
            }],
        )
    }

    #[test]
    fn test_export_import_round_trip() {
        let user = UserId::new();
        let snapshot = sample_snapshot(user);

        let backup = export(&snapshot, "correct horse battery staple").unwrap();
        let summary = import(
            user,
            &backup.ciphertext,
            &backup.salt,
            "correct horse battery staple",
        )
        .unwrap();

        assert_eq!(summary.version, EXPORT_VERSION);
        assert_eq!(summary.balance_count, 2);
        assert_eq!(summary.address_count, 1);
        assert_eq!(summary.exported_at, snapshot.exported_at);
    }

    #[test]
    fn test_wrong_password_is_one_error_kind() {
        let user = UserId::new();
        let backup = export(&sample_snapshot(user), "right").unwrap();

        let err = import(user, &backup.ciphertext, &backup.salt, "wrong").unwrap_err();
        assert!(matches!(err, WalletError::WrongPasswordOrCorrupted));
    }

    #[test]
    fn test_tampered_ciphertext_rejected() {
        let user = UserId::new();
        let mut backup = export(&sample_snapshot(user), "pw").unwrap();
        // Flip a byte past the nonce prefix.
        backup.ciphertext[NONCE_LEN] ^= 0xFF;

        let err = import(user, &backup.ciphertext, &backup.salt, "pw").unwrap_err();
        assert!(matches!(err, WalletError::WrongPasswordOrCorrupted));
    }

    #[test]
    fn test_foreign_backup_rejected() {
        let owner = UserId::new();
        let backup = export(&sample_snapshot(owner), "pw").unwrap();

        let err = import(UserId::new(), &backup.ciphertext, &backup.salt, "pw").unwrap_err();
        assert!(matches!(err, WalletError::Forbidden));
    }

    #[test]
    fn test_truncated_input_rejected() {
        let user = UserId::new();
        let err = import(user, &[0u8; 8], &[0u8; 16], "pw").unwrap_err();
        assert!(matches!(err, WalletError::WrongPasswordOrCorrupted));

        let err = import(user, &[0u8; 64], &[0u8; 4], "pw").unwrap_err();
        assert!(matches!(err, WalletError::WrongPasswordOrCorrupted));
    }

    #[test]
    fn test_salts_and_nonces_are_fresh_per_export() {
        let user = UserId::new();
        let snapshot = sample_snapshot(user);
        let a = export(&snapshot, "pw").unwrap();
        let b = export(&snapshot, "pw").unwrap();

        assert_ne!(a.salt, b.salt);
        assert_ne!(&a.ciphertext[..NONCE_LEN], &b.ciphertext[..NONCE_LEN]);
    }
}
