//! Secret hashing using Argon2id.

use std::sync::OnceLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tenant_org::{StoreError, StoreResult};

/// Hash a secret with a fresh random salt, returning a PHC-format string.
pub fn hash_secret(secret: &str) -> StoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StoreError::Crypto(format!("failed to hash secret: {}", e)))
}

/// Verify a secret against a PHC-format hash.
///
/// A malformed hash counts as a mismatch.
pub fn verify_secret(secret: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(error = %e, "Stored secret hash is malformed");
            return false;
        }
    };

    Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok()
}

/// Burn the same work as a real verification, for unknown identities.
///
/// Keeps "no such email" and "wrong secret" indistinguishable by timing.
pub fn verify_against_dummy(secret: &str) -> bool {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

    let dummy = DUMMY_HASH.get_or_init(|| hash_secret("dummy-secret-for-unknown-identities").ok());
    if let Some(hash) = dummy {
        let _ = verify_secret(secret, hash);
    }
    false
}
