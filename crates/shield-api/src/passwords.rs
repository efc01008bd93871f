// crates/shield-api/src/passwords.rs
// ============================================================================
// Module: Internal User Passwords
// Description: Argon2 hashing for internal user credentials.
// Purpose: Ensure plaintext passwords are never persisted.
// Dependencies: argon2, password-hash, getrandom
// ============================================================================

//! ## Overview
//! Internal user entries submitted with a `password` are stored with an
//! Argon2id PHC string under `hash` instead. Salts are drawn from the OS
//! random source.

use argon2::Argon2;
use argon2::PasswordHasher;
use argon2::PasswordVerifier;
use password_hash::PasswordHash;
use password_hash::SaltString;
use thiserror::Error;

/// Salt length in bytes.
const SALT_BYTES: usize = 16;

/// Password hashing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordError {
    /// The OS random source failed.
    #[error("password salt generation failed: {0}")]
    Random(String),
    /// Argon2 hashing failed.
    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Hashes `password` into an Argon2 PHC string.
///
/// # Errors
///
/// Returns [`PasswordError`] when salt generation or hashing fails.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let mut salt_bytes = [0u8; SALT_BYTES];
    getrandom::getrandom(&mut salt_bytes).map_err(|err| PasswordError::Random(err.to_string()))?;
    let salt =
        SaltString::encode_b64(&salt_bytes).map_err(|err| PasswordError::Hash(err.to_string()))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| PasswordError::Hash(err.to_string()))
}

/// Returns true when `password` matches the PHC string `hash`.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .is_ok_and(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}
