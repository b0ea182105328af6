//! Password hashing.
//!
//! Passwords are stored as PHC strings produced by PBKDF2-SHA256 with a
//! per-password random salt. Verification parses the stored string, so the
//! parameters can be tightened later without invalidating existing hashes.

use pbkdf2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use pbkdf2::Pbkdf2;

use crate::error::{PatientError, PatientResult};

/// Hashes `password` with a fresh random salt.
///
/// # Errors
///
/// Returns `PatientError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> PatientResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Pbkdf2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PatientError::PasswordHash(e.to_string()))
}

/// Checks `password` against a stored PHC hash string.
///
/// An unparseable stored hash counts as a mismatch.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| Pbkdf2.verify_password(password.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify_round_trip() {
        let hash = hash_password("correct horse").expect("hashing should succeed");
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same password").expect("hashing should succeed");
        let b = hash_password("same password").expect("hashing should succeed");
        assert_ne!(a, b, "two hashes of the same password should differ");
    }

    #[test]
    fn test_garbage_stored_hash_never_verifies() {
        assert!(!verify_password("anything", "not-a-phc-string"));
        assert!(!verify_password("anything", ""));
    }
}
