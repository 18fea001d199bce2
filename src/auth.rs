//! Credential hashing for admin and faculty accounts.
//!
//! Passwords are stored as bcrypt hashes. Verification failures and malformed
//! stored hashes both read as "invalid credentials" to the caller.

use tracing::warn;

/// Hash a plaintext password for storage.
pub fn hash_password(plain: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(plain, bcrypt::DEFAULT_COST)
}

/// Check a plaintext password against a stored hash.
///
/// A stored hash that bcrypt cannot parse is treated as a mismatch rather
/// than an error, so a corrupted row cannot be used to log in.
pub fn verify_password(plain: &str, stored_hash: &str) -> bool {
    match bcrypt::verify(plain, stored_hash) {
        Ok(valid) => valid,
        Err(err) => {
            warn!("stored password hash failed verification: {err}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_roundtrip() {
        let hash = hash_password("faculty123").expect("hash");
        assert!(verify_password("faculty123", &hash));
        assert!(!verify_password("faculty124", &hash));
    }

    #[test]
    fn malformed_hash_is_a_mismatch() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }
}
