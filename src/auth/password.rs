use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// Hash or verification failures that are *not* an ordinary mismatch.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// The stored hash does not parse as a PHC-format salted hash. The
    /// account record is corrupted and cannot be authenticated against;
    /// never to be reported as "wrong password".
    #[error("malformed stored password hash: {0}")]
    MalformedHash(password_hash::Error),
    #[error("password hashing failed: {0}")]
    Hash(password_hash::Error),
}

/// Argon2id with a per-record random salt and default cost.
pub fn hash_password(plain: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            PasswordError::Hash(e)
        })?
        .to_string();
    Ok(hash)
}

/// Compare a plaintext candidate against a stored salted hash.
///
/// A mismatch is an ordinary `Ok(false)`, not an error. The comparison is
/// the argon2 library's constant-time verify, so timing does not reveal
/// which branch was taken.
pub fn verify_password(plain: &str, stored: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored).map_err(|e| {
        error!(error = %e, "stored password hash failed to parse");
        PasswordError::MalformedHash(e)
    })?;
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::MalformedHash(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn wrong_password_is_false_not_an_error() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn malformed_stored_hash_is_a_distinct_error() {
        let err = verify_password("anything", "not-a-valid-hash-format").unwrap_err();
        assert!(matches!(err, PasswordError::MalformedHash(_)));
    }

    #[test]
    fn empty_stored_hash_is_malformed() {
        let err = verify_password("anything", "").unwrap_err();
        assert!(matches!(err, PasswordError::MalformedHash(_)));
    }

    #[test]
    fn hashes_are_salted_per_call() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }
}
