//! Password hashing and the plaintext migration policy
//!
//! Stored credentials are bcrypt hashes (`$2` family), except for legacy rows
//! that still hold plaintext. Those are detected by shape, not a schema
//! flag, and upgraded in place on the first successful login.

/// Prefix shared by every bcrypt hash variant (`$2a$`, `$2b$`, `$2y$`)
const HASH_PREFIX: &str = "$2";

/// Hash a plaintext password with the given work factor
pub fn hash(plain: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(plain, cost)
}

/// True iff the stored value is hash-shaped (already migrated)
pub fn is_hashed(value: &str) -> bool {
    value.starts_with(HASH_PREFIX)
}

/// Constant-time verification of a plaintext password against a stored hash.
/// A malformed stored hash verifies as false, never as an error.
pub fn verify(plain: &str, hashed: &str) -> bool {
    bcrypt::verify(plain, hashed).unwrap_or(false)
}

/// Outcome of checking a supplied password against the stored credential
#[derive(Debug)]
pub enum PasswordCheck {
    /// Accepted. `rehash` holds the replacement hash when the stored value
    /// was legacy plaintext; the caller persists it and proceeds.
    Valid { rehash: Option<String> },
    Invalid,
}

/// Check a supplied password against the stored value, deciding the
/// migration-on-login upgrade.
///
/// Hash-shaped stored values go through bcrypt verification. Plaintext
/// stored values are compared by direct equality; on a match the replacement
/// hash is computed immediately. The upgrade must never fail or delay the
/// login itself, so a hash error on that path still yields `Valid`.
pub fn check(stored: &str, supplied: &str, cost: u32) -> PasswordCheck {
    if is_hashed(stored) {
        if verify(supplied, stored) {
            PasswordCheck::Valid { rehash: None }
        } else {
            PasswordCheck::Invalid
        }
    } else if stored == supplied {
        match hash(supplied, cost) {
            Ok(rehash) => PasswordCheck::Valid {
                rehash: Some(rehash),
            },
            Err(e) => {
                tracing::error!(error = %e, "rehash of legacy plaintext credential failed");
                PasswordCheck::Valid { rehash: None }
            }
        }
    } else {
        PasswordCheck::Invalid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // bcrypt's minimum work factor, to keep tests fast
    const TEST_COST: u32 = 4;

    #[test]
    fn test_hash_is_self_describing() {
        let hashed = hash("abc123", TEST_COST).unwrap();
        assert!(is_hashed(&hashed));
        assert!(hashed.starts_with("$2"));
        assert!(!is_hashed("abc123"));
    }

    #[test]
    fn test_verify() {
        let hashed = hash("abc123", TEST_COST).unwrap();
        assert!(verify("abc123", &hashed));
        assert!(!verify("abc124", &hashed));
        // malformed stored hash is a mismatch, not an error
        assert!(!verify("abc123", "not-a-hash"));
    }

    #[test]
    fn test_check_hashed_credential() {
        let stored = hash("abc123", TEST_COST).unwrap();
        match check(&stored, "abc123", TEST_COST) {
            PasswordCheck::Valid { rehash } => assert!(rehash.is_none()),
            PasswordCheck::Invalid => panic!("correct password rejected"),
        }
        assert!(matches!(
            check(&stored, "wrong", TEST_COST),
            PasswordCheck::Invalid
        ));
    }

    #[test]
    fn test_check_migrates_legacy_plaintext() {
        match check("abc123", "abc123", TEST_COST) {
            PasswordCheck::Valid { rehash } => {
                let rehash = rehash.expect("plaintext match must produce a rehash");
                assert!(is_hashed(&rehash));
                assert!(verify("abc123", &rehash));
            }
            PasswordCheck::Invalid => panic!("matching plaintext rejected"),
        }
    }

    #[test]
    fn test_check_rejects_wrong_plaintext() {
        assert!(matches!(
            check("abc123", "abc124", TEST_COST),
            PasswordCheck::Invalid
        ));
    }
}
