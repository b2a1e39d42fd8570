use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hash(String),
}

// Burned whenever no account matched, so a login against an unknown
// identifier costs the same as one against a real account.
const DUMMY_HASH: &str = "$2b$12$C6UzMDM.H6dfI/f/IKcEeO5ch1Mq7T9xrJ0YIaM9gjuJGyGT1Qa7u";

/// Hash a plaintext exactly once, at write time. Stored rows only ever see
/// the output of this function.
pub fn hash(plaintext: &str, cost: u32) -> Result<String, PasswordError> {
    bcrypt::hash(plaintext, cost).map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Compare a plaintext against a stored hash. Never a string comparison;
/// a hash that fails to parse counts as a mismatch.
pub fn verify(plaintext: &str, hashed: &str) -> bool {
    bcrypt::verify(plaintext, hashed).unwrap_or(false)
}

/// Equalize response timing when the account lookup came up empty.
pub fn verify_dummy(plaintext: &str) {
    let _ = bcrypt::verify(plaintext, DUMMY_HASH);
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum cost keeps the test suite fast; production uses DEFAULT_COST.
    const TEST_COST: u32 = 4;

    #[test]
    fn hash_then_verify() {
        let hashed = hash("hunter2hunter2", TEST_COST).unwrap();
        assert_ne!(hashed, "hunter2hunter2");
        assert!(verify("hunter2hunter2", &hashed));
        assert!(!verify("wrong-password", &hashed));
    }

    #[test]
    fn hashing_twice_differs_but_both_verify() {
        let a = hash("same-password", TEST_COST).unwrap();
        let b = hash("same-password", TEST_COST).unwrap();
        assert_ne!(a, b); // salted
        assert!(verify("same-password", &a));
        assert!(verify("same-password", &b));
    }

    #[test]
    fn unparseable_hash_is_a_mismatch() {
        assert!(!verify("anything", "not-a-bcrypt-hash"));
    }

    #[test]
    fn dummy_verification_does_not_panic() {
        verify_dummy("anything");
    }
}
