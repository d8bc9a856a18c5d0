//! One-way password hashing with Argon2id.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordVerifier, Version};

use crate::error::AuthError;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory in KiB.
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashCost {
    /// OWASP baseline: 19 MiB, 2 iterations, 1 lane.
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// Salted, cost-tunable password hashing.
///
/// Pure: no IO, no shared state. Hashing is deliberately slow, so async
/// callers should run it on a blocking thread.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: HashCost,
}

impl PasswordHasher {
    pub fn new(cost: HashCost) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> HashCost {
        self.cost
    }

    fn argon2(&self) -> Result<Argon2<'static>, AuthError> {
        let params = Params::new(
            self.cost.memory_kib,
            self.cost.iterations,
            self.cost.parallelism,
            None,
        )
        .map_err(|e| AuthError::PasswordHash(format!("invalid cost parameters: {e}")))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hash `plaintext` with a fresh random salt into a PHC string.
    pub fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        use argon2::PasswordHasher as _;

        let salt = SaltString::generate(&mut OsRng);
        self.argon2()?
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::PasswordHash(e.to_string()))
    }

    /// Check `plaintext` against a stored PHC string.
    ///
    /// Returns `false` for a mismatch and for any malformed hash. The cost
    /// parameters embedded in the hash are used, so hashes made under an
    /// older cost keep verifying. The final digest comparison is constant
    /// time.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(HashCost::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cheap() -> PasswordHasher {
        PasswordHasher::new(HashCost {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        })
    }

    #[test]
    fn correct_password_matches() {
        let hasher = cheap();
        let hash = hasher.hash("hunter2").unwrap();
        assert!(hasher.verify("hunter2", &hash));
    }

    #[test]
    fn wrong_password_does_not_match() {
        let hasher = cheap();
        let hash = hasher.hash("hunter2").unwrap();
        assert!(!hasher.verify("hunter3", &hash));
        assert!(!hasher.verify("", &hash));
    }

    #[test]
    fn same_input_hashes_differently() {
        let hasher = cheap();
        let a = hasher.hash("p").unwrap();
        let b = hasher.hash("p").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2id$"));
    }

    #[test]
    fn malformed_hash_is_a_mismatch_not_an_error() {
        let hasher = cheap();
        assert!(!hasher.verify("pw", "not-a-hash"));
        assert!(!hasher.verify("pw", ""));
        assert!(!hasher.verify("pw", "$argon2id$v=19$m=64,t=1,p=1$broken"));
    }

    #[test]
    fn verifies_hashes_made_with_other_costs() {
        let hash = cheap().hash("pw").unwrap();
        assert!(PasswordHasher::default().verify("pw", &hash));
    }

    #[test]
    fn invalid_cost_is_reported() {
        let hasher = PasswordHasher::new(HashCost {
            memory_kib: 0,
            iterations: 0,
            parallelism: 0,
        });
        assert!(matches!(hasher.hash("pw"), Err(AuthError::PasswordHash(_))));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 16,
            ..ProptestConfig::default()
        })]

        #[test]
        fn only_the_hashed_password_verifies(
            password in "[ -~]{0,24}",
            other in "[ -~]{0,24}",
        ) {
            let hasher = cheap();
            let hash = hasher.hash(&password).unwrap();
            prop_assert!(hasher.verify(&password, &hash));
            if other != password {
                prop_assert!(!hasher.verify(&other, &hash));
            }
        }
    }
}
