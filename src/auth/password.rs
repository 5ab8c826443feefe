//! Password hashing and verification using Argon2id

use crate::{config::SecurityConfig, error::AppError};
use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

/// Argon2 time cost used when the configured one is too low.
pub const DEFAULT_COST: u32 = 3;
/// Lowest time cost accepted as configured.
pub const MIN_COST: u32 = 2;
/// Highest time cost accepted as configured.
pub const MAX_COST: u32 = 10;
/// OWASP baseline memory cost (19 MiB).
pub const DEFAULT_MEMORY_KIB: u32 = 19 * 1024;
/// Upper bound on configured memory cost (1 GiB).
pub const MAX_MEMORY_KIB: u32 = 1024 * 1024;

const LANES: u32 = 1;

/// Password hasher with configurable work factor.
///
/// Output is a PHC string (`$argon2id$v=19$m=..,t=..,p=..$salt$hash`), so
/// verification needs nothing besides the stored value.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Create a hasher. `cost` below [`MIN_COST`] (including 0) falls back
    /// to [`DEFAULT_COST`]; memory below Argon2's floor is raised to it.
    pub fn new(cost: u32, memory_kib: u32) -> Self {
        let t_cost = normalize_cost(cost);
        let m_cost = memory_kib.max(Params::MIN_M_COST.max(8 * LANES));

        let params = match Params::new(m_cost, t_cost, LANES, None) {
            Ok(params) => params,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid Argon2 params, using defaults");
                Params::default()
            }
        };

        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::new(config.password_hash_cost, config.password_hash_memory_kib)
    }

    /// Hash a password
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                AppError::Internal(format!("Failed to hash password: {}", e))
            })?
            .to_string();

        Ok(password_hash)
    }

    /// Check a password against a stored hash. A hash that does not parse
    /// simply fails verification.
    pub fn verify(&self, hash: &str, password: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!("Failed to parse password hash: {:?}", e);
                return false;
            }
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

impl PasswordHasher {
    /// [`hash`](Self::hash) on the blocking pool, keeping Argon2 off the
    /// async workers.
    pub async fn spawn_hash(&self, password: &str) -> Result<String, AppError> {
        let hasher = self.clone();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Password hashing task failed");
                AppError::Internal(format!("password hashing task failed: {}", e))
            })?
    }

    /// [`verify`](Self::verify) on the blocking pool. A failed task counts
    /// as a failed verification.
    pub async fn spawn_verify(&self, hash: &str, password: &str) -> bool {
        let hasher = self.clone();
        let hash = hash.to_owned();
        let password = password.to_owned();

        match tokio::task::spawn_blocking(move || hasher.verify(&hash, &password)).await {
            Ok(verified) => verified,
            Err(e) => {
                tracing::error!(error = %e, "Password verification task failed");
                false
            }
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST, DEFAULT_MEMORY_KIB)
    }
}

fn normalize_cost(cost: u32) -> u32 {
    if cost < MIN_COST {
        DEFAULT_COST
    } else {
        cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> PasswordHasher {
        PasswordHasher::new(MIN_COST, 64)
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = cheap();
        let hash = hasher.hash("pw1").unwrap();
        assert!(hasher.verify(&hash, "pw1"));
        assert!(!hasher.verify(&hash, "pw2"));
    }

    #[test]
    fn test_hash_is_different_each_time() {
        let hasher = cheap();
        let hash1 = hasher.hash("pw1").unwrap();
        let hash2 = hasher.hash("pw1").unwrap();

        // Hashes should be different due to salt
        assert_ne!(hash1, hash2);
        assert!(hasher.verify(&hash1, "pw1"));
        assert!(hasher.verify(&hash2, "pw1"));
    }

    #[test]
    fn test_malformed_hash_is_rejected() {
        let hasher = cheap();
        assert!(!hasher.verify("", "pw1"));
        assert!(!hasher.verify("not-a-phc-string", "pw1"));
        assert!(!hasher.verify("$argon2id$v=19$garbage", "pw1"));
    }

    #[test]
    fn test_low_cost_is_normalized() {
        assert_eq!(normalize_cost(0), DEFAULT_COST);
        assert_eq!(normalize_cost(1), DEFAULT_COST);
        assert_eq!(normalize_cost(MIN_COST), MIN_COST);
        assert_eq!(normalize_cost(10), 10);

        let hash = PasswordHasher::new(0, 64).hash("pw1").unwrap();
        assert!(hash.contains(&format!("t={}", DEFAULT_COST)));
    }

    #[tokio::test]
    async fn test_spawned_hash_and_verify() {
        let hasher = cheap();
        let hash = hasher.spawn_hash("pw1").await.unwrap();

        assert!(hasher.spawn_verify(&hash, "pw1").await);
        assert!(!hasher.spawn_verify(&hash, "pw2").await);
        assert!(!hasher.spawn_verify("garbage", "pw1").await);
    }

    #[test]
    fn test_hash_is_self_describing() {
        let hasher = PasswordHasher::new(4, 64);
        let hash = hasher.hash("pw1").unwrap();
        assert!(hash.starts_with("$argon2id$"));

        // A hasher with different params still verifies it
        assert!(cheap().verify(&hash, "pw1"));
    }
}
