//! Pending Registration Store
//!
//! Sign-ups and password resets are two-step: the first step parks a
//! short-lived record in the expiring KV store, the second step consumes
//! it. Nothing touches the user table until the code or token checks out,
//! and unfinished attempts simply age out.

use crate::services::cache::CacheService;
use crate::utils::error::{AppError, AppResult};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Duration;

/// How long a registration may sit unverified
pub const REGISTRATION_TTL: Duration = Duration::from_secs(900);
/// How long a password reset link stays valid
pub const RESET_TOKEN_TTL: Duration = Duration::from_secs(1800);

/// A sign-up waiting for its emailed code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingRegistration {
    pub username: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub hash_pass: String,
    pub code: String,
}

/// A password reset waiting for its emailed link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingReset {
    pub user_id: String,
    pub email: String,
}

/// Expiring store for in-flight registrations and reset tokens
#[derive(Clone)]
pub struct PendingStore {
    cache: CacheService,
    rng: SystemRandom,
}

impl PendingStore {
    pub fn new(cache: CacheService) -> Self {
        Self {
            cache,
            rng: SystemRandom::new(),
        }
    }

    /// Random 6-digit verification code
    pub fn generate_code(&self) -> AppResult<String> {
        let mut bytes = [0u8; 4];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| AppError::internal("Failed to generate verification code"))?;
        let value = u32::from_be_bytes(bytes) % 1_000_000;
        Ok(format!("{value:06}"))
    }

    /// Random opaque reset token; only its hash is stored
    pub fn generate_reset_token(&self) -> AppResult<String> {
        let mut bytes = [0u8; 32];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| AppError::internal("Failed to generate reset token"))?;
        Ok(hex::encode(bytes))
    }

    fn registration_key(email: &str) -> String {
        format!("pending:registration:{}", email.to_lowercase())
    }

    fn reset_key(token: &str) -> String {
        let digest = Sha256::digest(token.as_bytes());
        format!("pending:reset:{}", hex::encode(digest))
    }

    /// Park a registration until its code is confirmed; replaces any earlier
    /// attempt for the same email
    pub fn put_registration(&self, pending: &PendingRegistration) -> AppResult<()> {
        let payload = serde_json::to_value(pending)
            .map_err(|e| AppError::internal(format!("Failed to encode registration: {e}")))?;
        self.cache
            .set(Self::registration_key(&pending.email), payload, REGISTRATION_TTL);
        Ok(())
    }

    pub fn get_registration(&self, email: &str) -> Option<PendingRegistration> {
        let payload = self.cache.get(&Self::registration_key(email))?;
        serde_json::from_value(payload).ok()
    }

    pub fn remove_registration(&self, email: &str) {
        self.cache.delete(&Self::registration_key(email));
    }

    /// Park a reset under the token's hash
    pub fn put_reset(&self, token: &str, pending: &PendingReset) -> AppResult<()> {
        let payload = serde_json::to_value(pending)
            .map_err(|e| AppError::internal(format!("Failed to encode reset: {e}")))?;
        self.cache
            .set(Self::reset_key(token), payload, RESET_TOKEN_TTL);
        Ok(())
    }

    pub fn get_reset(&self, token: &str) -> Option<PendingReset> {
        let payload = self.cache.get(&Self::reset_key(token))?;
        serde_json::from_value(payload).ok()
    }

    pub fn remove_reset(&self, token: &str) {
        self.cache.delete(&Self::reset_key(token));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> PendingStore {
        PendingStore::new(CacheService::new())
    }

    #[test]
    fn codes_are_six_digits() {
        let store = store();
        for _ in 0..20 {
            let code = store.generate_code().unwrap();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn registration_round_trip_is_case_insensitive_on_email() {
        let store = store();
        let pending = PendingRegistration {
            username: "ada".to_string(),
            email: "Ada@Example.com".to_string(),
            phone_number: None,
            hash_pass: "hash".to_string(),
            code: "123456".to_string(),
        };
        store.put_registration(&pending).unwrap();

        let found = store.get_registration("ada@example.com").unwrap();
        assert_eq!(found.username, "ada");
        assert_eq!(found.code, "123456");

        store.remove_registration("ADA@EXAMPLE.COM");
        assert!(store.get_registration("ada@example.com").is_none());
    }

    #[test]
    fn reset_tokens_are_stored_by_hash() {
        let store = store();
        let token = store.generate_reset_token().unwrap();
        assert_eq!(token.len(), 64);

        store
            .put_reset(
                &token,
                &PendingReset {
                    user_id: "user:ada".to_string(),
                    email: "ada@example.com".to_string(),
                },
            )
            .unwrap();

        assert!(store.get_reset(&token).is_some());
        assert!(store.get_reset("not-the-token").is_none());

        store.remove_reset(&token);
        assert!(store.get_reset(&token).is_none());
    }
}
