//! Credential verification.
//!
//! The verifier resolves a credential to a verified identity or fails with
//! the single indistinguishable `InvalidCredentials`. Unknown user and wrong
//! secret cost the same hashing work and return the same error, so callers
//! cannot probe which usernames exist.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashMap;
use suite_common::{AuthFailure, Identity, SuiteType};
use tracing::{debug, warn};

use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use crate::jwt::AssertionKeys;

/// Caller-supplied credential material. Never persisted in plaintext.
#[derive(Clone)]
pub enum Credential {
    /// Username and password
    Password { username: String, password: String },
    /// HS256 assertion from an external identity provider
    Assertion { token: String },
}

// Secret material stays out of Debug output.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Assertion { .. } => f
                .debug_struct("Assertion")
                .field("token", &"<redacted>")
                .finish(),
        }
    }
}

/// Verifies credentials against a user-identity backend.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, credential: &Credential) -> Result<Identity, AuthFailure>;
}

struct StoredUser {
    user_id: String,
    suite: SuiteType,
    password_hash: String,
    attributes: HashMap<String, String>,
}

/// Failed-attempt record, keyed by username.
#[derive(Debug, Clone, Copy)]
pub struct FailedAttempts {
    pub count: u32,
    pub first_attempt: DateTime<Utc>,
    pub last_attempt: DateTime<Utc>,
}

/// In-memory user-identity backend with Argon2id password hashes.
///
/// Reference implementation of [`CredentialVerifier`]; a persistent backend
/// plugs in behind the same trait. Failed attempts are counted per username
/// as the lockout extension point; no threshold is enforced here.
pub struct LocalUserStore {
    users: DashMap<String, StoredUser>,
    failed: DashMap<String, FailedAttempts>,
    assertion_keys: Option<AssertionKeys>,
    // verified against for unknown usernames so both failure cases cost the
    // same work
    dummy_hash: String,
}

fn hash_password(password: &str) -> Result<String, anyhow::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?;
    Ok(hash.to_string())
}

fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

impl LocalUserStore {
    /// Create an empty store. Assertion credentials are rejected unless
    /// [`AssertionKeys`] are supplied.
    pub fn new(assertion_keys: Option<AssertionKeys>) -> Self {
        // any well-formed hash works; the comparison result is discarded
        let dummy_hash = hash_password("dummy-equalization-password")
            .unwrap_or_else(|_| String::new());
        Self {
            users: DashMap::new(),
            failed: DashMap::new(),
            assertion_keys,
            dummy_hash,
        }
    }

    /// Add or replace a user record.
    pub fn add_user(
        &self,
        username: &str,
        password: &str,
        suite: SuiteType,
        attributes: HashMap<String, String>,
    ) -> Result<(), anyhow::Error> {
        let password_hash = hash_password(password)?;
        self.users.insert(
            username.to_string(),
            StoredUser {
                user_id: username.to_string(),
                suite,
                password_hash,
                attributes,
            },
        );
        debug!(username, "user added");
        Ok(())
    }

    /// Failed-attempt record for a username, if any.
    pub fn failed_attempts(&self, username: &str) -> Option<FailedAttempts> {
        self.failed.get(username).map(|entry| *entry)
    }

    fn record_failure(&self, username: &str) {
        let now = Utc::now();
        self.failed
            .entry(username.to_string())
            .and_modify(|attempts| {
                attempts.count += 1;
                attempts.last_attempt = now;
            })
            .or_insert(FailedAttempts {
                count: 1,
                first_attempt: now,
                last_attempt: now,
            });
    }

    fn identity_of(&self, user: &StoredUser) -> Identity {
        Identity {
            user_id: user.user_id.clone(),
            suite: user.suite,
            attributes: user.attributes.clone(),
            verified_at: Utc::now(),
        }
    }

    fn verify_assertion(&self, token: &str) -> Result<Identity, AuthFailure> {
        let keys = self
            .assertion_keys
            .as_ref()
            .ok_or(AuthFailure::InvalidCredentials)?;
        let claims = keys.validate(token)?;
        let user = self
            .users
            .get(&claims.sub)
            .ok_or(AuthFailure::InvalidCredentials)?;
        if user.suite != claims.suite {
            warn!(username = %claims.sub, "assertion tier does not match stored user");
            return Err(AuthFailure::InvalidCredentials);
        }
        Ok(self.identity_of(&user))
    }
}

#[async_trait]
impl CredentialVerifier for LocalUserStore {
    async fn verify(&self, credential: &Credential) -> Result<Identity, AuthFailure> {
        match credential {
            Credential::Password { username, password } => {
                if username.is_empty() || password.is_empty() {
                    return Err(AuthFailure::InvalidCredentials);
                }
                match self.users.get(username) {
                    Some(user) => {
                        if verify_password(&user.password_hash, password) {
                            self.failed.remove(username);
                            Ok(self.identity_of(&user))
                        } else {
                            self.record_failure(username);
                            Err(AuthFailure::InvalidCredentials)
                        }
                    }
                    None => {
                        // burn the same work as a real mismatch
                        let _ = verify_password(&self.dummy_hash, password);
                        self.record_failure(username);
                        Err(AuthFailure::InvalidCredentials)
                    }
                }
            }
            Credential::Assertion { token } => self.verify_assertion(token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use suite_common::CryptoConfig;

    fn store() -> LocalUserStore {
        let store = LocalUserStore::new(None);
        store
            .add_user("alice", "correct horse", SuiteType::Enterprise, HashMap::new())
            .expect("hashing succeeds");
        store
    }

    #[tokio::test]
    async fn test_correct_password_resolves_identity() {
        let store = store();
        let identity = store
            .verify(&Credential::Password {
                username: "alice".into(),
                password: "correct horse".into(),
            })
            .await
            .expect("valid credentials");
        assert_eq!(identity.user_id, "alice");
        assert_eq!(identity.suite, SuiteType::Enterprise);
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_password_are_identical() {
        let store = store();
        let wrong_password = store
            .verify(&Credential::Password {
                username: "alice".into(),
                password: "wrong".into(),
            })
            .await
            .unwrap_err();
        let unknown_user = store
            .verify(&Credential::Password {
                username: "nobody".into(),
                password: "wrong".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(wrong_password, unknown_user);
    }

    #[tokio::test]
    async fn test_empty_fields_rejected() {
        let store = store();
        let result = store
            .verify(&Credential::Password {
                username: String::new(),
                password: "x".into(),
            })
            .await;
        assert_eq!(result.unwrap_err(), AuthFailure::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_failures_are_counted_and_cleared() {
        let store = store();
        for _ in 0..3 {
            let _ = store
                .verify(&Credential::Password {
                    username: "alice".into(),
                    password: "wrong".into(),
                })
                .await;
        }
        assert_eq!(store.failed_attempts("alice").map(|a| a.count), Some(3));

        store
            .verify(&Credential::Password {
                username: "alice".into(),
                password: "correct horse".into(),
            })
            .await
            .expect("valid credentials");
        assert!(store.failed_attempts("alice").is_none());
    }

    #[tokio::test]
    async fn test_assertion_resolves_stored_user() {
        let crypto = CryptoConfig {
            jwt_secret: "test-signing-secret".into(),
            encryption_key: vec![0u8; 32],
            ..CryptoConfig::default()
        };
        let keys = AssertionKeys::from_config(&crypto).expect("keys");
        let store = LocalUserStore::new(Some(AssertionKeys::from_config(&crypto).expect("keys")));
        store
            .add_user("bob", "irrelevant", SuiteType::Student, HashMap::new())
            .expect("hashing succeeds");

        let token = keys
            .mint("bob", SuiteType::Student, chrono::Duration::seconds(60))
            .expect("mint");
        let identity = store
            .verify(&Credential::Assertion { token })
            .await
            .expect("assertion validates");
        assert_eq!(identity.user_id, "bob");
    }

    #[tokio::test]
    async fn test_assertion_rejected_without_keys() {
        let store = store();
        let result = store
            .verify(&Credential::Assertion {
                token: "anything".into(),
            })
            .await;
        assert_eq!(result.unwrap_err(), AuthFailure::InvalidCredentials);
    }
}
