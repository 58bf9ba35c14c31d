//! Session lifecycle management.
//!
//! Sessions live in a sharded token table so validation on the hot path
//! never blocks on unrelated sessions' mutations. Refresh rotates the token
//! atomically: the old token is revoked under its exclusive entry guard
//! before the successor becomes visible, so no interleaving observes both
//! tokens as valid.

use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rand::rngs::OsRng;
use rand::RngCore;
use suite_common::{Identity, SessionConfig, SessionError};
use tracing::debug;

/// Token entropy in bytes (256 bits).
const TOKEN_BYTES: usize = 32;

/// A time-bounded, revocable authorization artifact bound to one identity.
///
/// The embedded identity is a verification-time snapshot; the session never
/// owns profile lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub identity: Identity,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Session {
    /// A session is valid iff it is neither revoked nor past expiry.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && now < self.expires_at
    }
}

fn generate_token() -> String {
    let mut buf = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut buf);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf)
}

/// Session manager owning the token table exclusively.
///
/// Only token-scoped operations are exposed; raw session mutation stays
/// inside this module.
pub struct SessionManager {
    sessions: DashMap<String, Session>,
    ttl: Duration,
    retention: Duration,
}

impl SessionManager {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl: Duration::seconds(config.ttl_secs as i64),
            retention: Duration::seconds(config.retention_secs as i64),
        }
    }

    /// Issue a new session for a verified identity.
    ///
    /// Token uniqueness across live sessions is guaranteed: insertion goes
    /// through the vacant-entry path, regenerating on collision.
    pub fn issue(&self, identity: &Identity) -> Session {
        let session = self.insert_new(identity.clone());
        debug!(
            user = %session.identity.user_id,
            expires_at = %session.expires_at,
            "session issued"
        );
        session
    }

    /// Resolve a token to its identity.
    ///
    /// Side-effect-free on every path. Check order: unknown token, revoked
    /// flag, expiry.
    pub fn validate(&self, token: &str) -> Result<Identity, SessionError> {
        let session = self.sessions.get(token).ok_or(SessionError::NotFound)?;
        if session.revoked {
            return Err(SessionError::Revoked);
        }
        if Utc::now() >= session.expires_at {
            return Err(SessionError::Expired);
        }
        Ok(session.identity.clone())
    }

    /// Revoke a session. Irreversible and idempotent: revoking an
    /// already-revoked session succeeds silently.
    pub fn revoke(&self, token: &str) -> Result<(), SessionError> {
        let mut session = self.sessions.get_mut(token).ok_or(SessionError::NotFound)?;
        if !session.revoked {
            session.revoked = true;
            session.revoked_at = Some(Utc::now());
            debug!(user = %session.identity.user_id, "session revoked");
        }
        Ok(())
    }

    /// Rotate a valid session onto a fresh token.
    ///
    /// The old token is revoked under its exclusive entry guard before the
    /// successor is inserted; a concurrent validate on the old token sees
    /// either the pre-refresh valid state or the post-refresh revoked state.
    /// Of two concurrent refreshes, exactly one wins; the other observes
    /// `Revoked`.
    pub fn refresh(&self, token: &str) -> Result<Session, SessionError> {
        let identity = {
            let mut current = self.sessions.get_mut(token).ok_or(SessionError::NotFound)?;
            if current.revoked {
                return Err(SessionError::Revoked);
            }
            if Utc::now() >= current.expires_at {
                return Err(SessionError::Expired);
            }
            current.revoked = true;
            current.revoked_at = Some(Utc::now());
            current.identity.clone()
        };
        let successor = self.insert_new(identity);
        debug!(user = %successor.identity.user_id, "session refreshed");
        Ok(successor)
    }

    /// Garbage-collect sessions past expiry plus the retention window.
    ///
    /// Revoked tombstones are retained for the same window so recently ended
    /// sessions still report `Revoked` rather than `NotFound`. Returns the
    /// number of sessions removed.
    pub fn purge(&self) -> usize {
        let now = Utc::now();
        let retention = self.retention;
        let before = self.sessions.len();
        self.sessions.retain(|_, session| {
            let horizon = session.revoked_at.unwrap_or(session.expires_at);
            now < horizon + retention
        });
        let removed = before - self.sessions.len();
        if removed > 0 {
            debug!(removed, "purged sessions");
        }
        removed
    }

    /// Current session counts.
    pub fn stats(&self) -> SessionStats {
        let now = Utc::now();
        let mut stats = SessionStats::default();
        for session in self.sessions.iter() {
            stats.total += 1;
            if session.revoked {
                stats.revoked += 1;
            } else if now >= session.expires_at {
                stats.expired += 1;
            } else {
                stats.active += 1;
            }
        }
        stats
    }

    fn insert_new(&self, identity: Identity) -> Session {
        let now = Utc::now();
        loop {
            let token = generate_token();
            match self.sessions.entry(token.clone()) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(vacant) => {
                    let session = Session {
                        token,
                        identity,
                        issued_at: now,
                        expires_at: now + self.ttl,
                        revoked: false,
                        revoked_at: None,
                    };
                    vacant.insert(session.clone());
                    return session;
                }
            }
        }
    }
}

/// Session table counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub total: usize,
    pub active: usize,
    pub revoked: usize,
    pub expired: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use suite_common::SuiteType;

    fn identity(user_id: &str) -> Identity {
        Identity {
            user_id: user_id.to_string(),
            suite: SuiteType::Enterprise,
            attributes: HashMap::new(),
            verified_at: Utc::now(),
        }
    }

    fn manager(ttl_secs: u64, retention_secs: u64) -> SessionManager {
        SessionManager::new(&SessionConfig {
            ttl_secs,
            retention_secs,
        })
    }

    #[test]
    fn test_validate_after_issue_resolves_identity() {
        let manager = manager(3600, 300);
        let session = manager.issue(&identity("u1"));
        let resolved = manager.validate(&session.token).expect("fresh session valid");
        assert_eq!(resolved.user_id, "u1");
    }

    #[test]
    fn test_tokens_are_unique_and_unguessable_length() {
        let manager = manager(3600, 300);
        let a = manager.issue(&identity("u1"));
        let b = manager.issue(&identity("u1"));
        assert_ne!(a.token, b.token);
        // 32 bytes base64url without padding
        assert_eq!(a.token.len(), 43);
    }

    #[test]
    fn test_unknown_token_is_not_found() {
        let manager = manager(3600, 300);
        assert_eq!(
            manager.validate("garbage-token"),
            Err(SessionError::NotFound)
        );
    }

    #[test]
    fn test_revoke_is_sticky_and_idempotent() {
        let manager = manager(3600, 300);
        let session = manager.issue(&identity("u1"));

        manager.revoke(&session.token).expect("first revoke");
        assert_eq!(
            manager.validate(&session.token),
            Err(SessionError::Revoked)
        );
        // second revoke still succeeds
        manager.revoke(&session.token).expect("revoke is idempotent");
        assert_eq!(
            manager.validate(&session.token),
            Err(SessionError::Revoked)
        );
    }

    #[test]
    fn test_revoke_unknown_token_is_not_found() {
        let manager = manager(3600, 300);
        assert_eq!(manager.revoke("nope"), Err(SessionError::NotFound));
    }

    #[test]
    fn test_expired_session_reports_expired() {
        let manager = manager(0, 300);
        let session = manager.issue(&identity("u1"));
        assert_eq!(
            manager.validate(&session.token),
            Err(SessionError::Expired)
        );
    }

    #[test]
    fn test_refresh_rotates_token() {
        let manager = manager(3600, 300);
        let old = manager.issue(&identity("u1"));
        let new = manager.refresh(&old.token).expect("valid session refreshes");

        assert_ne!(old.token, new.token);
        assert!(manager.validate(&new.token).is_ok());
        assert_eq!(manager.validate(&old.token), Err(SessionError::Revoked));
    }

    #[test]
    fn test_refresh_rejects_expired_and_revoked() {
        let expired = manager(0, 300);
        let session = expired.issue(&identity("u1"));
        assert_eq!(expired.refresh(&session.token), Err(SessionError::Expired));

        let manager = manager(3600, 300);
        let session = manager.issue(&identity("u1"));
        manager.revoke(&session.token).expect("revoke");
        assert_eq!(manager.refresh(&session.token), Err(SessionError::Revoked));
    }

    #[test]
    fn test_concurrent_refresh_exactly_one_wins() {
        let manager = Arc::new(manager(3600, 300));
        let session = manager.issue(&identity("u1"));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let manager = Arc::clone(&manager);
                let token = session.token.clone();
                std::thread::spawn(move || manager.refresh(&token))
            })
            .collect();

        let results: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("thread completes"))
            .collect();

        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(SessionError::Revoked))));
    }

    #[test]
    fn test_purge_removes_past_retention_only() {
        let manager = manager(0, 0);
        let session = manager.issue(&identity("u1"));
        // expired with zero retention: eligible immediately
        assert_eq!(manager.purge(), 1);
        assert_eq!(manager.validate(&session.token), Err(SessionError::NotFound));

        let keeper = SessionManager::new(&SessionConfig {
            ttl_secs: 0,
            retention_secs: 3600,
        });
        let session = keeper.issue(&identity("u1"));
        // expired but inside the grace window: retained, still reports Expired
        assert_eq!(keeper.purge(), 0);
        assert_eq!(keeper.validate(&session.token), Err(SessionError::Expired));
    }

    #[test]
    fn test_stats_counts_states() {
        let manager = manager(3600, 300);
        let a = manager.issue(&identity("u1"));
        let _b = manager.issue(&identity("u2"));
        manager.revoke(&a.token).expect("revoke");

        let stats = manager.stats();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.revoked, 1);
    }
}
