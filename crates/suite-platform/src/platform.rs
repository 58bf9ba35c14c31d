//! Platform facade.
//!
//! The single entry point composing verifier, session manager, dispatcher,
//! and registry. Owns the process-wide state for its lifetime. Construction
//! validates the resolved configuration first and refuses to proceed on a
//! missing secret.

use std::sync::Arc;
use std::time::Duration;
use serde_json::Value;
use suite_common::{
    AuthFailure, ConfigError, DispatchError, PlatformConfig, PlatformError, Request,
};
use tracing::{info, warn};

use crate::authn::{Credential, CredentialVerifier};
use crate::cache::{build_cache, CacheBackend};
use crate::dispatch::RequestDispatcher;
use crate::profile::ProfileStore;
use crate::registry::{HandlerRegistry, RequestHandler};
use crate::session::{SessionManager, SessionStats};

/// The platform core: session issuance and authenticated request dispatch.
pub struct Platform {
    config: PlatformConfig,
    verifier: Arc<dyn CredentialVerifier>,
    sessions: Arc<SessionManager>,
    registry: Arc<HandlerRegistry>,
    dispatcher: RequestDispatcher,
    profiles: Arc<ProfileStore>,
    cache: Arc<dyn CacheBackend>,
}

impl Platform {
    /// Construct the platform from resolved configuration.
    ///
    /// Fails on configuration errors; a partially configured platform never
    /// serves requests.
    pub fn new(
        config: PlatformConfig,
        verifier: Arc<dyn CredentialVerifier>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let sessions = Arc::new(SessionManager::new(&config.session));
        let registry = Arc::new(HandlerRegistry::new());
        let dispatcher =
            RequestDispatcher::new(Arc::clone(&sessions), Arc::clone(&registry), &config.timeouts);
        let cache = build_cache(&config.cache, &config.crypto)?;

        info!(environment = ?config.environment, "platform core initialized");
        Ok(Self {
            config,
            verifier,
            sessions,
            registry,
            dispatcher,
            profiles: Arc::new(ProfileStore::new()),
            cache,
        })
    }

    /// Register a handler for a request type. Duplicate types fail closed.
    pub fn register_handler(
        &self,
        request_type: &str,
        handler: Arc<dyn RequestHandler>,
    ) -> Result<(), ConfigError> {
        self.registry.register(request_type, handler)
    }

    /// Authenticate and open a session.
    ///
    /// Returns only the token, never the session record. The verifier call
    /// is bounded by the configured timeout; the verified identity must
    /// match the claimed `user_id`.
    pub async fn create_session(
        &self,
        user_id: &str,
        credential: &Credential,
    ) -> Result<String, PlatformError> {
        let bound = Duration::from_millis(self.config.timeouts.verify_ms);
        let verified = match tokio::time::timeout(bound, self.verifier.verify(credential)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(user_id, "credential verification timed out");
                return Err(DispatchError::Timeout {
                    elapsed_ms: self.config.timeouts.verify_ms,
                }
                .into());
            }
        };
        if verified.user_id != user_id {
            warn!(user_id, "verified identity does not match claimed user");
            return Err(AuthFailure::InvalidCredentials.into());
        }
        Ok(self.sessions.issue(&verified).token)
    }

    /// Dispatch an authenticated request to its registered handler.
    pub async fn process_request(
        &self,
        token: &str,
        request: &Request,
    ) -> Result<Value, PlatformError> {
        self.dispatcher.process(token, request).await
    }

    /// Rotate a session onto a fresh token; the old token becomes revoked.
    pub fn refresh_session(&self, token: &str) -> Result<String, PlatformError> {
        Ok(self.sessions.refresh(token)?.token)
    }

    /// End a session (logout). Idempotent.
    pub fn revoke_session(&self, token: &str) -> Result<(), PlatformError> {
        Ok(self.sessions.revoke(token)?)
    }

    /// Garbage-collect sessions past retention. Returns removed count.
    pub fn purge_sessions(&self) -> usize {
        self.sessions.purge()
    }

    /// Session table counts.
    pub fn session_stats(&self) -> SessionStats {
        self.sessions.stats()
    }

    /// Profile store, for wiring handlers and seeding identities.
    pub fn profiles(&self) -> Arc<ProfileStore> {
        Arc::clone(&self.profiles)
    }

    /// Configured cache backend, for wiring handlers.
    pub fn cache(&self) -> Arc<dyn CacheBackend> {
        Arc::clone(&self.cache)
    }

    /// Registered request types.
    pub fn handler_types(&self) -> Vec<String> {
        self.registry.types()
    }
}
