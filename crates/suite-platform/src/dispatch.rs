//! Authenticated request dispatch.
//!
//! Validates the presented token, resolves the declared request type, and
//! invokes the handler under a configured time bound. Session errors
//! propagate unchanged; handler errors are wrapped with their cause, never
//! interpreted or retried. Each `process` call invokes at most one handler
//! exactly zero or one times, and mutates no shared state, so cancellation
//! at any await point leaves the session table and registry untouched.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use suite_common::{BackendTimeouts, DispatchError, PlatformError, Request};
use tracing::{debug, warn};

use crate::registry::HandlerRegistry;
use crate::session::SessionManager;

/// Routes authenticated requests to registered handlers.
pub struct RequestDispatcher {
    sessions: Arc<SessionManager>,
    registry: Arc<HandlerRegistry>,
    handler_timeout: Duration,
}

impl RequestDispatcher {
    pub fn new(
        sessions: Arc<SessionManager>,
        registry: Arc<HandlerRegistry>,
        timeouts: &BackendTimeouts,
    ) -> Self {
        Self {
            sessions,
            registry,
            handler_timeout: Duration::from_millis(timeouts.handler_ms),
        }
    }

    /// Process one request on behalf of the session holding `token`.
    pub async fn process(&self, token: &str, request: &Request) -> Result<Value, PlatformError> {
        let identity = self.sessions.validate(token)?;

        let handler = self
            .registry
            .resolve(&request.request_type)
            .ok_or_else(|| DispatchError::UnknownType(request.request_type.clone()))?;

        match tokio::time::timeout(
            self.handler_timeout,
            handler.handle(&identity, &request.parameters),
        )
        .await
        {
            Ok(Ok(result)) => {
                debug!(
                    user = %identity.user_id,
                    request_type = %request.request_type,
                    "request dispatched"
                );
                Ok(result)
            }
            Ok(Err(cause)) => {
                warn!(
                    user = %identity.user_id,
                    request_type = %request.request_type,
                    %cause,
                    "handler failed"
                );
                Err(DispatchError::HandlerFailed(cause).into())
            }
            Err(_) => {
                let elapsed_ms = self.handler_timeout.as_millis() as u64;
                warn!(
                    user = %identity.user_id,
                    request_type = %request.request_type,
                    elapsed_ms,
                    "handler timed out"
                );
                Err(DispatchError::Timeout { elapsed_ms }.into())
            }
        }
    }
}
