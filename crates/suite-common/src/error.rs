//! Error types for the OpenSuite platform core.

use thiserror::Error;

/// Authentication failure.
///
/// Unknown user and wrong secret collapse into the single
/// `InvalidCredentials` variant: the verifier must not reveal whether a
/// username exists.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// Credentials did not resolve to a verified identity
    #[error("invalid credentials")]
    InvalidCredentials,
}

/// Session validation failure.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// Session exists but is past its expiry
    #[error("session expired")]
    Expired,

    /// Session was revoked (logout or token rotation)
    #[error("session revoked")]
    Revoked,

    /// Token does not map to any retained session
    #[error("unknown session token")]
    NotFound,
}

/// Request dispatch failure.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// No handler registered for the declared request type
    #[error("no handler registered for request type: {0}")]
    UnknownType(String),

    /// Handler returned an error; the cause is wrapped, never interpreted
    #[error("handler failed")]
    HandlerFailed(#[source] anyhow::Error),

    /// A backend or handler call exceeded its configured bound
    #[error("backend call timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },
}

/// Configuration error. Fatal at startup: the facade refuses to serve
/// requests in a partially configured state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A handler type was registered twice; the original registration wins
    #[error("duplicate handler type: {0}")]
    DuplicateType(String),

    /// A secret required by the active environment is absent or malformed
    #[error("missing secret for active environment: {0}")]
    MissingSecret(&'static str),
}

/// Umbrella error returned by facade operations.
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("{0}")]
    Auth(#[from] AuthFailure),

    #[error("{0}")]
    Session(#[from] SessionError),

    #[error("{0}")]
    Dispatch(#[from] DispatchError),

    #[error("{0}")]
    Config(#[from] ConfigError),
}

/// Result type for facade operations.
pub type PlatformResult<T> = Result<T, PlatformError>;
