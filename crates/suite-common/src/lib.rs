//! Shared types for the OpenSuite platform core.
//!
//! Error taxonomy, resolved configuration, and the domain model consumed by
//! `suite-platform` and the CLI. Keep this crate dependency-light: no runtime,
//! no crypto, no storage.

pub mod config;
pub mod error;
pub mod model;

pub use config::{
    BackendTimeouts, CacheConfig, CryptoConfig, Environment, PlatformConfig, SealAlgorithm,
    SessionConfig, TokenAlgorithm,
};
pub use error::{
    AuthFailure, ConfigError, DispatchError, PlatformError, PlatformResult, SessionError,
};
pub use model::{Identity, Request, SuiteType, UserProfile};
