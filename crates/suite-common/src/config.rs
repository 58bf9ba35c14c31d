//! Resolved platform configuration.
//!
//! The core never parses configuration documents. An external collaborator
//! resolves exactly one environment (development/production/testing) into a
//! [`PlatformConfig`] before the core starts; only resolved values appear
//! here. [`PlatformConfig::validate`] is the startup gate: a missing secret
//! is fatal, the facade refuses to construct.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Deployment environment the configuration was resolved for.
///
/// The core itself is environment-agnostic; the name is carried for logging.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
    Testing,
}

/// Session lifetime settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session time-to-live in seconds
    pub ttl_secs: u64,
    /// How long expired/revoked sessions are retained before garbage
    /// collection. Retained tombstones keep `Revoked` distinguishable from
    /// `NotFound` for recently ended sessions.
    pub retention_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 3600,
            retention_secs: 300,
        }
    }
}

/// Token signing algorithm identifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TokenAlgorithm {
    /// HMAC-SHA256 signed assertions
    Hs256,
}

/// Symmetric sealing algorithm identifier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SealAlgorithm {
    /// AES-256-GCM authenticated encryption
    Aes256Gcm,
}

/// Signing and sealing parameters. Key material is sourced from
/// environment-specific secrets by the external configuration layer.
#[derive(Clone, Serialize, Deserialize)]
pub struct CryptoConfig {
    /// Algorithm for identity assertions
    pub token_algorithm: TokenAlgorithm,
    /// Algorithm for sealing values handed to shared backends
    pub seal_algorithm: SealAlgorithm,
    /// HS256 signing secret
    pub jwt_secret: String,
    /// 32-byte AES-256-GCM key
    pub encryption_key: Vec<u8>,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            token_algorithm: TokenAlgorithm::Hs256,
            seal_algorithm: SealAlgorithm::Aes256Gcm,
            jwt_secret: String::new(),
            encryption_key: Vec::new(),
        }
    }
}

// Key material stays out of Debug output.
impl std::fmt::Debug for CryptoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoConfig")
            .field("token_algorithm", &self.token_algorithm)
            .field("seal_algorithm", &self.seal_algorithm)
            .field("jwt_secret", &"<redacted>")
            .field("encryption_key", &"<redacted>")
            .finish()
    }
}

/// Cache backend descriptor. Opaque to the core beyond the in-process
/// variant; external descriptors are wired by the embedding process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CacheConfig {
    /// In-process cache
    Memory { max_entries: u64, ttl_secs: u64 },
    /// External key-value service (connection handled outside the core)
    External { kind: String, url: String },
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::Memory {
            max_entries: 10_000,
            ttl_secs: 60,
        }
    }
}

/// Bounds on backend calls. A call that exceeds its bound surfaces as a
/// timeout error rather than hanging the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendTimeouts {
    /// Credential verification bound in milliseconds
    pub verify_ms: u64,
    /// Handler invocation bound in milliseconds
    pub handler_ms: u64,
}

impl Default for BackendTimeouts {
    fn default() -> Self {
        Self {
            verify_ms: 2_000,
            handler_ms: 5_000,
        }
    }
}

/// Fully resolved platform configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub environment: Environment,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub crypto: CryptoConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub timeouts: BackendTimeouts,
}

impl PlatformConfig {
    /// Validate required secrets for the active environment.
    ///
    /// Called by the facade before anything else is constructed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.crypto.jwt_secret.is_empty() {
            return Err(ConfigError::MissingSecret("jwt_secret"));
        }
        if self.crypto.encryption_key.len() != 32 {
            return Err(ConfigError::MissingSecret("encryption_key"));
        }
        Ok(())
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            session: SessionConfig::default(),
            crypto: CryptoConfig::default(),
            cache: CacheConfig::default(),
            timeouts: BackendTimeouts::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> PlatformConfig {
        PlatformConfig {
            crypto: CryptoConfig {
                jwt_secret: "test-signing-secret".into(),
                encryption_key: vec![7u8; 32],
                ..CryptoConfig::default()
            },
            ..PlatformConfig::default()
        }
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_jwt_secret() {
        let mut config = valid_config();
        config.crypto.jwt_secret.clear();
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingSecret("jwt_secret"))
        );
    }

    #[test]
    fn test_validate_rejects_short_encryption_key() {
        let mut config = valid_config();
        config.crypto.encryption_key = vec![7u8; 16];
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingSecret("encryption_key"))
        );
    }

    #[test]
    fn test_defaults_match_documented_environments() {
        let config = PlatformConfig::default();
        assert_eq!(config.session.ttl_secs, 3600);
        assert_eq!(config.crypto.token_algorithm, TokenAlgorithm::Hs256);
        assert_eq!(config.crypto.seal_algorithm, SealAlgorithm::Aes256Gcm);
    }

    #[test]
    fn test_debug_redacts_key_material() {
        let config = valid_config();
        let rendered = format!("{:?}", config.crypto);
        assert!(!rendered.contains("test-signing-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
