//! HS256 identity assertions.
//!
//! External identity providers hand the platform a signed claim instead of a
//! password. Only validation of an already-signed assertion is in scope;
//! provider round-trips happen outside the core. Minting is exposed for the
//! providers' side of the contract and for tests.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use suite_common::{AuthFailure, ConfigError, CryptoConfig, SuiteType};

const ISSUER: &str = "opensuite";

/// Assertion claims.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Username the assertion vouches for
    pub sub: String,
    pub iss: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
    /// Tier claimed by the provider; the verifier cross-checks it against
    /// the stored user
    pub suite: SuiteType,
}

/// HS256 key pair for minting and validating assertions.
pub struct AssertionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl AssertionKeys {
    /// Build keys from resolved configuration. An empty signing secret is a
    /// fatal configuration error.
    pub fn from_config(crypto: &CryptoConfig) -> Result<Self, ConfigError> {
        if crypto.jwt_secret.is_empty() {
            return Err(ConfigError::MissingSecret("jwt_secret"));
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(crypto.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(crypto.jwt_secret.as_bytes()),
        })
    }

    /// Mint a signed assertion for a subject.
    pub fn mint(
        &self,
        subject: &str,
        suite: SuiteType,
        ttl: Duration,
    ) -> Result<String, anyhow::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            iss: ISSUER.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            suite,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Validate an assertion. Every decode failure (bad signature, expiry,
    /// wrong issuer, malformed token) collapses into `InvalidCredentials`.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthFailure> {
        let mut validation = Validation::default();
        validation.set_issuer(&[ISSUER]);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthFailure::InvalidCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> AssertionKeys {
        AssertionKeys::from_config(&CryptoConfig {
            jwt_secret: "test-signing-secret".into(),
            encryption_key: vec![0u8; 32],
            ..CryptoConfig::default()
        })
        .expect("secret present")
    }

    #[test]
    fn test_mint_validate_roundtrip() {
        let keys = keys();
        let token = keys
            .mint("alice", SuiteType::Professional, Duration::seconds(60))
            .expect("mint");
        let claims = keys.validate(&token).expect("fresh assertion validates");
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.suite, SuiteType::Professional);
    }

    #[test]
    fn test_expired_assertion_rejected() {
        let keys = keys();
        let token = keys
            .mint("alice", SuiteType::Personal, Duration::seconds(-120))
            .expect("mint");
        assert_eq!(keys.validate(&token), Err(AuthFailure::InvalidCredentials));
    }

    #[test]
    fn test_wrong_key_rejected() {
        let token = keys()
            .mint("alice", SuiteType::Personal, Duration::seconds(60))
            .expect("mint");
        let other = AssertionKeys::from_config(&CryptoConfig {
            jwt_secret: "a-different-secret".into(),
            encryption_key: vec![0u8; 32],
            ..CryptoConfig::default()
        })
        .expect("secret present");
        assert_eq!(other.validate(&token), Err(AuthFailure::InvalidCredentials));
    }

    #[test]
    fn test_empty_secret_is_config_error() {
        let result = AssertionKeys::from_config(&CryptoConfig::default());
        assert!(matches!(result, Err(ConfigError::MissingSecret("jwt_secret"))));
    }
}
