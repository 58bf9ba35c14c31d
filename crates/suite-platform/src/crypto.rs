//! Symmetric sealing for values handed to shared backends.
//!
//! AES-256-GCM with a random 96-bit nonce per seal.
//! Output format: base64(nonce || ciphertext || auth_tag).

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use suite_common::ConfigError;
use tracing::debug;

/// Nonce size for AES-GCM (96 bits / 12 bytes).
const NONCE_SIZE: usize = 12;

/// Seals and opens short string values with the configured 32-byte key.
pub struct SecretSealer {
    cipher: Aes256Gcm,
}

impl SecretSealer {
    /// Build a sealer from key material. Anything but a 32-byte key is a
    /// fatal configuration error.
    pub fn new(key: &[u8]) -> Result<Self, ConfigError> {
        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|_| ConfigError::MissingSecret("encryption_key"))?;
        Ok(Self { cipher })
    }

    /// Encrypt a plaintext value to a base64 string.
    pub fn seal(&self, plaintext: &str) -> Result<String, anyhow::Error> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| anyhow::anyhow!("sealing failed: {e}"))?;

        let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(&sealed))
    }

    /// Decrypt a sealed value. Any failure (bad encoding, truncation,
    /// tampering, wrong key) reads as `None`.
    pub fn open(&self, sealed: &str) -> Option<String> {
        let bytes = match BASE64.decode(sealed) {
            Ok(bytes) if bytes.len() > NONCE_SIZE => bytes,
            _ => {
                debug!("sealed value malformed");
                return None;
            }
        };
        let (nonce_bytes, ciphertext) = bytes.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);
        let plaintext = self.cipher.decrypt(nonce, ciphertext).ok()?;
        String::from_utf8(plaintext).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sealer() -> SecretSealer {
        SecretSealer::new(&[42u8; 32]).expect("32-byte key")
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let sealer = sealer();
        let sealed = sealer.seal("sensitive value").expect("seal");
        assert_ne!(sealed, "sensitive value");
        assert_eq!(sealer.open(&sealed).as_deref(), Some("sensitive value"));
    }

    #[test]
    fn test_nonce_makes_output_nondeterministic() {
        let sealer = sealer();
        let a = sealer.seal("same input").expect("seal");
        let b = sealer.seal("same input").expect("seal");
        assert_ne!(a, b);
    }

    #[test]
    fn test_tampered_value_reads_as_none() {
        let sealer = sealer();
        let sealed = sealer.seal("sensitive value").expect("seal");
        let mut bytes = BASE64.decode(&sealed).expect("decode");
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        assert_eq!(sealer.open(&BASE64.encode(&bytes)), None);
    }

    #[test]
    fn test_wrong_key_reads_as_none() {
        let sealed = sealer().seal("sensitive value").expect("seal");
        let other = SecretSealer::new(&[7u8; 32]).expect("32-byte key");
        assert_eq!(other.open(&sealed), None);
    }

    #[test]
    fn test_bad_key_length_is_config_error() {
        assert_eq!(
            SecretSealer::new(&[1u8; 16]).err(),
            Some(ConfigError::MissingSecret("encryption_key"))
        );
    }
}
