//! Encryption key loading.
//!
//! The key is resolved once at startup from configuration. There is no
//! fallback: a missing or malformed key is a configuration error and the
//! process must not start an encrypting component without one.

use super::KEY_SIZE;
use crate::config::CryptoConfig;
use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// 32-byte AES-256 key.
///
/// Zeroized on drop to prevent key material from lingering in memory.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey([u8; KEY_SIZE]);

impl EncryptionKey {
    /// Wrap raw key bytes
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Decode a base64 key, which must be exactly 32 bytes
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let decoded = Zeroizing::new(
            STANDARD
                .decode(encoded.trim())
                .map_err(|_| Error::Config("Encryption key is not valid base64".to_string()))?,
        );

        if decoded.len() != KEY_SIZE {
            return Err(Error::Config(format!(
                "Encryption key must decode to {} bytes, got {}",
                KEY_SIZE,
                decoded.len()
            )));
        }

        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }

    /// Resolve the key from configuration: the inline key if set, else the
    /// environment variable named by `key_env`.
    pub fn from_config(config: &CryptoConfig) -> Result<Self> {
        if let Some(inline) = &config.key {
            return Self::from_base64(inline);
        }

        match std::env::var(&config.key_env) {
            Ok(value) if !value.trim().is_empty() => Self::from_base64(&value),
            _ => Err(Error::Config(format!(
                "Encryption key not configured: set {} to a base64-encoded {}-byte key",
                config.key_env, KEY_SIZE
            ))),
        }
    }

    /// Generate a fresh random key
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Base64 encoding of the key (for `keygen` output only)
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EncryptionKey(<redacted>)")
    }
}
