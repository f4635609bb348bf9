//! Envelope encryption for stored prompts
//!
//! AES-256-GCM with a fresh 16-byte IV per call. A blob is serialized as
//! `base64(iv || tag || ciphertext)`. Encryption failures are hard errors;
//! decryption failures are soft and surface as [`DecryptError`] or one of
//! the sentinel strings, never as ciphertext or key bytes.

mod keys;

pub use keys::EncryptionKey;

use crate::config::CryptoConfig;
use crate::error::{Error, Result};
use aes_gcm::{
    aead::{consts::U16, generic_array::GenericArray, AeadInPlace, KeyInit},
    aes::Aes256,
    AesGcm,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::rngs::OsRng;
use rand::RngCore;

/// AES-256 key size
pub const KEY_SIZE: usize = 32;

/// IV size (GCM with a 16-byte nonce)
pub const IV_SIZE: usize = 16;

/// Authentication tag size
pub const TAG_SIZE: usize = 16;

/// Rendered in place of a value that failed to decrypt
pub const DECRYPTION_FAILED: &str = "[DECRYPTION_FAILED]";

/// Rendered in place of a preview that failed to decrypt
pub const PREVIEW_UNAVAILABLE: &str = "Preview unavailable";

/// Default preview length in characters
pub const DEFAULT_PREVIEW_LEN: usize = 80;

type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Why a blob could not be decrypted. Never carries input bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecryptError {
    #[error("blob is not valid base64")]
    Encoding,

    #[error("blob is shorter than iv and tag")]
    Truncated,

    #[error("integrity check failed")]
    Integrity,

    #[error("plaintext is not valid UTF-8")]
    Utf8,
}

/// Decoded envelope: IV, authentication tag and ciphertext
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedBlob {
    pub iv: [u8; IV_SIZE],
    pub tag: [u8; TAG_SIZE],
    pub ciphertext: Vec<u8>,
}

impl EncryptedBlob {
    /// Serialize as `base64(iv || tag || ciphertext)`
    pub fn to_base64(&self) -> String {
        let mut bytes = Vec::with_capacity(IV_SIZE + TAG_SIZE + self.ciphertext.len());
        bytes.extend_from_slice(&self.iv);
        bytes.extend_from_slice(&self.tag);
        bytes.extend_from_slice(&self.ciphertext);
        STANDARD.encode(bytes)
    }

    /// Parse a serialized blob
    pub fn from_base64(encoded: &str) -> std::result::Result<Self, DecryptError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|_| DecryptError::Encoding)?;
        if bytes.len() < IV_SIZE + TAG_SIZE {
            return Err(DecryptError::Truncated);
        }

        let (iv, rest) = bytes.split_at(IV_SIZE);
        let (tag, ciphertext) = rest.split_at(TAG_SIZE);

        let mut blob = Self {
            iv: [0u8; IV_SIZE],
            tag: [0u8; TAG_SIZE],
            ciphertext: ciphertext.to_vec(),
        };
        blob.iv.copy_from_slice(iv);
        blob.tag.copy_from_slice(tag);
        Ok(blob)
    }

    /// Shape check: non-empty base64 long enough to hold an IV and a tag.
    /// Says nothing about whether the blob authenticates.
    pub fn looks_encrypted(value: &str) -> bool {
        !value.trim().is_empty() && Self::from_base64(value).is_ok()
    }
}

impl std::fmt::Debug for EncryptedBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedBlob")
            .field("ciphertext_len", &self.ciphertext.len())
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for EncryptedBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_base64())
    }
}

/// Process-wide cipher, built once from the configured key and shared
#[derive(Clone)]
pub struct EnvelopeCipher {
    cipher: Aes256Gcm16,
}

impl EnvelopeCipher {
    pub fn new(key: &EncryptionKey) -> Self {
        Self {
            cipher: Aes256Gcm16::new(GenericArray::from_slice(key.as_bytes())),
        }
    }

    /// Build from configuration; fails when no usable key is configured
    pub fn from_config(config: &CryptoConfig) -> Result<Self> {
        let key = EncryptionKey::from_config(config)?;
        Ok(Self::new(&key))
    }

    /// Encrypt a prompt for storage. Empty input gives an empty string.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }
        Ok(self.seal(plaintext.as_bytes())?.to_base64())
    }

    /// Encrypt bytes under a fresh random IV
    pub fn seal(&self, plaintext: &[u8]) -> Result<EncryptedBlob> {
        let mut iv = [0u8; IV_SIZE];
        OsRng.fill_bytes(&mut iv);

        let mut buffer = plaintext.to_vec();
        let tag = self
            .cipher
            .encrypt_in_place_detached(GenericArray::from_slice(&iv), b"", &mut buffer)
            .map_err(|e| Error::Crypto(format!("Encryption failed: {}", e)))?;

        let mut blob = EncryptedBlob {
            iv,
            tag: [0u8; TAG_SIZE],
            ciphertext: buffer,
        };
        blob.tag.copy_from_slice(&tag);
        Ok(blob)
    }

    /// Decrypt a serialized blob. Empty input gives an empty string.
    pub fn decrypt(&self, encoded: &str) -> std::result::Result<String, DecryptError> {
        if encoded.trim().is_empty() {
            return Ok(String::new());
        }

        let result = EncryptedBlob::from_base64(encoded)
            .and_then(|blob| self.open(&blob))
            .and_then(|bytes| String::from_utf8(bytes).map_err(|_| DecryptError::Utf8));

        if let Err(err) = &result {
            tracing::warn!(reason = %err, len = encoded.len(), "Decryption failed");
        }
        result
    }

    /// Verify and decrypt a parsed blob
    pub fn open(&self, blob: &EncryptedBlob) -> std::result::Result<Vec<u8>, DecryptError> {
        let mut buffer = blob.ciphertext.clone();
        self.cipher
            .decrypt_in_place_detached(
                GenericArray::from_slice(&blob.iv),
                b"",
                &mut buffer,
                GenericArray::from_slice(&blob.tag),
            )
            .map_err(|_| DecryptError::Integrity)?;
        Ok(buffer)
    }

    /// Decrypt, rendering any failure as [`DECRYPTION_FAILED`]
    pub fn decrypt_or_sentinel(&self, encoded: &str) -> String {
        self.decrypt(encoded)
            .unwrap_or_else(|_| DECRYPTION_FAILED.to_string())
    }

    /// Decrypt and truncate to `max_len` characters for display.
    /// Any failure renders as [`PREVIEW_UNAVAILABLE`].
    pub fn preview(&self, encoded: &str, max_len: usize) -> String {
        match self.decrypt(encoded) {
            Ok(plaintext) => truncate_chars(&plaintext, max_len),
            Err(_) => PREVIEW_UNAVAILABLE.to_string(),
        }
    }
}

impl std::fmt::Debug for EnvelopeCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EnvelopeCipher(AES-256-GCM)")
    }
}

fn truncate_chars(text: &str, max_len: usize) -> String {
    match text.char_indices().nth(max_len) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn cipher() -> EnvelopeCipher {
        EnvelopeCipher::new(&EncryptionKey::generate())
    }

    #[test]
    fn test_encrypt_decrypt() {
        let cipher = cipher();
        let plaintext = "Email me at john@company.com, SSN 123-45-6789";

        let encoded = cipher.encrypt(plaintext).unwrap();
        assert_ne!(encoded, plaintext);
        assert_eq!(cipher.decrypt(&encoded).unwrap(), plaintext);
    }

    #[test]
    fn test_blob_layout() {
        let cipher = cipher();
        let encoded = cipher.encrypt("abc").unwrap();
        let raw = STANDARD.decode(&encoded).unwrap();
        assert_eq!(raw.len(), IV_SIZE + TAG_SIZE + 3);

        let blob = EncryptedBlob::from_base64(&encoded).unwrap();
        assert_eq!(&raw[..IV_SIZE], &blob.iv);
        assert_eq!(&raw[IV_SIZE..IV_SIZE + TAG_SIZE], &blob.tag);
        assert_eq!(blob.to_string(), encoded);
    }

    #[test]
    fn test_fresh_iv_per_call() {
        let cipher = cipher();
        let mut ivs = HashSet::new();
        let mut encodings = HashSet::new();
        for _ in 0..200 {
            let blob = cipher.seal(b"same plaintext").unwrap();
            assert!(ivs.insert(blob.iv));
            assert!(encodings.insert(blob.to_base64()));
        }
    }

    #[test]
    fn test_empty_is_explicit() {
        let cipher = cipher();
        assert_eq!(cipher.encrypt("").unwrap(), "");
        assert_eq!(cipher.decrypt("").unwrap(), "");
        assert_eq!(cipher.preview("", 80), "");
    }

    #[test]
    fn test_tampered_blob_fails_integrity() {
        let cipher = cipher();
        let encoded = cipher.encrypt("wire transfer to account 12345678901").unwrap();

        let mut raw = STANDARD.decode(&encoded).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        let tampered = STANDARD.encode(&raw);

        assert_eq!(cipher.decrypt(&tampered), Err(DecryptError::Integrity));
        assert_eq!(cipher.decrypt_or_sentinel(&tampered), DECRYPTION_FAILED);
    }

    #[test]
    fn test_tampered_tag_fails_integrity() {
        let cipher = cipher();
        let mut blob = cipher.seal(b"quarterly numbers").unwrap();
        blob.tag[0] ^= 0x80;
        assert_eq!(cipher.open(&blob), Err(DecryptError::Integrity));
    }

    #[test]
    fn test_decrypt_wrong_key() {
        let encoded = cipher().encrypt("Secret message").unwrap();
        assert_eq!(cipher().decrypt(&encoded), Err(DecryptError::Integrity));
    }

    #[test]
    fn test_malformed_input() {
        let cipher = cipher();
        assert_eq!(cipher.decrypt("%%% not base64"), Err(DecryptError::Encoding));

        let short = STANDARD.encode([0u8; IV_SIZE + TAG_SIZE - 1]);
        assert_eq!(cipher.decrypt(&short), Err(DecryptError::Truncated));
    }

    #[test]
    fn test_error_display_has_no_input() {
        let cipher = cipher();
        let input = "c2VjcmV0LXZhbHVlLXRoYXQtaXMtbm90LWEtYmxvYg==";
        let err = cipher.decrypt(input).unwrap_err();
        assert!(!err.to_string().contains(input));
    }

    #[test]
    fn test_preview_truncates() {
        let cipher = cipher();
        let long = "x".repeat(120);
        let encoded = cipher.encrypt(&long).unwrap();

        let preview = cipher.preview(&encoded, DEFAULT_PREVIEW_LEN);
        assert_eq!(preview.len(), DEFAULT_PREVIEW_LEN + 3);
        assert!(preview.ends_with("..."));

        let short = cipher.encrypt("short").unwrap();
        assert_eq!(cipher.preview(&short, DEFAULT_PREVIEW_LEN), "short");
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let cipher = cipher();
        let encoded = cipher.encrypt("日本語のテキスト").unwrap();
        assert_eq!(cipher.preview(&encoded, 3), "日本語...");
    }

    #[test]
    fn test_preview_failure_is_placeholder() {
        let cipher = cipher();
        assert_eq!(cipher.preview("garbage!", 80), PREVIEW_UNAVAILABLE);
    }

    #[test]
    fn test_looks_encrypted() {
        let cipher = cipher();
        let encoded = cipher.encrypt("hello").unwrap();
        assert!(EncryptedBlob::looks_encrypted(&encoded));
        assert!(!EncryptedBlob::looks_encrypted(""));
        assert!(!EncryptedBlob::looks_encrypted("plain text prompt"));
        assert!(!EncryptedBlob::looks_encrypted("aGVsbG8="));
    }

    #[test]
    fn test_blob_debug_hides_bytes() {
        let blob = cipher().seal(b"secret").unwrap();
        let debug = format!("{:?}", blob);
        assert!(debug.contains("ciphertext_len"));
        assert!(!debug.contains(&blob.to_base64()));
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = CryptoConfig {
            key: None,
            key_env: "PROMPTGUARD_TEST_CIPHER_UNSET_3B81".to_string(),
        };
        assert!(matches!(
            EnvelopeCipher::from_config(&config),
            Err(Error::Config(_))
        ));

        let key = EncryptionKey::generate();
        let config = CryptoConfig {
            key: Some(key.to_base64()),
            ..config
        };
        let a = EnvelopeCipher::from_config(&config).unwrap();
        let b = EnvelopeCipher::new(&key);
        let encoded = a.encrypt("shared key").unwrap();
        assert_eq!(b.decrypt(&encoded).unwrap(), "shared key");
    }
}
