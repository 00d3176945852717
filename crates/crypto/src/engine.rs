//! Stateless symmetric engine: AEAD, hashing, HMAC, and random generation.
//!
//! # Framing Contract
//!
//! Symmetric ciphertext always has the fixed layout
//! `nonce(12) || ciphertext || tag(16)`. The nonce is generated by the
//! engine on every encryption; callers cannot supply one. Decryption parses
//! the same layout and fails closed on truncation, wrong key, or tag
//! mismatch.

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    ChaCha20Poly1305, Key, Nonce,
};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use keyward_core::{CoreError, CoreResult, SecureBuffer};

type HmacSha256 = Hmac<Sha256>;

/// Nonce size for ChaCha20-Poly1305 (96 bits / 12 bytes).
pub const NONCE_SIZE: usize = 12;

/// Poly1305 authentication tag size (128 bits / 16 bytes).
pub const TAG_SIZE: usize = 16;

/// Symmetric key size (256 bits / 32 bytes).
pub const KEY_SIZE: usize = 32;

/// SHA-256 digest size.
pub const HASH_SIZE: usize = 32;

/// Smallest valid symmetric frame: empty plaintext still carries nonce + tag.
pub const MIN_FRAME_SIZE: usize = NONCE_SIZE + TAG_SIZE;

/// Default symmetric key size in bits.
pub const DEFAULT_KEY_BITS: u32 = 256;

/// Stateless cryptographic engine.
///
/// Every operation is pure apart from drawing OS entropy, so a single
/// engine value is safe to share across concurrent callers without locking.
#[derive(Debug, Clone, Copy, Default)]
pub struct CryptoEngine;

impl CryptoEngine {
    pub fn new() -> Self {
        Self
    }

    /// Generate `len` bytes from the OS random source.
    pub fn generate_random_bytes(&self, len: usize) -> CoreResult<SecureBuffer> {
        SecureBuffer::random(len)
    }

    /// SHA-256 digest of `data`.
    pub fn hash(&self, data: &[u8]) -> CoreResult<SecureBuffer> {
        let digest = Sha256::digest(data);
        Ok(SecureBuffer::from_bytes(&digest))
    }

    /// HMAC-SHA256 of `data` under `key`.
    pub fn hmac(&self, data: &[u8], key: &SecureBuffer) -> CoreResult<SecureBuffer> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(key.as_bytes())
            .map_err(|e| CoreError::HashingFailed(format!("HMAC key setup failed: {e}")))?;
        mac.update(data);
        Ok(SecureBuffer::from_bytes(&mac.finalize().into_bytes()))
    }

    /// Verify an HMAC-SHA256 tag in constant time.
    pub fn verify_hmac(
        &self,
        mac: &SecureBuffer,
        data: &[u8],
        key: &SecureBuffer,
    ) -> CoreResult<bool> {
        let expected = self.hmac(data, key)?;
        Ok(bool::from(expected.as_bytes().ct_eq(mac.as_bytes())))
    }

    /// Generate a symmetric key of the given size.
    ///
    /// Only 128, 192 and 256 bit keys are produced; AEAD operations require
    /// 256-bit keys, the smaller sizes serve HMAC-only callers.
    pub fn generate_symmetric_key(&self, bits: u32) -> CoreResult<SecureBuffer> {
        match bits {
            128 | 192 | 256 => self.generate_random_bytes((bits / 8) as usize).map_err(|e| {
                CoreError::KeyGenerationFailed(format!("random source failed: {e}"))
            }),
            other => Err(CoreError::KeyGenerationFailed(format!(
                "unsupported key size: {other} bits (expected 128, 192 or 256)"
            ))),
        }
    }

    /// Encrypt `plaintext` under `key` with ChaCha20-Poly1305.
    ///
    /// Output layout is `nonce(12) || ciphertext || tag(16)`; the nonce is
    /// always generated here.
    pub fn encrypt_symmetric(
        &self,
        plaintext: &[u8],
        key: &SecureBuffer,
        aad: Option<&[u8]>,
    ) -> CoreResult<SecureBuffer> {
        let cipher = self.aead_cipher(key)?;

        let nonce_bytes = SecureBuffer::random(NONCE_SIZE)
            .map_err(|e| CoreError::EncryptionFailed(format!("nonce generation failed: {e}")))?;
        let nonce = Nonce::from_slice(nonce_bytes.as_bytes());

        let payload = Payload {
            msg: plaintext,
            aad: aad.unwrap_or(&[]),
        };
        let ciphertext = cipher
            .encrypt(nonce, payload)
            .map_err(|_| CoreError::EncryptionFailed("AEAD encryption failed".to_string()))?;

        let mut framed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        framed.extend_from_slice(nonce_bytes.as_bytes());
        framed.extend_from_slice(&ciphertext);
        Ok(SecureBuffer::from_vec(framed))
    }

    /// Decrypt a `nonce || ciphertext || tag` frame.
    ///
    /// Fails with `DecryptionFailed` on truncated input, a wrong key, or an
    /// authentication-tag mismatch. No partial plaintext ever escapes.
    pub fn decrypt_symmetric(
        &self,
        framed: &[u8],
        key: &SecureBuffer,
        aad: Option<&[u8]>,
    ) -> CoreResult<SecureBuffer> {
        if framed.len() < MIN_FRAME_SIZE {
            return Err(CoreError::DecryptionFailed(format!(
                "truncated frame: {} bytes (minimum {MIN_FRAME_SIZE})",
                framed.len()
            )));
        }

        let cipher = self.aead_cipher(key)?;
        let (nonce_bytes, ciphertext) = framed.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        let payload = Payload {
            msg: ciphertext,
            aad: aad.unwrap_or(&[]),
        };
        let plaintext = cipher
            .decrypt(nonce, payload)
            .map_err(|_| CoreError::DecryptionFailed("authentication failed".to_string()))?;

        Ok(SecureBuffer::from_vec(plaintext))
    }

    fn aead_cipher(&self, key: &SecureBuffer) -> CoreResult<ChaCha20Poly1305> {
        if key.len() != KEY_SIZE {
            return Err(CoreError::InvalidInput(format!(
                "symmetric key must be {KEY_SIZE} bytes, got {}",
                key.len()
            )));
        }
        Ok(ChaCha20Poly1305::new(Key::from_slice(key.as_bytes())))
    }
}
