//! Asymmetric operations: X25519 sealed-box encryption and Ed25519 signatures.
//!
//! # Sealed-Box Framing
//!
//! Asymmetric ciphertext layout is
//! `ephemeral_public(32) || nonce(12) || ciphertext || tag(16)`. A fresh
//! X25519 keypair is generated per encryption; the Diffie-Hellman shared
//! secret with the recipient's public key directly keys ChaCha20-Poly1305,
//! and the ephemeral secret is discarded (zeroized on drop) once the shared
//! secret is derived.
//!
//! These are genuine primitives; Keyward does not derive keypairs from
//! hashed seeds or substitute MACs for signatures.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::Zeroize;

use keyward_core::{CoreError, CoreResult, SecureBuffer};

use crate::engine::{CryptoEngine, NONCE_SIZE, TAG_SIZE};

/// X25519 public key size.
pub const X25519_PUBLIC_SIZE: usize = 32;

/// Ed25519 signature size.
pub const SIGNATURE_SIZE: usize = 64;

/// Smallest valid sealed-box frame: ephemeral public + nonce + tag.
pub const MIN_SEALED_SIZE: usize = X25519_PUBLIC_SIZE + NONCE_SIZE + TAG_SIZE;

/// X25519 keypair for asymmetric encryption.
///
/// The secret half lives in a [`SecureBuffer`] and is zeroized on drop.
#[derive(Debug)]
pub struct AsymmetricKeypair {
    /// X25519 public key (32 bytes)
    pub public: Vec<u8>,
    /// X25519 secret key (32 bytes)
    pub secret: SecureBuffer,
}

/// Ed25519 keypair for signing.
#[derive(Debug)]
pub struct SigningKeypair {
    /// Ed25519 verifying key (32 bytes)
    pub public: Vec<u8>,
    /// Ed25519 signing key seed (32 bytes)
    pub secret: SecureBuffer,
}

impl CryptoEngine {
    /// Generate an X25519 keypair for asymmetric encryption.
    pub fn generate_asymmetric_keypair(&self) -> CoreResult<AsymmetricKeypair> {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = X25519PublicKey::from(&secret);

        Ok(AsymmetricKeypair {
            public: public.as_bytes().to_vec(),
            secret: SecureBuffer::from_bytes(secret.as_bytes()),
        })
    }

    /// Encrypt `plaintext` to the holder of `recipient_public`.
    ///
    /// Output layout is `ephemeral_public(32) || nonce(12) || ciphertext ||
    /// tag(16)`.
    pub fn encrypt_asymmetric(
        &self,
        plaintext: &[u8],
        recipient_public: &[u8],
    ) -> CoreResult<SecureBuffer> {
        let recipient = parse_x25519_public(recipient_public)?;

        let ephemeral = StaticSecret::random_from_rng(OsRng);
        let ephemeral_public = X25519PublicKey::from(&ephemeral);
        let shared = ephemeral.diffie_hellman(&recipient);

        let cipher = ChaCha20Poly1305::new(Key::from_slice(shared.as_bytes()));
        let nonce_bytes = SecureBuffer::random(NONCE_SIZE)
            .map_err(|e| CoreError::EncryptionFailed(format!("nonce generation failed: {e}")))?;
        let nonce = Nonce::from_slice(nonce_bytes.as_bytes());

        let ciphertext = cipher
            .encrypt(nonce, plaintext)
            .map_err(|_| CoreError::EncryptionFailed("sealed-box encryption failed".to_string()))?;

        let mut framed =
            Vec::with_capacity(X25519_PUBLIC_SIZE + NONCE_SIZE + ciphertext.len());
        framed.extend_from_slice(ephemeral_public.as_bytes());
        framed.extend_from_slice(nonce_bytes.as_bytes());
        framed.extend_from_slice(&ciphertext);
        Ok(SecureBuffer::from_vec(framed))
    }

    /// Decrypt a sealed-box frame with the recipient's X25519 secret key.
    pub fn decrypt_asymmetric(
        &self,
        framed: &[u8],
        recipient_secret: &SecureBuffer,
    ) -> CoreResult<SecureBuffer> {
        if framed.len() < MIN_SEALED_SIZE {
            return Err(CoreError::DecryptionFailed(format!(
                "truncated sealed box: {} bytes (minimum {MIN_SEALED_SIZE})",
                framed.len()
            )));
        }

        let secret = parse_x25519_secret(recipient_secret)?;
        let (ephemeral_bytes, rest) = framed.split_at(X25519_PUBLIC_SIZE);
        let (nonce_bytes, ciphertext) = rest.split_at(NONCE_SIZE);

        let ephemeral = parse_x25519_public(ephemeral_bytes)
            .map_err(|_| CoreError::DecryptionFailed("malformed ephemeral key".to_string()))?;
        let shared = secret.diffie_hellman(&ephemeral);

        let cipher = ChaCha20Poly1305::new(Key::from_slice(shared.as_bytes()));
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| CoreError::DecryptionFailed("authentication failed".to_string()))?;

        Ok(SecureBuffer::from_vec(plaintext))
    }

    /// Generate an Ed25519 signing keypair.
    pub fn generate_signing_keypair(&self) -> CoreResult<SigningKeypair> {
        let seed = SecureBuffer::random(32)
            .map_err(|e| CoreError::KeyGenerationFailed(format!("random source failed: {e}")))?;
        let mut seed_bytes = [0u8; 32];
        seed_bytes.copy_from_slice(seed.as_bytes());

        let signing_key = SigningKey::from_bytes(&seed_bytes);
        let verifying_key = signing_key.verifying_key();

        seed_bytes.zeroize();

        Ok(SigningKeypair {
            public: verifying_key.as_bytes().to_vec(),
            secret: seed,
        })
    }

    /// Sign `data` with an Ed25519 signing key, producing a 64-byte signature.
    pub fn sign(&self, data: &[u8], signing_secret: &SecureBuffer) -> CoreResult<SecureBuffer> {
        let mut seed_bytes: [u8; 32] = signing_secret
            .as_bytes()
            .try_into()
            .map_err(|_| CoreError::InvalidInput("signing key must be 32 bytes".to_string()))?;

        let signing_key = SigningKey::from_bytes(&seed_bytes);
        let signature = signing_key.sign(data);

        seed_bytes.zeroize();

        Ok(SecureBuffer::from_bytes(&signature.to_bytes()))
    }

    /// Verify an Ed25519 signature over `data`.
    ///
    /// Returns `Ok(false)` for a well-formed but invalid signature; malformed
    /// keys and signature lengths are `InvalidInput`.
    pub fn verify(&self, signature: &[u8], data: &[u8], public: &[u8]) -> CoreResult<bool> {
        let key_bytes: [u8; 32] = public
            .try_into()
            .map_err(|_| CoreError::InvalidInput("verifying key must be 32 bytes".to_string()))?;
        let verifying_key = VerifyingKey::from_bytes(&key_bytes)
            .map_err(|e| CoreError::InvalidInput(format!("malformed verifying key: {e}")))?;

        let signature = Signature::from_slice(signature)
            .map_err(|_| CoreError::InvalidInput("signature must be 64 bytes".to_string()))?;

        Ok(verifying_key.verify(data, &signature).is_ok())
    }
}

fn parse_x25519_public(bytes: &[u8]) -> CoreResult<X25519PublicKey> {
    let array: [u8; 32] = bytes
        .try_into()
        .map_err(|_| CoreError::InvalidInput("X25519 public key must be 32 bytes".to_string()))?;
    Ok(X25519PublicKey::from(array))
}

fn parse_x25519_secret(secret: &SecureBuffer) -> CoreResult<StaticSecret> {
    let array: [u8; 32] = secret
        .as_bytes()
        .try_into()
        .map_err(|_| CoreError::InvalidInput("X25519 secret key must be 32 bytes".to_string()))?;
    Ok(StaticSecret::from(array))
}
