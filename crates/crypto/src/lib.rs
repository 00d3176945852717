//! Cryptographic primitives and operations for the Keyward security service.
//!
//! This crate provides the stateless cryptographic engine underneath the
//! Keyward key manager and orchestrator: authenticated encryption, hashing,
//! message authentication, key generation, and genuine asymmetric
//! primitives.
//!
//! # Core Capabilities
//!
//! - **Authenticated Encryption**: ChaCha20-Poly1305 with a fixed framing
//!   rule (`nonce(12) || ciphertext || tag(16)`, engine-generated nonce)
//! - **Hash Functions**: SHA-256 for all integrity digests
//! - **Message Authentication**: HMAC-SHA256 with constant-time verification
//! - **Key Exchange**: X25519 sealed-box encryption
//! - **Digital Signatures**: Ed25519 sign and verify
//! - **Random Generation**: OS entropy via `getrandom`
//!
//! # Security Principles
//!
//! - Never roll custom cryptographic primitives
//! - Expected failures return typed errors, never panic
//! - Secret comparisons are constant-time
//! - Key material lives in [`SecureBuffer`]s and is zeroized after use
//! - Tampered ciphertext is rejected whole; partially-decrypted data is
//!   never returned
//!
//! [`SecureBuffer`]: keyward_core::SecureBuffer

pub mod asymmetric;
pub mod engine;

pub use asymmetric::{
    AsymmetricKeypair, SigningKeypair, MIN_SEALED_SIZE, SIGNATURE_SIZE, X25519_PUBLIC_SIZE,
};
pub use engine::{
    CryptoEngine, DEFAULT_KEY_BITS, HASH_SIZE, KEY_SIZE, MIN_FRAME_SIZE, NONCE_SIZE, TAG_SIZE,
};
