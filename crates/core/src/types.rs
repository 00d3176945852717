//! Secure byte container for sensitive material.
//!
//! [`SecureBuffer`] exclusively owns a mutable byte sequence (key material,
//! plaintext, ciphertext) and guarantees that the bytes are zeroed when the
//! buffer is cleared or dropped. It never converts to a loggable string:
//! `Debug` output is redacted and the type deliberately implements neither
//! `Display` nor serde traits.

use std::fmt;

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::error::{CoreError, CoreResult};

/// Memory-safe container for sensitive byte sequences.
///
/// Equality is content-based and always constant-time, so secret
/// comparisons cannot leak timing information through `==`.
#[derive(Clone, Default)]
pub struct SecureBuffer {
    data: Vec<u8>,
}

impl SecureBuffer {
    /// Create an empty buffer.
    pub fn empty() -> Self {
        Self { data: Vec::new() }
    }

    /// Create a buffer by copying the given bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            data: bytes.to_vec(),
        }
    }

    /// Create a buffer taking ownership of the given bytes.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self { data: bytes }
    }

    /// Create a buffer filled with `len` bytes from the OS random source.
    pub fn random(len: usize) -> CoreResult<Self> {
        if len == 0 {
            return Err(CoreError::RandomGenerationFailed(
                "requested length must be greater than zero".to_string(),
            ));
        }
        let mut data = vec![0u8; len];
        getrandom::getrandom(&mut data)
            .map_err(|e| CoreError::RandomGenerationFailed(format!("OS RNG failure: {e}")))?;
        Ok(Self { data })
    }

    /// Buffer length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Read-only view of the contents.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Constant-time content comparison for secret material.
    pub fn ct_eq(&self, other: &Self) -> bool {
        bool::from(self.data.ct_eq(&other.data))
    }

    /// Zero the contents and truncate to empty. Idempotent and irreversible.
    pub fn clear(&mut self) {
        self.data.zeroize();
        self.data.clear();
    }

    /// Extract the raw bytes, consuming the buffer.
    ///
    /// The caller takes over responsibility for zeroizing the returned
    /// vector. Intended for explicit hand-off at the wire boundary only.
    pub fn into_vec(mut self) -> Vec<u8> {
        std::mem::take(&mut self.data)
    }
}

impl PartialEq for SecureBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other)
    }
}

impl Eq for SecureBuffer {}

impl Drop for SecureBuffer {
    fn drop(&mut self) {
        self.data.zeroize();
    }
}

impl fmt::Debug for SecureBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecureBuffer([REDACTED {} bytes])", self.data.len())
    }
}

impl From<Vec<u8>> for SecureBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_vec(bytes)
    }
}

impl From<&[u8]> for SecureBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes)
    }
}
