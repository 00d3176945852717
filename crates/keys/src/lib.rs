//! Key lifecycle management for the Keyward security service.
//!
//! This crate provides the identifier-keyed key repository and the manager
//! that orchestrates it together with the crypto engine:
//!
//! - [`KeyStore`]: async storage abstraction with per-identifier
//!   single-writer discipline; pluggable backends (the in-memory
//!   [`MemoryKeyStore`] is the reference implementation)
//! - [`KeyManager`]: generate, import, export, enumerate, delete, and
//!   atomically rotate key material
//!
//! # Concurrency Model
//!
//! Mutations to a given identifier are serialized; reads of one identifier
//! may proceed concurrently with unrelated reads but never overlap a write
//! to that identifier. Rotation commits are compare-and-swap on the key
//! version: of N racing rotations exactly one commits, the rest fail with
//! no visible side effects, and no reader ever observes a torn state.

pub mod manager;
pub mod material;
pub mod store;

pub use manager::{KeyManager, RotationOutcome};
pub use material::{KeyAlgorithm, KeyInfo, KeyMaterial, KeyStatus};
pub use store::{KeyStore, MemoryKeyStore};
