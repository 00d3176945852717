//! Security operation service for Keyward.
//!
//! This crate ties the crypto engine and key manager together behind a
//! single dispatch entry point and exposes it through three capability
//! tiers:
//!
//! - **Basic**: liveness check and key-material synchronization
//! - **Standard**: adds encrypt/decrypt/hash/sign/verify/key and random
//!   generation
//! - **Complete**: adds generic result-typed dispatch, key export/import,
//!   and asymmetric operations
//!
//! Every tier method has a total default implementation returning a
//! `NotImplemented` failure, so a narrow backing implementation exposed
//! through a wider tier degrades cleanly instead of crashing or hanging.
//!
//! # Architecture
//!
//! Requests flow through the following pipeline:
//! 1. Request arrives as an [`OperationRequest`] (directly or decoded from
//!    the transport wire shape)
//! 2. Shape validated per operation kind by [`SecurityOrchestrator`]
//! 3. Stored key references resolved against the key manager; material is
//!    copied out so no store lock is held during computation
//! 4. The operation runs on the crypto engine or key manager
//! 5. Typed errors are normalized to stable `(code, message)` failures
//!
//! [`OperationRequest`]: keyward_core::OperationRequest

pub mod capability;
pub mod orchestrator;
pub mod transport;

pub use capability::{
    BasicCapability, CapabilityProvider, CapabilityTier, CompleteCapability, StandardCapability,
};
pub use orchestrator::{ErrorReporter, SecurityOrchestrator};
pub use transport::{failure_from_transport, WireRequest, WireResult};
