//! Core types for the Keyward security operation service.
//!
//! This crate provides the fundamental types shared across the Keyward
//! ecosystem: the secure byte container used for all sensitive material,
//! the operation request/result DTOs consumed by the orchestrator and any
//! transport collaborator, and the layered error taxonomy with total
//! mappings between its domains.
//!
//! # Error Domains
//!
//! Keyward carries exactly three error domains:
//!
//! - [`CoreError`]: failures inside the crypto engine and key manager
//! - [`ProtocolError`]: failures at the capability-protocol surface
//! - [`TransportError`]: failures in the inter-process transport collaborator
//!
//! Every domain maps exhaustively to every other domain (see
//! [`error::mapping`]); an unmapped case is a compile error, not a runtime
//! surprise.

pub mod config;
pub mod error;
pub mod logging;
pub mod request;
pub mod types;

pub use config::{Config, LoggingConfig, ServiceConfig};
pub use error::{
    mapping, CoreError, CoreResult, ProtocolError, ProtocolResult, TransportError, TransportResult,
};
pub use request::{KeyRef, OperationKind, OperationRequest, OperationResult};
pub use types::SecureBuffer;
