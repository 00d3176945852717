//! Integration tests for the Keyward security operation service
//!
//! This test suite validates:
//! - End-to-end operation dispatch through the orchestrator
//! - Capability tier gating and default-body degradation
//! - Key rotation atomicity under concurrent callers
//! - The hex/JSON wire contract at the transport boundary
//! - Stable failure codes across every layer

pub mod test_utils;

#[cfg(test)]
mod capability_tier_tests;

#[cfg(test)]
mod end_to_end_tests;

#[cfg(test)]
mod rotation_tests;

#[cfg(test)]
mod wire_boundary_tests;
