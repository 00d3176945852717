//! Shared helpers for the integration suite.

use std::sync::Arc;

use keyward_service::{CapabilityProvider, CapabilityTier, SecurityOrchestrator};

/// Initialize tracing once for the whole suite; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt::try_init();
}

/// Fresh in-memory orchestrator.
pub fn orchestrator() -> Arc<SecurityOrchestrator> {
    init_tracing();
    Arc::new(SecurityOrchestrator::in_memory())
}

/// Provider at the given tier over a fresh in-memory orchestrator.
pub fn provider(tier: CapabilityTier) -> CapabilityProvider {
    CapabilityProvider::new(orchestrator(), tier)
}
