// ============================================================================
// Adapters - Implementations of the ports
// ============================================================================
//
// Only in-memory implementations ship with the crate. They back the demo
// binary and every handler test; production adapters (document database,
// payment processor SDK, push service) live with the host application.
//
// ============================================================================

pub mod memory;
