// ============================================================================
// Event Sourcing Infrastructure
// ============================================================================
//
// Generic command → event → apply plumbing shared by the cart and the order.
// Domain-specific code is in src/domain/
//
// ============================================================================

mod core;

pub use self::core::*;
