// ============================================================================
// Event Sourcing Core - Generic Abstractions
// ============================================================================
//
// Key Principles:
// - No domain-specific code (no Cart, Order, TrackingUpdate, etc.)
// - Generic over aggregate types
//
// ============================================================================

pub mod aggregate;
pub mod event;

pub use aggregate::{Aggregate, EventSourced};
pub use event::DomainEvent;
