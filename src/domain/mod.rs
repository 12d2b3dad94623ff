// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Each aggregate has its own subdirectory with:
// - Value objects
// - Events
// - Commands
// - Errors
// - Aggregate implementation
// - Command handler (where the aggregate talks to collaborators)
//
// money and geo hold the pure math shared by the aggregates.
//
// ============================================================================

pub mod money;
pub mod geo;
pub mod cart;
pub mod order;
pub mod tracking;
