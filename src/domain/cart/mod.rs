// ============================================================================
// Cart Domain - Line Items and Pricing
// ============================================================================
//
// This module contains ALL cart-specific code:
// - Value objects (Product, LineItem, Variations)
// - Totals engine (CartTotals, compute_totals)
// - Events (ItemAdded, QuantityChanged, etc.)
// - Commands (AddItem, SetQuantity, etc.)
// - Errors (CartError enum)
// - Aggregate (Cart with business logic)
//
// ============================================================================

pub mod value_objects;
pub mod totals;
pub mod events;
pub mod commands;
pub mod errors;
pub mod aggregate;

// Re-export for convenience
pub use value_objects::*;
pub use totals::*;
pub use events::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
