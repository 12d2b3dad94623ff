// ============================================================================
// Order Domain - Lifecycle State Machine
// ============================================================================
//
// This module contains ALL Order-specific code:
// - Value objects (OrderStatus, Address, PaymentMethod)
// - Events (OrderPlaced, OrderStatusChanged, DeliveryEstimateRevised)
// - Commands (PlaceOrder, Transition, ReviseDeliveryEstimate)
// - Errors (OrderError enum)
// - Aggregate (Order with business logic)
// - Command Handler (OrderCommandHandler)
//
// ============================================================================

pub mod value_objects;
pub mod events;
pub mod commands;
pub mod errors;
pub mod aggregate;
pub mod command_handler;

// Re-export for convenience
pub use value_objects::*;
pub use events::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
pub use command_handler::*;
