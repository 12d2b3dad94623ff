// ============================================================================
// Tracking Domain - Order feed, courier position, delivery estimates
// ============================================================================
//
// - Value objects (TrackingUpdate, Location, DeliveryAgent)
// - Feed reducer (TrackingFeed)
// - Delivery window & relative time formatting
// - Session (live subscriptions for one order screen)
// - Command handler (TrackingCommandHandler)
//
// ============================================================================

pub mod value_objects;
pub mod feed;
pub mod window;
pub mod session;
pub mod command_handler;

// Re-export for convenience
pub use value_objects::*;
pub use feed::*;
pub use window::*;
pub use session::*;
pub use command_handler::*;
