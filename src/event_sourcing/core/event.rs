use serde::{Deserialize, Serialize};

// ============================================================================
// Domain Event Trait
// ============================================================================

/// All domain events implement this trait so the handlers can label logs
/// and metrics without matching on every variant themselves.
pub trait DomainEvent: Serialize + for<'de> Deserialize<'de> + Clone + Send + Sync {
    /// Stable name of the concrete event, e.g. `"OrderStatusChanged"`
    fn event_type(&self) -> &'static str;

    fn event_version(&self) -> i32 {
        1
    }
}

// ============================================================================
// Tests
// ============================================================================
