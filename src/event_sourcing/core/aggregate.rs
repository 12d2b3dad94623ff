use uuid::Uuid;
use anyhow::Result;

use super::event::DomainEvent;

// ============================================================================
// Aggregate Root Pattern
// ============================================================================
//
// Key Principles:
// 1. Commands are validated against current state before emitting events
// 2. Events represent facts that have already happened
// 3. All state changes flow through apply_event
// 4. Derived fields are recomputed inside apply_event, never patched by callers
//
// ============================================================================

/// Generic Aggregate trait - the cart and the order both implement this
///
/// Type Parameters:
/// - `Event`: The domain event type for this aggregate
/// - `Command`: The command type for this aggregate
/// - `Error`: The error type for business rule violations
pub trait Aggregate: Sized + Send + Sync {
    type Event: DomainEvent;
    type Command;
    type Error;

    /// Apply an event to update state
    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error>;

    /// Handle command and emit events (business logic, no mutation)
    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    /// Get aggregate ID
    fn aggregate_id(&self) -> Uuid;

    /// Get current version (number of applied events)
    fn version(&self) -> i64;

    /// Validate a command and apply the events it produced.
    ///
    /// A rejected command leaves the aggregate untouched. An accepted command
    /// that produces no events (idempotent no-op) returns an empty list.
    fn execute(&mut self, command: Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        let events = self.handle_command(&command)?;

        for event in &events {
            self.apply_event(event)?;
        }

        Ok(events)
    }
}

/// Aggregates whose existence starts with an event rather than an empty state
pub trait EventSourced: Aggregate {
    /// Create new aggregate from first event
    fn apply_first_event(event: &Self::Event) -> Result<Self, Self::Error>;

    /// Load aggregate from event history (reconstruct from events)
    fn load_from_events(events: &[Self::Event]) -> Result<Self>
    where
        Self::Error: std::fmt::Display,
    {
        let (first, rest) = match events.split_first() {
            Some(split) => split,
            None => anyhow::bail!("No events to load"),
        };

        let mut aggregate = Self::apply_first_event(first)
            .map_err(|e| anyhow::anyhow!("Failed to apply first event: {}", e))?;

        for event in rest {
            aggregate.apply_event(event)
                .map_err(|e| anyhow::anyhow!("Failed to apply event: {}", e))?;
        }

        Ok(aggregate)
    }
}
