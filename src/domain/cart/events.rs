use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event_sourcing::DomainEvent;
use super::value_objects::LineItem;

// ============================================================================
// Cart Events
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum CartEvent {
    /// A new distinct line item was appended
    ItemAdded(LineItem),
    /// An existing line item's quantity was overwritten (also used for merges)
    QuantityChanged { item_id: Uuid, quantity: i32 },
    ItemRemoved { item_id: Uuid },
    Cleared,
    DiscountApplied { amount: Decimal },
}

impl DomainEvent for CartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CartEvent::ItemAdded(_) => "CartItemAdded",
            CartEvent::QuantityChanged { .. } => "CartQuantityChanged",
            CartEvent::ItemRemoved { .. } => "CartItemRemoved",
            CartEvent::Cleared => "CartCleared",
            CartEvent::DiscountApplied { .. } => "CartDiscountApplied",
        }
    }
}
