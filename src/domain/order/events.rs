use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::cart::{CartTotals, LineItem};
use crate::event_sourcing::DomainEvent;
use super::value_objects::{Address, OrderStatus, PaymentMethod};

// ============================================================================
// Order Events - Domain Events for Order Aggregate
// ============================================================================

/// Order Event - Union type for all order events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    Placed(OrderPlaced),
    StatusChanged(OrderStatusChanged),
    DeliveryEstimateRevised(DeliveryEstimateRevised),
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::Placed(_) => "OrderPlaced",
            OrderEvent::StatusChanged(_) => "OrderStatusChanged",
            OrderEvent::DeliveryEstimateRevised(_) => "DeliveryEstimateRevised",
        }
    }
}

// ============================================================================
// Individual Event Types
// ============================================================================

/// Order Placed - Initial event, snapshots the cart at checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPlaced {
    pub order_id: Uuid,
    pub user_id: String,
    pub items: Vec<LineItem>,
    pub totals: CartTotals,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub payment_method: PaymentMethod,
    pub payment_intent_id: String,
    pub tracking_number: String,
    pub estimated_delivery: DateTime<Utc>,
    pub placed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStatusChanged {
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub reason: Option<String>,
    pub changed_at: DateTime<Utc>,
}

/// Advisory replacement of the delivery estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryEstimateRevised {
    pub estimated_delivery: DateTime<Utc>,
    pub revised_at: DateTime<Utc>,
}
