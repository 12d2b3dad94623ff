use chrono::{DateTime, Utc};

use crate::domain::cart::CartSnapshot;
use super::value_objects::{Address, OrderStatus, PaymentConfirmation, PaymentMethod};

// ============================================================================
// Order Commands - Represent user intent
// ============================================================================

/// Everything needed to turn a cart into an order
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub user_id: String,
    pub cart: CartSnapshot,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub payment_method: PaymentMethod,
    pub payment: PaymentConfirmation,
}

#[derive(Debug, Clone)]
pub enum OrderCommand {
    Transition {
        to: OrderStatus,
        reason: Option<String>,
    },
    ReviseDeliveryEstimate {
        estimated_delivery: DateTime<Utc>,
    },
}
