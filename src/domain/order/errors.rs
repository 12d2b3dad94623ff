use rust_decimal::Decimal;

use crate::domain::money::CurrencyCode;
use super::value_objects::OrderStatus;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrderError {
    #[error("Cannot place an order from an empty cart")]
    EmptyCart,

    #[error("Payment does not match the order total: expected {expected}, charged {charged}")]
    PaymentMismatch { expected: Decimal, charged: Decimal },

    #[error("Payment currency does not match the order: expected {expected}, charged {charged}")]
    CurrencyMismatch { expected: CurrencyCode, charged: CurrencyCode },

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Aggregate not initialized")]
    NotInitialized,
}
