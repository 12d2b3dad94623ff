use rust_decimal::Decimal;

// ============================================================================
// Cart Business Rule Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CartError {
    #[error("Invalid item quantity: {0}")]
    InvalidQuantity(i32),

    #[error("Insufficient stock for {product}: requested {requested}, available {available}")]
    InsufficientStock {
        product: String,
        requested: i64,
        available: i32,
    },

    #[error("Discount cannot be negative: {0}")]
    NegativeDiscount(Decimal),
}
