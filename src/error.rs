use uuid::Uuid;

use crate::domain::cart::CartError;
use crate::domain::money::MoneyError;
use crate::domain::order::{OrderError, OrderStatus};
use crate::ports::UpstreamError;

// ============================================================================
// Crate Error Taxonomy
// ============================================================================
//
// Domain enums (CartError, OrderError, MoneyError) fold into CoreError so
// callers match on four kinds of failure instead of every rule.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    /// Rejected before any mutation
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    pub fn order_not_found(order_id: Uuid) -> Self {
        CoreError::NotFound { entity: "order", id: order_id.to_string() }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::Validation(_))
    }
}

impl From<CartError> for CoreError {
    fn from(e: CartError) -> Self {
        CoreError::Validation(e.to_string())
    }
}

impl From<MoneyError> for CoreError {
    fn from(e: MoneyError) -> Self {
        CoreError::Validation(e.to_string())
    }
}

impl From<OrderError> for CoreError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::InvalidTransition { from, to } => CoreError::InvalidTransition { from, to },
            other => CoreError::Validation(other.to_string()),
        }
    }
}
