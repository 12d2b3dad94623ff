use rust_decimal::Decimal;
use uuid::Uuid;

use super::value_objects::{Product, Variations};

// ============================================================================
// Cart Commands - Represent user intent
// ============================================================================

#[derive(Debug, Clone)]
pub enum CartCommand {
    AddItem {
        product: Product,
        quantity: i32,
        variations: Variations,
    },
    SetQuantity {
        item_id: Uuid,
        quantity: i32,
    },
    RemoveItem {
        item_id: Uuid,
    },
    Clear,
    ApplyDiscount {
        amount: Decimal,
    },
}
