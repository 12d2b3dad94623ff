use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Cart Value Objects
// ============================================================================

/// Selected variations (e.g. `size -> M`, `color -> red`).
///
/// A `BTreeMap` keeps the keys sorted, so two selections with the same pairs
/// compare equal no matter what order the UI produced them in.
pub type Variations = BTreeMap<String, String>;

/// Product data copied into the cart at add-time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    /// Unit price in major currency units
    pub price: Decimal,
    /// Units available when this snapshot was taken
    pub stock: i32,
}

impl Product {
    pub fn new(name: impl Into<String>, sku: impl Into<String>, price: Decimal, stock: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            sku: sku.into(),
            price,
            stock,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: Uuid,
    pub product: Product,
    pub quantity: i32,
    #[serde(default)]
    pub variations: Variations,
    pub added_at: DateTime<Utc>,
}

impl LineItem {
    /// Same product and same variation selection
    pub fn matches(&self, product_id: Uuid, variations: &Variations) -> bool {
        self.product.id == product_id && &self.variations == variations
    }

    /// Unit price × quantity
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
