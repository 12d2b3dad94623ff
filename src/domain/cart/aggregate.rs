use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::PricingConfig;
use crate::event_sourcing::{Aggregate, DomainEvent};
use super::commands::CartCommand;
use super::errors::CartError;
use super::events::CartEvent;
use super::totals::{compute_totals, CartTotals};
use super::value_objects::{LineItem, Product, Variations};

// ============================================================================
// Cart Aggregate - Domain Logic
// ============================================================================

#[derive(Debug, Clone)]
pub struct Cart {
    // Identity
    pub id: Uuid,
    pub version: i64,

    // Current State
    items: Vec<LineItem>,
    discount: Decimal,

    // Derived (recomputed on every applied event)
    totals: CartTotals,

    pricing: PricingConfig,
    pub updated_at: DateTime<Utc>,
}

/// Immutable copy of a cart's contents, taken at checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub items: Vec<LineItem>,
    pub totals: CartTotals,
}

impl Cart {
    pub fn new(pricing: PricingConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            version: 0,
            items: Vec::new(),
            discount: Decimal::ZERO,
            totals: CartTotals::zero(pricing.currency),
            pricing,
            updated_at: Utc::now(),
        }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn totals(&self) -> &CartTotals {
        &self.totals
    }

    /// Requested flat discount (the totals hold the portion actually applied)
    pub fn discount(&self) -> Decimal {
        self.discount
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, item_id: Uuid) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    pub fn find(&self, product_id: Uuid, variations: &Variations) -> Option<&LineItem> {
        self.items.iter().find(|item| item.matches(product_id, variations))
    }

    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            items: self.items.clone(),
            totals: self.totals.clone(),
        }
    }

    // ------------------------------------------------------------------------
    // Mutation API (each call goes through handle_command → apply_event)
    // ------------------------------------------------------------------------

    /// Add `quantity` units of a product/variation; returns the affected line item id
    pub fn add(&mut self, product: Product, quantity: i32, variations: Variations) -> Result<Uuid, CartError> {
        let product_id = product.id;
        self.run(CartCommand::AddItem { product, quantity, variations: variations.clone() })?;

        // the command either merged into or appended a matching line
        Ok(self
            .find(product_id, &variations)
            .map(|item| item.id)
            .unwrap_or_default())
    }

    /// Overwrite a line item's quantity; zero or less removes it. Unknown ids are a no-op.
    pub fn set_quantity(&mut self, item_id: Uuid, quantity: i32) -> Result<(), CartError> {
        self.run(CartCommand::SetQuantity { item_id, quantity }).map(|_| ())
    }

    /// Remove a line item; returns whether anything was removed
    pub fn remove(&mut self, item_id: Uuid) -> bool {
        self.run(CartCommand::RemoveItem { item_id })
            .map(|events| !events.is_empty())
            .unwrap_or(false)
    }

    pub fn clear(&mut self) {
        // Clear never fails validation
        let _ = self.run(CartCommand::Clear);
    }

    /// Replace the active flat discount; zero removes it
    pub fn apply_discount(&mut self, amount: Decimal) -> Result<(), CartError> {
        self.run(CartCommand::ApplyDiscount { amount }).map(|_| ())
    }

    fn run(&mut self, command: CartCommand) -> Result<Vec<CartEvent>, CartError> {
        let events = self.execute(command).map_err(|e| {
            tracing::debug!(cart_id = %self.id, error = %e, "Cart command rejected");
            e
        })?;

        for event in &events {
            tracing::debug!(
                cart_id = %self.id,
                event_type = event.event_type(),
                subtotal = %self.totals.subtotal,
                total = %self.totals.total,
                "Cart updated"
            );
        }

        Ok(events)
    }

    fn check_stock(product: &Product, requested: i64) -> Result<(), CartError> {
        if requested > i64::from(product.stock) {
            return Err(CartError::InsufficientStock {
                product: product.name.clone(),
                requested,
                available: product.stock,
            });
        }
        Ok(())
    }
}

// ============================================================================
// Aggregate Trait Implementation
// ============================================================================

impl Aggregate for Cart {
    type Event = CartEvent;
    type Command = CartCommand;
    type Error = CartError;

    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error> {
        match event {
            CartEvent::ItemAdded(item) => {
                self.items.push(item.clone());
            }
            CartEvent::QuantityChanged { item_id, quantity } => {
                if let Some(item) = self.items.iter_mut().find(|item| item.id == *item_id) {
                    item.quantity = *quantity;
                }
            }
            CartEvent::ItemRemoved { item_id } => {
                self.items.retain(|item| item.id != *item_id);
            }
            CartEvent::Cleared => {
                self.items.clear();
                self.discount = Decimal::ZERO;
            }
            CartEvent::DiscountApplied { amount } => {
                self.discount = *amount;
            }
        }

        self.totals = match event {
            // Nothing to sum
            CartEvent::Cleared => CartTotals::zero(self.pricing.currency),
            _ => compute_totals(&self.items, self.discount, &self.pricing),
        };

        self.version += 1;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            CartCommand::AddItem { product, quantity, variations } => {
                if *quantity <= 0 {
                    return Err(CartError::InvalidQuantity(*quantity));
                }

                let existing = self.find(product.id, variations);
                let requested = existing.map_or(0, |item| i64::from(item.quantity)) + i64::from(*quantity);
                Self::check_stock(product, requested)?;
                let requested = i32::try_from(requested).map_err(|_| CartError::InvalidQuantity(*quantity))?;

                match existing {
                    Some(item) => Ok(vec![CartEvent::QuantityChanged {
                        item_id: item.id,
                        quantity: requested,
                    }]),
                    None => Ok(vec![CartEvent::ItemAdded(LineItem {
                        id: Uuid::new_v4(),
                        product: product.clone(),
                        quantity: requested,
                        variations: variations.clone(),
                        added_at: Utc::now(),
                    })]),
                }
            }

            CartCommand::SetQuantity { item_id, quantity } => {
                let item = match self.item(*item_id) {
                    Some(item) => item,
                    None => return Ok(vec![]), // Unknown id is a no-op
                };

                if *quantity <= 0 {
                    return Ok(vec![CartEvent::ItemRemoved { item_id: *item_id }]);
                }

                Self::check_stock(&item.product, i64::from(*quantity))?;

                Ok(vec![CartEvent::QuantityChanged {
                    item_id: *item_id,
                    quantity: *quantity,
                }])
            }

            CartCommand::RemoveItem { item_id } => {
                if self.item(*item_id).is_none() {
                    return Ok(vec![]);
                }
                Ok(vec![CartEvent::ItemRemoved { item_id: *item_id }])
            }

            CartCommand::Clear => Ok(vec![CartEvent::Cleared]),

            CartCommand::ApplyDiscount { amount } => {
                if amount.is_sign_negative() && !amount.is_zero() {
                    return Err(CartError::NegativeDiscount(*amount));
                }
                Ok(vec![CartEvent::DiscountApplied { amount: *amount }])
            }
        }
    }

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
