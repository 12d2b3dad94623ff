use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::PricingConfig;
use crate::domain::money::{round_money, CurrencyCode};
use super::value_objects::LineItem;

// ============================================================================
// Totals Engine
// ============================================================================
//
// Pure function of (line items, discount, pricing rules). The cart calls it
// after every mutation and never patches totals incrementally.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartTotals {
    /// Σ quantity
    pub total_items: i64,
    /// Σ (unit price × quantity), before discount
    pub gross_subtotal: Decimal,
    /// Portion of the requested discount actually applied (never more than the gross subtotal)
    pub discount: Decimal,
    /// Gross subtotal minus discount, floored at zero
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub currency: CurrencyCode,
}

impl CartTotals {
    pub fn zero(currency: CurrencyCode) -> Self {
        Self {
            total_items: 0,
            gross_subtotal: Decimal::ZERO,
            discount: Decimal::ZERO,
            subtotal: Decimal::ZERO,
            tax: Decimal::ZERO,
            shipping: Decimal::ZERO,
            total: Decimal::ZERO,
            currency,
        }
    }

    pub fn qualifies_for_free_shipping(&self) -> bool {
        self.shipping.is_zero()
    }
}

/// Compute cart totals.
///
/// An empty item list yields all-zero totals, shipping included. This is the
/// one exemption from the shipping rule: a cart with nothing to ship charges no
/// shipping, so emptying a cart by removal and `clear()` report the same totals.
pub fn compute_totals(items: &[LineItem], discount: Decimal, pricing: &PricingConfig) -> CartTotals {
    if items.is_empty() {
        return CartTotals::zero(pricing.currency);
    }

    let total_items: i64 = items.iter().map(|item| i64::from(item.quantity)).sum();
    let gross_subtotal: Decimal = items.iter().map(LineItem::line_total).sum();

    let discount = discount.max(Decimal::ZERO).min(gross_subtotal);
    let subtotal = (gross_subtotal - discount).max(Decimal::ZERO);

    let tax = round_money(subtotal * pricing.tax_rate);
    let shipping = shipping_for(subtotal, pricing);
    let total = subtotal + tax + shipping;

    CartTotals {
        total_items,
        gross_subtotal,
        discount,
        subtotal,
        tax,
        shipping,
        total,
        currency: pricing.currency,
    }
}

/// Free at or above the threshold, flat fee below it
pub fn shipping_for(subtotal: Decimal, pricing: &PricingConfig) -> Decimal {
    if subtotal >= pricing.free_shipping_threshold {
        Decimal::ZERO
    } else {
        pricing.shipping_cost
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
