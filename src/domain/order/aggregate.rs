use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::DeliveryConfig;
use crate::domain::cart::{CartTotals, LineItem};
use crate::domain::money::{from_minor_units, round_money};
use crate::event_sourcing::{Aggregate, EventSourced};
use super::commands::{OrderCommand, PlaceOrder};
use super::errors::OrderError;
use super::events::*;
use super::value_objects::{Address, OrderStatus, PaymentMethod};

// ============================================================================
// Order Aggregate - Domain Logic
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    // Identity
    pub id: Uuid,
    pub version: i64,

    // Snapshot taken at checkout (never changes)
    pub user_id: String,
    pub items: Vec<LineItem>,
    pub totals: CartTotals,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub payment_method: PaymentMethod,
    pub payment_intent_id: String,
    pub tracking_number: String,

    // Current State (derived from events)
    pub status: OrderStatus,
    pub estimated_delivery: DateTime<Utc>,

    // Audit Trail
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Create a `pending` order from a cart snapshot and a confirmed payment
    pub fn place(command: PlaceOrder, delivery: &DeliveryConfig, now: DateTime<Utc>) -> Result<Self, OrderError> {
        if command.cart.items.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        if command.payment.currency != command.cart.totals.currency {
            return Err(OrderError::CurrencyMismatch {
                expected: command.cart.totals.currency,
                charged: command.payment.currency,
            });
        }

        let expected = round_money(command.cart.totals.total);
        let charged = from_minor_units(command.payment.amount_minor);
        if expected != charged {
            return Err(OrderError::PaymentMismatch { expected, charged });
        }

        let event = OrderEvent::Placed(OrderPlaced {
            order_id: Uuid::new_v4(),
            user_id: command.user_id,
            items: command.cart.items,
            totals: command.cart.totals,
            shipping_address: command.shipping_address,
            billing_address: command.billing_address,
            payment_method: command.payment_method,
            payment_intent_id: command.payment.intent_id,
            tracking_number: generate_tracking_number(now),
            estimated_delivery: now + delivery.lead_time,
            placed_at: now,
        });

        Self::apply_first_event(&event)
    }

    /// Move to the status reported by the tracking feed.
    ///
    /// Already at that status: no events. Otherwise the usual transition rule applies.
    pub fn reconcile_status(&mut self, feed_status: OrderStatus) -> Result<Vec<OrderEvent>, OrderError> {
        if self.status == feed_status {
            return Ok(vec![]);
        }

        self.execute(OrderCommand::Transition {
            to: feed_status,
            reason: Some("tracking update".to_string()),
        })
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// `EC` + last 8 digits of the epoch-millisecond clock + 3 random digits
pub fn generate_tracking_number(now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis().rem_euclid(100_000_000);
    let suffix: u16 = rand::thread_rng().gen_range(0..1000);
    format!("EC{millis:08}{suffix:03}")
}

// ============================================================================
// Aggregate Trait Implementation
// ============================================================================

impl Aggregate for Order {
    type Event = OrderEvent;
    type Command = OrderCommand;
    type Error = OrderError;

    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error> {
        match event {
            OrderEvent::Placed(_) => {
                // First event already applied
                return Ok(());
            }
            OrderEvent::StatusChanged(e) => {
                self.status = e.to;
                self.updated_at = e.changed_at;
            }
            OrderEvent::DeliveryEstimateRevised(e) => {
                self.estimated_delivery = e.estimated_delivery;
                self.updated_at = e.revised_at;
            }
        }

        self.version += 1;
        Ok(())
    }

    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            OrderCommand::Transition { to, reason } => {
                if !self.status.can_transition_to(*to) {
                    return Err(OrderError::InvalidTransition {
                        from: self.status,
                        to: *to,
                    });
                }

                Ok(vec![OrderEvent::StatusChanged(OrderStatusChanged {
                    from: self.status,
                    to: *to,
                    reason: reason.clone(),
                    changed_at: Utc::now(),
                })])
            }

            OrderCommand::ReviseDeliveryEstimate { estimated_delivery } => {
                // Advisory: nothing to revise once the order is closed
                if self.is_terminal() || *estimated_delivery == self.estimated_delivery {
                    return Ok(vec![]);
                }

                Ok(vec![OrderEvent::DeliveryEstimateRevised(DeliveryEstimateRevised {
                    estimated_delivery: *estimated_delivery,
                    revised_at: Utc::now(),
                })])
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

impl EventSourced for Order {
    fn apply_first_event(event: &Self::Event) -> Result<Self, Self::Error> {
        match event {
            OrderEvent::Placed(e) => Ok(Self {
                id: e.order_id,
                version: 1,
                user_id: e.user_id.clone(),
                items: e.items.clone(),
                totals: e.totals.clone(),
                shipping_address: e.shipping_address.clone(),
                billing_address: e.billing_address.clone(),
                payment_method: e.payment_method.clone(),
                payment_intent_id: e.payment_intent_id.clone(),
                tracking_number: e.tracking_number.clone(),
                status: OrderStatus::Pending,
                estimated_delivery: e.estimated_delivery,
                created_at: e.placed_at,
                updated_at: e.placed_at,
            }),
            _ => Err(OrderError::NotInitialized),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::PricingConfig;
    use crate::domain::cart::{Cart, Product, Variations};
    use crate::domain::money::{to_minor_units, CurrencyCode};
    use crate::domain::order::value_objects::{PaymentConfirmation, PaymentMethodType};
    use chrono::{Duration, TimeZone};

    pub(crate) fn address() -> Address {
        Address {
            id: Uuid::new_v4(),
            street: "221B Baker St".to_string(),
            city: "London".to_string(),
            state: "LDN".to_string(),
            zip_code: "NW1 6XE".to_string(),
            country: "UK".to_string(),
            is_default: true,
            latitude: Some(51.5238),
            longitude: Some(-0.1586),
        }
    }

    pub(crate) fn card() -> PaymentMethod {
        PaymentMethod {
            id: "pm_card_visa".to_string(),
            method_type: PaymentMethodType::Card,
            last4: Some("4242".to_string()),
            brand: Some("visa".to_string()),
            expiry_month: Some(12),
            expiry_year: Some(2030),
            is_default: true,
        }
    }

    pub(crate) fn place_command(user_id: &str) -> PlaceOrder {
        let mut cart = Cart::new(PricingConfig::default());
        cart.add(Product::new("Lamp", "LMP-1", rust_decimal::Decimal::new(5000, 2), 10), 1, Variations::new())
            .unwrap();
        let snapshot = cart.snapshot();

        PlaceOrder {
            user_id: user_id.to_string(),
            payment: PaymentConfirmation {
                intent_id: "pi_123".to_string(),
                amount_minor: to_minor_units(snapshot.totals.total).unwrap(),
                currency: snapshot.totals.currency,
            },
            cart: snapshot,
            shipping_address: address(),
            billing_address: address(),
            payment_method: card(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 3, 9, 30, 0).unwrap()
    }

    fn placed() -> Order {
        Order::place(place_command("user-1"), &DeliveryConfig::default(), now()).unwrap()
    }

    #[test]
    fn test_place_creates_pending_order() {
        let order = placed();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.user_id, "user-1");
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.totals.total, rust_decimal::Decimal::new(54, 0));
        assert_eq!(order.estimated_delivery, now() + Duration::days(7));
        assert_eq!(order.created_at, now());
        assert_eq!(order.payment_intent_id, "pi_123");
        assert_eq!(order.version, 1);
    }

    #[test]
    fn test_place_rejects_empty_cart() {
        let mut command = place_command("user-1");
        command.cart = Cart::new(PricingConfig::default()).snapshot();

        assert_eq!(
            Order::place(command, &DeliveryConfig::default(), now()),
            Err(OrderError::EmptyCart)
        );
    }

    #[test]
    fn test_place_rejects_mismatched_payment() {
        let mut command = place_command("user-1");
        command.payment.amount_minor -= 1;

        assert!(matches!(
            Order::place(command, &DeliveryConfig::default(), now()),
            Err(OrderError::PaymentMismatch { .. })
        ));
    }

    #[test]
    fn test_place_rejects_payment_in_another_currency() {
        let mut command = place_command("user-1");
        command.payment.currency = CurrencyCode::EUR;

        assert_eq!(
            Order::place(command, &DeliveryConfig::default(), now()),
            Err(OrderError::CurrencyMismatch {
                expected: CurrencyCode::USD,
                charged: CurrencyCode::EUR,
            })
        );
    }

    #[test]
    fn test_tracking_number_format() {
        let number = generate_tracking_number(now());

        assert_eq!(number.len(), 13);
        assert!(number.starts_with("EC"));
        assert!(number[2..].chars().all(|c| c.is_ascii_digit()));
        let millis = format!("{:08}", now().timestamp_millis() % 100_000_000);
        assert_eq!(&number[2..10], millis);
    }

    #[test]
    fn test_full_happy_path() {
        let mut order = placed();
        for next in [
            OrderStatus::Confirmed,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ] {
            order.execute(OrderCommand::Transition { to: next, reason: None }).unwrap();
            assert_eq!(order.status, next);
        }
        assert!(order.is_terminal());
        assert_eq!(order.version, 5);
    }

    #[test]
    fn test_invalid_transition_leaves_state_unchanged() {
        let mut order = placed();
        order.execute(OrderCommand::Transition { to: OrderStatus::Shipped, reason: None }).unwrap();
        let before = order.clone();

        let result = order.execute(OrderCommand::Transition { to: OrderStatus::Confirmed, reason: None });

        assert_eq!(
            result,
            Err(OrderError::InvalidTransition {
                from: OrderStatus::Shipped,
                to: OrderStatus::Confirmed
            })
        );
        assert_eq!(order, before);
    }

    #[test]
    fn test_shipped_order_can_be_cancelled() {
        let mut order = placed();
        order.execute(OrderCommand::Transition { to: OrderStatus::Shipped, reason: None }).unwrap();
        order
            .execute(OrderCommand::Transition {
                to: OrderStatus::Cancelled,
                reason: Some("customer request".to_string()),
            })
            .unwrap();

        assert_eq!(order.status, OrderStatus::Cancelled);
        assert!(order
            .execute(OrderCommand::Transition { to: OrderStatus::Delivered, reason: None })
            .is_err());
    }

    #[test]
    fn test_reconcile_status_is_idempotent() {
        let mut order = placed();

        assert!(order.reconcile_status(OrderStatus::Pending).unwrap().is_empty());
        assert_eq!(order.reconcile_status(OrderStatus::Processing).unwrap().len(), 1);
        assert!(order.reconcile_status(OrderStatus::Processing).unwrap().is_empty());
        assert!(order.reconcile_status(OrderStatus::Confirmed).is_err());
        assert_eq!(order.status, OrderStatus::Processing);
    }

    #[test]
    fn test_revise_estimate_is_noop_on_terminal_order() {
        let mut order = placed();
        let revised = now() + Duration::hours(3);

        let events = order
            .execute(OrderCommand::ReviseDeliveryEstimate { estimated_delivery: revised })
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(order.estimated_delivery, revised);

        order.execute(OrderCommand::Transition { to: OrderStatus::Cancelled, reason: None }).unwrap();
        let events = order
            .execute(OrderCommand::ReviseDeliveryEstimate { estimated_delivery: now() })
            .unwrap();
        assert!(events.is_empty());
        assert_eq!(order.estimated_delivery, revised);
    }

    #[test]
    fn test_load_from_events_replays_history() {
        let mut order = placed();
        let placed_event = OrderEvent::Placed(OrderPlaced {
            order_id: order.id,
            user_id: order.user_id.clone(),
            items: order.items.clone(),
            totals: order.totals.clone(),
            shipping_address: order.shipping_address.clone(),
            billing_address: order.billing_address.clone(),
            payment_method: order.payment_method.clone(),
            payment_intent_id: order.payment_intent_id.clone(),
            tracking_number: order.tracking_number.clone(),
            estimated_delivery: order.estimated_delivery,
            placed_at: order.created_at,
        });

        let mut history = vec![placed_event];
        history.extend(order.execute(OrderCommand::Transition { to: OrderStatus::Confirmed, reason: None }).unwrap());
        history.extend(order.execute(OrderCommand::Transition { to: OrderStatus::Shipped, reason: None }).unwrap());

        let replayed = Order::load_from_events(&history).unwrap();
        assert_eq!(replayed, order);
    }

    #[test]
    fn test_load_from_events_requires_placed_first() {
        let event = OrderEvent::StatusChanged(OrderStatusChanged {
            from: OrderStatus::Pending,
            to: OrderStatus::Confirmed,
            reason: None,
            changed_at: now(),
        });
        assert!(Order::load_from_events(&[event]).is_err());
        assert!(Order::load_from_events(&[]).is_err());
    }
}
