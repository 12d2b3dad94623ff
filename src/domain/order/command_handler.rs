use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::domain::cart::Cart;
use crate::domain::money::{format_amount, to_minor_units, validate_payment_amount};
use crate::error::{CoreError, CoreResult};
use crate::event_sourcing::{Aggregate, DomainEvent};
use crate::metrics::Metrics;
use crate::ports::{dispatch, Notification, Notifier, OrderStore, PaymentOutcome, PaymentProcessor, UpstreamError};
use super::aggregate::Order;
use super::commands::{OrderCommand, PlaceOrder};
use super::errors::OrderError;
use super::events::OrderEvent;
use super::value_objects::{Address, OrderStatus, PaymentConfirmation, PaymentMethod};

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Orchestrates: Command → Aggregate → Events → Order Store
//
// Checkout: payment intent → confirmation → Order::place → create_order →
// cart cleared → notification. Any failure before create_order succeeds
// leaves the cart as it was.
//
// ============================================================================

/// Who is checking out and how they pay
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub user_id: String,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub payment_method: PaymentMethod,
}

pub struct OrderCommandHandler {
    orders: Arc<dyn OrderStore>,
    payments: Arc<dyn PaymentProcessor>,
    notifier: Arc<dyn Notifier>,
    config: AppConfig,
    metrics: Arc<Metrics>,
}

impl OrderCommandHandler {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        payments: Arc<dyn PaymentProcessor>,
        notifier: Arc<dyn Notifier>,
        config: AppConfig,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self { orders, payments, notifier, config, metrics }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Turn the cart into a confirmed, persisted `pending` order.
    ///
    /// Not idempotent: callers must not retry a checkout whose payment was
    /// confirmed.
    pub async fn checkout(&self, cart: &mut Cart, request: CheckoutRequest) -> CoreResult<Order> {
        let started = Instant::now();
        let result = self.place_order(cart, request).await;

        let outcome = match &result {
            Ok(_) => "succeeded",
            Err(CoreError::Upstream(UpstreamError::PaymentDeclined(_))) => "declined",
            Err(CoreError::Validation(_)) => "rejected",
            Err(_) => "failed",
        };
        self.metrics.record_checkout(outcome, started.elapsed().as_secs_f64());

        result
    }

    async fn place_order(&self, cart: &mut Cart, request: CheckoutRequest) -> CoreResult<Order> {
        if cart.is_empty() {
            return Err(OrderError::EmptyCart.into());
        }

        let snapshot = cart.snapshot();
        let total = snapshot.totals.total;
        let currency = snapshot.totals.currency;
        validate_payment_amount(total)?;
        let amount_minor = to_minor_units(total)?;

        let intent = self.payments.create_payment_intent(amount_minor, currency).await?;
        tracing::debug!(intent_id = %intent.id, amount_minor, currency = %currency, "Payment intent created");

        let confirmed = match self.payments.confirm_payment(&intent, &request.payment_method).await? {
            PaymentOutcome::Succeeded(confirmed) => confirmed,
            PaymentOutcome::Declined { reason } => {
                tracing::warn!(intent_id = %intent.id, reason = %reason, "Payment declined");
                return Err(UpstreamError::PaymentDeclined(reason).into());
            }
        };

        let order = Order::place(
            PlaceOrder {
                user_id: request.user_id,
                cart: snapshot,
                shipping_address: request.shipping_address,
                billing_address: request.billing_address,
                payment_method: request.payment_method,
                payment: PaymentConfirmation {
                    intent_id: confirmed.id,
                    amount_minor: confirmed.amount_minor,
                    currency: confirmed.currency,
                },
            },
            &self.config.delivery,
            Utc::now(),
        )?;

        if let Err(e) = self.orders.create_order(&order).await {
            // the charge went through; refunding it is the caller's call
            tracing::error!(
                order_id = %order.id,
                intent_id = %order.payment_intent_id,
                error = %e,
                "Order could not be stored after payment was confirmed"
            );
            return Err(e.into());
        }

        cart.clear();

        tracing::info!(
            order_id = %order.id,
            user_id = %order.user_id,
            tracking_number = %order.tracking_number,
            total = %total,
            "Order placed"
        );

        let notification = Notification::new(
            "🛍️ Order Placed",
            format!(
                "Your order {} for {} has been placed.",
                order.tracking_number,
                format_amount(total, currency)
            ),
        )
        .with_data("orderId", order.id.to_string())
        .with_data("type", "order_placed");
        dispatch(self.notifier.as_ref(), &self.metrics, &order.user_id, notification).await;

        Ok(order)
    }

    pub async fn get_order(&self, order_id: Uuid) -> CoreResult<Order> {
        self.orders
            .get_order(order_id)
            .await?
            .ok_or_else(|| CoreError::order_not_found(order_id))
    }

    /// Newest first
    pub async fn list_orders(&self, user_id: &str) -> CoreResult<Vec<Order>> {
        Ok(self.orders.list_orders(user_id).await?)
    }

    pub async fn transition(&self, order_id: Uuid, to: OrderStatus, reason: Option<String>) -> CoreResult<Order> {
        self.handle(order_id, OrderCommand::Transition { to, reason }).await
    }

    /// Flips status only; refunds are orchestrated elsewhere
    pub async fn cancel(&self, order_id: Uuid, reason: Option<String>) -> CoreResult<Order> {
        self.transition(order_id, OrderStatus::Cancelled, reason).await
    }

    /// Advisory; a closed order keeps its last estimate
    pub async fn revise_estimate(&self, order_id: Uuid, estimated_delivery: DateTime<Utc>) -> CoreResult<Order> {
        self.handle(order_id, OrderCommand::ReviseDeliveryEstimate { estimated_delivery }).await
    }

    /// Bring the order to the status the tracking feed reports
    pub async fn reconcile(&self, order_id: Uuid, feed_status: OrderStatus) -> CoreResult<Order> {
        let mut order = self.get_order(order_id).await?;
        let events = order.reconcile_status(feed_status)?;
        self.persist(&order, &events).await?;
        Ok(order)
    }

    /// Load, run the command, persist what it emitted
    async fn handle(&self, order_id: Uuid, command: OrderCommand) -> CoreResult<Order> {
        let mut order = self.get_order(order_id).await?;

        let events = order.execute(command).map_err(|e| {
            tracing::debug!(order_id = %order_id, status = %order.status, error = %e, "Order command rejected");
            e
        })?;

        self.persist(&order, &events).await?;
        Ok(order)
    }

    async fn persist(&self, order: &Order, events: &[OrderEvent]) -> CoreResult<()> {
        for event in events {
            match event {
                OrderEvent::Placed(_) => {}
                OrderEvent::StatusChanged(e) => {
                    self.orders.update_order_status(order.id, e.to, e.changed_at).await?;
                    self.metrics.record_transition(e.from.as_str(), e.to.as_str());
                    tracing::info!(order_id = %order.id, from = %e.from, to = %e.to, "Order status changed");
                }
                OrderEvent::DeliveryEstimateRevised(e) => {
                    self.orders
                        .update_estimated_delivery(order.id, e.estimated_delivery, e.revised_at)
                        .await?;
                    self.metrics.record_estimate_revision();
                    tracing::debug!(
                        order_id = %order.id,
                        estimated_delivery = %e.estimated_delivery,
                        event_type = event.event_type(),
                        "Delivery estimate revised"
                    );
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
