use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::geo::GeoPoint;
use crate::domain::order::OrderCommandHandler;
use crate::error::{CoreError, CoreResult};
use crate::metrics::Metrics;
use crate::ports::{dispatch, label_for, Geocoder, Notification, Notifier, TrackingStore};
use super::value_objects::TrackingUpdate;
use super::window::notification_title;

// ============================================================================
// Tracking Command Handler
// ============================================================================
//
// Recording an update:
// 1. the order must exist
// 2. a location without an address is labelled through the geocoder
// 3. the update is appended to the feed
// 4. the order status follows the feed (an out-of-order status is logged,
//    the feed keeps the update)
// 5. a carried estimate replaces the order's estimate
// 6. the customer is notified
//
// ============================================================================

pub struct TrackingCommandHandler {
    tracking: Arc<dyn TrackingStore>,
    orders: Arc<OrderCommandHandler>,
    geocoder: Arc<dyn Geocoder>,
    notifier: Arc<dyn Notifier>,
    metrics: Arc<Metrics>,
}

impl TrackingCommandHandler {
    pub fn new(
        tracking: Arc<dyn TrackingStore>,
        orders: Arc<OrderCommandHandler>,
        geocoder: Arc<dyn Geocoder>,
        notifier: Arc<dyn Notifier>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self { tracking, orders, geocoder, notifier, metrics }
    }

    pub async fn record_update(&self, mut update: TrackingUpdate) -> CoreResult<TrackingUpdate> {
        let order = self.orders.get_order(update.order_id).await?;

        if let Some(location) = update.location.as_mut() {
            if location.address.is_none() {
                location.address = Some(label_for(self.geocoder.as_ref(), location.point()).await);
            }
        }

        self.tracking.append_tracking_update(&update).await?;
        self.metrics.record_tracking_update(update.status.as_str());
        tracing::debug!(
            order_id = %update.order_id,
            update_id = %update.id,
            status = %update.status,
            "Tracking update recorded"
        );

        match self.orders.reconcile(order.id, update.status).await {
            Ok(_) => {}
            Err(CoreError::InvalidTransition { from, to }) => {
                tracing::warn!(order_id = %order.id, from = %from, to = %to, "Tracking status not applied to order");
            }
            Err(e) => return Err(e),
        }

        if let Some(estimated_delivery) = update.estimated_delivery {
            self.orders.revise_estimate(order.id, estimated_delivery).await?;
        }

        let notification = Notification::new(notification_title(update.status), update.message.clone())
            .with_data("orderId", update.order_id.to_string())
            .with_data("status", update.status.as_str())
            .with_data("type", "tracking_update");
        dispatch(self.notifier.as_ref(), &self.metrics, &order.user_id, notification).await;

        Ok(update)
    }

    /// Courier-side position report
    pub async fn report_agent_location(&self, agent_id: Uuid, location: GeoPoint) -> CoreResult<()> {
        self.tracking.update_agent_location(agent_id, location, Utc::now()).await?;
        tracing::debug!(agent_id = %agent_id, latitude = location.latitude, longitude = location.longitude, "Agent location updated");
        Ok(())
    }

    /// Timestamp descending
    pub async fn updates_for(&self, order_id: Uuid) -> CoreResult<Vec<TrackingUpdate>> {
        Ok(self.tracking.tracking_updates(order_id).await?)
    }
}
