use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::domain::geo::{EtaEstimator, GeoPoint};
use crate::domain::order::{Order, OrderStatus};
use crate::ports::{Subscription, TrackingStore};
use super::feed::TrackingFeed;
use super::value_objects::{DeliveryAgent, TrackingUpdate};
use super::window::DeliveryWindow;

// ============================================================================
// Tracking Session
// ============================================================================
//
// Owns the two live feeds behind an order-tracking screen:
// - the order's tracking updates, folded into a TrackingFeed
// - the assigned courier's position, used to refine the ETA
//
// Both callbacks share one mutex-guarded state. Once the session is stopped
// (or dropped) the state is marked closed before the subscriptions are
// aborted, so a callback already in flight is discarded.
//
// ============================================================================

struct SessionState {
    feed: TrackingFeed,
    agent: Option<DeliveryAgent>,
    /// Last status known from the order document, shown until the feed has entries
    known_status: OrderStatus,
    closed: bool,
}

type SharedState = Arc<Mutex<SessionState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, SessionState> {
    // callbacks never leave the state half-written, so a poisoned lock is still usable
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What the tracking screen renders
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingView {
    pub status: OrderStatus,
    /// Newest first
    pub updates: Vec<TrackingUpdate>,
    pub route: Vec<GeoPoint>,
    pub map_center: Option<GeoPoint>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub agent: Option<DeliveryAgent>,
    pub live: bool,
}

impl TrackingView {
    pub fn delivery_window(&self, now: DateTime<Utc>) -> Option<DeliveryWindow> {
        self.estimated_delivery
            .map(|estimate| DeliveryWindow::from_estimate(estimate, now))
    }
}

pub struct TrackingSession {
    state: SharedState,
    order_feed: Subscription,
    agent_feed: Option<Subscription>,
}

impl TrackingSession {
    /// Open both feeds for `order`.
    ///
    /// Subscription failures are logged and leave the session without live
    /// updates; the order's stored status stays available.
    pub async fn start(tracking: &dyn TrackingStore, order: &Order, estimator: EtaEstimator) -> Self {
        let mut feed = TrackingFeed::new(order.id);
        feed.refine_estimate(order.estimated_delivery, order.updated_at);

        let state: SharedState = Arc::new(Mutex::new(SessionState {
            feed,
            agent: None,
            known_status: order.status,
            closed: false,
        }));

        let order_state = state.clone();
        let order_feed = match tracking
            .subscribe_tracking_updates(
                order.id,
                Box::new(move |batch: Vec<TrackingUpdate>| {
                    let mut state = lock(&order_state);
                    if state.closed {
                        return;
                    }
                    state.feed.merge(batch);
                }),
            )
            .await
        {
            Ok(subscription) => subscription,
            Err(e) => {
                tracing::warn!(order_id = %order.id, error = %e, "Tracking feed unavailable");
                Subscription::inactive()
            }
        };

        let agent_feed = match tracking.find_agent_for_order(order.id).await {
            Ok(Some(agent)) => Some(Self::follow_agent(tracking, &state, order, &agent, estimator).await),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(order_id = %order.id, error = %e, "Delivery agent lookup failed");
                None
            }
        };

        tracing::debug!(order_id = %order.id, has_agent = agent_feed.is_some(), "Tracking session started");

        Self { state, order_feed, agent_feed }
    }

    async fn follow_agent(
        tracking: &dyn TrackingStore,
        state: &SharedState,
        order: &Order,
        agent: &DeliveryAgent,
        estimator: EtaEstimator,
    ) -> Subscription {
        let destination = order.shipping_address.point();
        let agent_state = state.clone();

        let callback = Box::new(move |agent: DeliveryAgent| {
            let mut state = lock(&agent_state);
            if state.closed {
                return;
            }

            if let Some(destination) = destination {
                let now = Utc::now();
                let eta = estimator.estimate(agent.current_location, destination, now);
                state.feed.refine_estimate(eta, now);
            }
            state.agent = Some(agent);
        });

        match tracking.subscribe_agent_location(agent.id, callback).await {
            Ok(subscription) => subscription,
            Err(e) => {
                tracing::warn!(agent_id = %agent.id, error = %e, "Agent location feed unavailable");
                Subscription::inactive()
            }
        }
    }

    pub fn view(&self) -> TrackingView {
        let state = lock(&self.state);

        TrackingView {
            status: state.feed.current_status().unwrap_or(state.known_status),
            updates: state.feed.updates().cloned().collect(),
            route: state.feed.route(),
            map_center: state
                .feed
                .map_center()
                .or_else(|| state.agent.as_ref().map(|agent| agent.current_location)),
            estimated_delivery: state.feed.estimated_delivery(),
            agent: state.agent.clone(),
            live: self.order_feed.is_active(),
        }
    }

    pub fn has_agent(&self) -> bool {
        self.agent_feed.is_some()
    }

    /// Tear down both feeds
    pub fn stop(self) {}
}

impl Drop for TrackingSession {
    fn drop(&mut self) {
        lock(&self.state).closed = true;
        // subscriptions abort their tasks as the fields drop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::config::DeliveryConfig;
    use crate::domain::order::aggregate::tests::place_command;
    use crate::domain::tracking::value_objects::{Location, VehicleType};
    use chrono::Duration;
    use std::collections::HashSet;
    use uuid::Uuid;

    fn order() -> Order {
        Order::place(place_command("user-1"), &DeliveryConfig::default(), Utc::now()).unwrap()
    }

    fn courier(order_id: Uuid, at: GeoPoint) -> DeliveryAgent {
        DeliveryAgent {
            id: Uuid::new_v4(),
            name: "Jordan".to_string(),
            phone: "+44 20 7946 0000".to_string(),
            vehicle_type: VehicleType::Bicycle,
            current_location: at,
            is_active: true,
            assigned_orders: HashSet::from([order_id]),
            last_location_update: None,
        }
    }

    async fn settle() {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn test_session_folds_live_updates() {
        let store = MemoryStore::new();
        let order = order();
        let session = TrackingSession::start(&store, &order, EtaEstimator::default()).await;
        settle().await;

        assert_eq!(session.view().status, OrderStatus::Pending);
        assert!(session.view().live);

        let now = Utc::now();
        store
            .append_tracking_update(
                &TrackingUpdate::new(order.id, OrderStatus::Confirmed, "Confirmed", now - Duration::hours(2))
                    .with_location(Location::new(GeoPoint::new(51.50, -0.12))),
            )
            .await
            .unwrap();
        store
            .append_tracking_update(
                &TrackingUpdate::new(order.id, OrderStatus::Shipped, "Shipped", now - Duration::hours(1))
                    .with_location(Location::new(GeoPoint::new(51.51, -0.14))),
            )
            .await
            .unwrap();
        settle().await;

        let view = session.view();
        assert_eq!(view.status, OrderStatus::Shipped);
        assert_eq!(view.updates.len(), 2);
        assert_eq!(view.route, vec![GeoPoint::new(51.50, -0.12), GeoPoint::new(51.51, -0.14)]);
        assert_eq!(view.map_center, Some(GeoPoint::new(51.51, -0.14)));
    }

    #[tokio::test]
    async fn test_existing_feed_with_tied_timestamps_shows_latest_append() {
        let store = MemoryStore::new();
        let order = order();
        let at = Utc::now() - Duration::minutes(10);
        store
            .append_tracking_update(&TrackingUpdate::new(order.id, OrderStatus::Confirmed, "first", at))
            .await
            .unwrap();
        store
            .append_tracking_update(&TrackingUpdate::new(order.id, OrderStatus::Processing, "second", at))
            .await
            .unwrap();

        let session = TrackingSession::start(&store, &order, EtaEstimator::default()).await;
        settle().await;

        let view = session.view();
        let messages: Vec<_> = view.updates.iter().map(|u| u.message.as_str()).collect();
        assert_eq!(messages, vec!["second", "first"]);
        assert_eq!(view.status, OrderStatus::Processing);
    }

    #[tokio::test]
    async fn test_agent_position_refines_estimate() {
        let store = MemoryStore::new();
        let order = order();
        let destination = order.shipping_address.point().unwrap();
        let agent = courier(order.id, GeoPoint::new(51.5074, -0.1278));
        store.put_agent(agent.clone()).await;

        let session = TrackingSession::start(&store, &order, EtaEstimator::default()).await;
        settle().await;

        let view = session.view();
        assert!(session.has_agent());
        assert_eq!(view.agent.as_ref().map(|a| a.id), Some(agent.id));
        let eta = view.estimated_delivery.unwrap();
        // a few km across town: well under a day, at least the buffer
        assert!(eta < order.estimated_delivery);
        assert!(eta >= Utc::now() + Duration::minutes(29));

        // courier reaches the door: travel time drops to zero
        store.update_agent_location(agent.id, destination, Utc::now()).await.unwrap();
        settle().await;
        let arriving = session.view().estimated_delivery.unwrap();
        assert!(arriving <= eta);
        assert!(arriving <= Utc::now() + Duration::minutes(30));
    }

    #[tokio::test]
    async fn test_stopped_session_ignores_late_updates() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let order = order();
        let session = TrackingSession::start(store.as_ref(), &order, EtaEstimator::default()).await;
        settle().await;
        let state = session.state.clone();

        session.stop();
        store
            .append_tracking_update(&TrackingUpdate::new(order.id, OrderStatus::Confirmed, "Confirmed", Utc::now()))
            .await
            .unwrap();
        settle().await;

        let state = lock(&state);
        assert!(state.closed);
        assert!(state.feed.is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_store_degrades_to_known_status() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        let order = order();

        let session = TrackingSession::start(&store, &order, EtaEstimator::default()).await;

        let view = session.view();
        assert!(!view.live);
        assert!(!session.has_agent());
        assert_eq!(view.status, OrderStatus::Pending);
        assert_eq!(view.estimated_delivery, Some(order.estimated_delivery));
    }
}
