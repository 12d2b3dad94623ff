use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::{watch, RwLock};
use uuid::Uuid;

use crate::domain::geo::GeoPoint;
use crate::domain::order::{Order, OrderStatus};
use crate::domain::tracking::{DeliveryAgent, TrackingUpdate};
use crate::ports::{AgentCallback, OrderStore, Subscription, TrackingCallback, TrackingStore, UpstreamError};

// ============================================================================
// In-Memory Document Store
// ============================================================================
//
// Orders are kept as JSON documents and patched field by field, the way a
// hosted document database stores them. Tracking feeds and courier documents
// sit behind `watch` channels so subscribers see every change.
//
// ============================================================================

const SERVICE: &str = "document store";

pub struct MemoryStore {
    orders: RwLock<HashMap<Uuid, Value>>,
    tracking: RwLock<HashMap<Uuid, watch::Sender<Vec<TrackingUpdate>>>>,
    agents: RwLock<HashMap<Uuid, watch::Sender<Option<DeliveryAgent>>>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            orders: RwLock::new(HashMap::new()),
            tracking: RwLock::new(HashMap::new()),
            agents: RwLock::new(HashMap::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Simulate an outage: every call fails with `UpstreamError::Unavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), UpstreamError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(UpstreamError::unavailable(SERVICE, "offline"));
        }
        Ok(())
    }

    /// Insert or replace a courier document
    pub async fn put_agent(&self, agent: DeliveryAgent) {
        let mut agents = self.agents.write().await;
        match agents.get(&agent.id) {
            Some(sender) => {
                sender.send_replace(Some(agent));
            }
            None => {
                let id = agent.id;
                agents.insert(id, watch::channel(Some(agent)).0);
            }
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn to_document<T: Serialize>(value: &T) -> Result<Value, UpstreamError> {
    serde_json::to_value(value).map_err(|e| UpstreamError::rejected(SERVICE, e.to_string()))
}

fn from_document<T: DeserializeOwned>(document: Value) -> Result<T, UpstreamError> {
    serde_json::from_value(document).map_err(|e| UpstreamError::rejected(SERVICE, e.to_string()))
}

/// Overwrite fields and bump the document version
fn patch(document: &mut Value, fields: Vec<(&str, Value)>) -> Result<(), UpstreamError> {
    let object = document
        .as_object_mut()
        .ok_or_else(|| UpstreamError::rejected(SERVICE, "order document is not an object"))?;

    for (key, value) in fields {
        object.insert(key.to_string(), value);
    }

    let version = object.get("version").and_then(Value::as_i64).unwrap_or(0);
    object.insert("version".to_string(), json!(version + 1));
    Ok(())
}

// ============================================================================
// OrderStore
// ============================================================================

#[async_trait]
impl OrderStore for MemoryStore {
    async fn create_order(&self, order: &Order) -> Result<(), UpstreamError> {
        self.check_available()?;

        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(UpstreamError::rejected(SERVICE, format!("order {} already exists", order.id)));
        }
        orders.insert(order.id, to_document(order)?);

        tracing::debug!(order_id = %order.id, "Order document created");
        Ok(())
    }

    async fn get_order(&self, order_id: Uuid) -> Result<Option<Order>, UpstreamError> {
        self.check_available()?;

        let orders = self.orders.read().await;
        orders.get(&order_id).cloned().map(from_document).transpose()
    }

    async fn list_orders(&self, user_id: &str) -> Result<Vec<Order>, UpstreamError> {
        self.check_available()?;

        let orders = self.orders.read().await;
        let mut found = orders
            .values()
            .filter(|doc| doc.get("user_id").and_then(Value::as_str) == Some(user_id))
            .cloned()
            .map(from_document::<Order>)
            .collect::<Result<Vec<_>, _>>()?;

        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn update_order_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), UpstreamError> {
        self.check_available()?;

        let mut orders = self.orders.write().await;
        let document = orders
            .get_mut(&order_id)
            .ok_or_else(|| UpstreamError::rejected(SERVICE, format!("no order {order_id}")))?;

        patch(
            document,
            vec![("status", to_document(&status)?), ("updated_at", to_document(&updated_at)?)],
        )
    }

    async fn update_estimated_delivery(
        &self,
        order_id: Uuid,
        estimated_delivery: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<(), UpstreamError> {
        self.check_available()?;

        let mut orders = self.orders.write().await;
        let document = orders
            .get_mut(&order_id)
            .ok_or_else(|| UpstreamError::rejected(SERVICE, format!("no order {order_id}")))?;

        patch(
            document,
            vec![
                ("estimated_delivery", to_document(&estimated_delivery)?),
                ("updated_at", to_document(&updated_at)?),
            ],
        )
    }
}

// ============================================================================
// TrackingStore
// ============================================================================

#[async_trait]
impl TrackingStore for MemoryStore {
    async fn append_tracking_update(&self, update: &TrackingUpdate) -> Result<(), UpstreamError> {
        self.check_available()?;

        let mut tracking = self.tracking.write().await;
        let feed = tracking
            .entry(update.order_id)
            .or_insert_with(|| watch::channel(Vec::new()).0);

        if feed.borrow().iter().any(|existing| existing.id == update.id) {
            return Err(UpstreamError::rejected(SERVICE, format!("tracking update {} already exists", update.id)));
        }

        // newest first; equal timestamps keep the latest append in front
        feed.send_modify(|updates| {
            updates.insert(0, update.clone());
            updates.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        });
        Ok(())
    }

    async fn tracking_updates(&self, order_id: Uuid) -> Result<Vec<TrackingUpdate>, UpstreamError> {
        self.check_available()?;

        let tracking = self.tracking.read().await;
        Ok(tracking
            .get(&order_id)
            .map(|feed| feed.borrow().clone())
            .unwrap_or_default())
    }

    async fn find_agent_for_order(&self, order_id: Uuid) -> Result<Option<DeliveryAgent>, UpstreamError> {
        self.check_available()?;

        let agents = self.agents.read().await;
        Ok(agents.values().find_map(|sender| {
            let agent = sender.borrow().clone();
            agent.filter(|agent| agent.is_delivering(order_id))
        }))
    }

    async fn update_agent_location(
        &self,
        agent_id: Uuid,
        location: GeoPoint,
        at: DateTime<Utc>,
    ) -> Result<(), UpstreamError> {
        self.check_available()?;

        let agents = self.agents.read().await;
        let sender = agents
            .get(&agent_id)
            .ok_or_else(|| UpstreamError::rejected(SERVICE, format!("no delivery agent {agent_id}")))?;

        sender.send_modify(|agent| {
            if let Some(agent) = agent {
                agent.current_location = location;
                agent.last_location_update = Some(at);
            }
        });
        Ok(())
    }

    async fn subscribe_tracking_updates(
        &self,
        order_id: Uuid,
        callback: TrackingCallback,
    ) -> Result<Subscription, UpstreamError> {
        self.check_available()?;

        let mut receiver = self
            .tracking
            .write()
            .await
            .entry(order_id)
            .or_insert_with(|| watch::channel(Vec::new()).0)
            .subscribe();

        let task = tokio::spawn(async move {
            loop {
                let batch = receiver.borrow_and_update().clone();
                callback(batch);

                if receiver.changed().await.is_err() {
                    break;
                }
            }
        });

        tracing::debug!(order_id = %order_id, "Tracking feed subscribed");
        Ok(Subscription::from_task(task))
    }

    async fn subscribe_agent_location(
        &self,
        agent_id: Uuid,
        callback: AgentCallback,
    ) -> Result<Subscription, UpstreamError> {
        self.check_available()?;

        let mut receiver = self
            .agents
            .write()
            .await
            .entry(agent_id)
            .or_insert_with(|| watch::channel(None).0)
            .subscribe();

        let task = tokio::spawn(async move {
            loop {
                // a missing document produces no callback
                let agent = receiver.borrow_and_update().clone();
                if let Some(agent) = agent {
                    callback(agent);
                }

                if receiver.changed().await.is_err() {
                    break;
                }
            }
        });

        tracing::debug!(agent_id = %agent_id, "Agent location subscribed");
        Ok(Subscription::from_task(task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tracking::VehicleType;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn agent(order_id: Uuid) -> DeliveryAgent {
        DeliveryAgent {
            id: Uuid::new_v4(),
            name: "Riley".to_string(),
            phone: "+1-555-0101".to_string(),
            vehicle_type: VehicleType::Motorcycle,
            current_location: GeoPoint::new(40.7505, -73.9934),
            is_active: true,
            assigned_orders: HashSet::from([order_id]),
            last_location_update: None,
        }
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn test_subscriber_sees_initial_and_later_batches() {
        let store = MemoryStore::new();
        let order_id = Uuid::new_v4();
        let batches = Arc::new(Mutex::new(Vec::new()));

        let sink = batches.clone();
        let subscription = store
            .subscribe_tracking_updates(order_id, Box::new(move |batch: Vec<TrackingUpdate>| sink.lock().unwrap().push(batch.len())))
            .await
            .unwrap();
        settle().await;

        store
            .append_tracking_update(&TrackingUpdate::new(order_id, OrderStatus::Confirmed, "Confirmed", Utc::now()))
            .await
            .unwrap();
        settle().await;

        assert_eq!(*batches.lock().unwrap(), vec![0, 1]);

        subscription.unsubscribe();
        store
            .append_tracking_update(&TrackingUpdate::new(order_id, OrderStatus::Shipped, "Shipped", Utc::now()))
            .await
            .unwrap();
        settle().await;

        assert_eq!(batches.lock().unwrap().len(), 2);
        assert_eq!(store.tracking_updates(order_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_tracking_update_is_rejected() {
        let store = MemoryStore::new();
        let update = TrackingUpdate::new(Uuid::new_v4(), OrderStatus::Confirmed, "Confirmed", Utc::now());

        store.append_tracking_update(&update).await.unwrap();
        assert!(store.append_tracking_update(&update).await.is_err());
    }

    #[tokio::test]
    async fn test_find_agent_requires_active_assignment() {
        let store = MemoryStore::new();
        let order_id = Uuid::new_v4();
        let mut inactive = agent(order_id);
        inactive.is_active = false;
        store.put_agent(inactive).await;
        store.put_agent(agent(Uuid::new_v4())).await;

        assert!(store.find_agent_for_order(order_id).await.unwrap().is_none());

        let assigned = agent(order_id);
        store.put_agent(assigned.clone()).await;
        assert_eq!(store.find_agent_for_order(order_id).await.unwrap(), Some(assigned));
    }

    #[tokio::test]
    async fn test_agent_location_updates_reach_subscribers() {
        let store = MemoryStore::new();
        let courier = agent(Uuid::new_v4());
        store.put_agent(courier.clone()).await;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _subscription = store
            .subscribe_agent_location(courier.id, Box::new(move |a: DeliveryAgent| sink.lock().unwrap().push(a.current_location)))
            .await
            .unwrap();
        settle().await;

        let moved = GeoPoint::new(40.7600, -73.9800);
        store.update_agent_location(courier.id, moved, Utc::now()).await.unwrap();
        settle().await;

        assert_eq!(*seen.lock().unwrap(), vec![courier.current_location, moved]);
    }

    #[tokio::test]
    async fn test_missing_agent_produces_no_callback() {
        let store = MemoryStore::new();
        let calls = Arc::new(Mutex::new(0));
        let sink = calls.clone();

        let _subscription = store
            .subscribe_agent_location(Uuid::new_v4(), Box::new(move |_: DeliveryAgent| *sink.lock().unwrap() += 1))
            .await
            .unwrap();
        settle().await;

        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_call() {
        let store = MemoryStore::new();
        store.set_unavailable(true);

        assert!(matches!(
            store.get_order(Uuid::new_v4()).await,
            Err(UpstreamError::Unavailable { .. })
        ));
        assert!(store.tracking_updates(Uuid::new_v4()).await.is_err());
    }
}
