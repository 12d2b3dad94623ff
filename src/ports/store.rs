use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::geo::GeoPoint;
use crate::domain::order::{Order, OrderStatus};
use crate::domain::tracking::{DeliveryAgent, TrackingUpdate};
use super::subscription::Subscription;
use super::UpstreamError;

/// Invoked with the order's full tracking feed, once on subscribe and again on every change
pub type TrackingCallback = Box<dyn Fn(Vec<TrackingUpdate>) + Send + Sync + 'static>;

/// Invoked with the agent's latest document, once on subscribe and again on every change
pub type AgentCallback = Box<dyn Fn(DeliveryAgent) + Send + Sync + 'static>;

/// Order documents. Orders are created once and never deleted.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create_order(&self, order: &Order) -> Result<(), UpstreamError>;

    async fn get_order(&self, order_id: Uuid) -> Result<Option<Order>, UpstreamError>;

    /// Newest first
    async fn list_orders(&self, user_id: &str) -> Result<Vec<Order>, UpstreamError>;

    async fn update_order_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), UpstreamError>;

    async fn update_estimated_delivery(
        &self,
        order_id: Uuid,
        estimated_delivery: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<(), UpstreamError>;
}

/// Tracking feed and courier documents, with live subscriptions
#[async_trait]
pub trait TrackingStore: Send + Sync {
    async fn append_tracking_update(&self, update: &TrackingUpdate) -> Result<(), UpstreamError>;

    /// Timestamp descending
    async fn tracking_updates(&self, order_id: Uuid) -> Result<Vec<TrackingUpdate>, UpstreamError>;

    /// The active agent whose assigned orders contain `order_id`
    async fn find_agent_for_order(&self, order_id: Uuid) -> Result<Option<DeliveryAgent>, UpstreamError>;

    async fn update_agent_location(
        &self,
        agent_id: Uuid,
        location: GeoPoint,
        at: DateTime<Utc>,
    ) -> Result<(), UpstreamError>;

    async fn subscribe_tracking_updates(
        &self,
        order_id: Uuid,
        callback: TrackingCallback,
    ) -> Result<Subscription, UpstreamError>;

    async fn subscribe_agent_location(
        &self,
        agent_id: Uuid,
        callback: AgentCallback,
    ) -> Result<Subscription, UpstreamError>;
}
