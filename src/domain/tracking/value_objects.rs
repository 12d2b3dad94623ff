use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::geo::GeoPoint;
use crate::domain::order::OrderStatus;

// ============================================================================
// Tracking Value Objects
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// Human-readable label, filled by reverse geocoding when missing
    pub address: Option<String>,
}

impl Location {
    pub fn new(point: GeoPoint) -> Self {
        Self {
            latitude: point.latitude,
            longitude: point.longitude,
            address: None,
        }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// One entry of an order's append-only tracking feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingUpdate {
    pub id: Uuid,
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub location: Option<Location>,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

impl TrackingUpdate {
    pub fn new(order_id: Uuid, status: OrderStatus, message: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            status,
            location: None,
            timestamp,
            message: message.into(),
            estimated_delivery: None,
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_estimated_delivery(mut self, at: DateTime<Utc>) -> Self {
        self.estimated_delivery = Some(at);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    Bicycle,
    Motorcycle,
    Car,
    Van,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAgent {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub vehicle_type: VehicleType,
    pub current_location: GeoPoint,
    pub is_active: bool,
    #[serde(default)]
    pub assigned_orders: HashSet<Uuid>,
    pub last_location_update: Option<DateTime<Utc>>,
}

impl DeliveryAgent {
    /// Active and assigned to `order_id`
    pub fn is_delivering(&self, order_id: Uuid) -> bool {
        self.is_active && self.assigned_orders.contains(&order_id)
    }
}
