use async_trait::async_trait;

use crate::domain::geo::{haversine_km, GeoPoint};
use crate::ports::{Geocoder, UpstreamError};

/// Points closer than this resolve to the same label
const MATCH_RADIUS_KM: f64 = 0.5;

/// Reverse geocoder over a fixed list of labelled points
#[derive(Debug, Clone, Default)]
pub struct StaticGeocoder {
    places: Vec<(GeoPoint, String)>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(mut self, point: GeoPoint, label: impl Into<String>) -> Self {
        self.places.push((point, label.into()));
        self
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn reverse_geocode(&self, point: GeoPoint) -> Result<String, UpstreamError> {
        self.places
            .iter()
            .map(|(place, label)| (haversine_km(*place, point), label))
            .filter(|(distance, _)| *distance <= MATCH_RADIUS_KM)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, label)| label.clone())
            .ok_or_else(|| UpstreamError::rejected("geocoder", format!("no results for {point}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::label_for;

    #[tokio::test]
    async fn test_nearby_point_resolves() {
        let geocoder = StaticGeocoder::new()
            .with_place(GeoPoint::new(40.7128, -74.0060), "Warehouse, New York, NY")
            .with_place(GeoPoint::new(40.7589, -73.9851), "Fulfillment Center, New York, NY");

        let label = geocoder.reverse_geocode(GeoPoint::new(40.7129, -74.0061)).await.unwrap();
        assert_eq!(label, "Warehouse, New York, NY");
    }

    #[tokio::test]
    async fn test_unknown_point_falls_back_to_coordinates() {
        let geocoder = StaticGeocoder::new();
        let point = GeoPoint::new(51.507351, -0.127758);

        assert!(geocoder.reverse_geocode(point).await.is_err());
        assert_eq!(label_for(&geocoder, point).await, "51.5074, -0.1278");
    }
}
