use async_trait::async_trait;

use crate::domain::geo::GeoPoint;
use super::UpstreamError;

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn reverse_geocode(&self, point: GeoPoint) -> Result<String, UpstreamError>;
}

/// Reverse geocode, falling back to the `"lat, lon"` label on failure or an empty answer
pub async fn label_for(geocoder: &dyn Geocoder, point: GeoPoint) -> String {
    match geocoder.reverse_geocode(point).await {
        Ok(label) if !label.trim().is_empty() => label.trim().to_string(),
        Ok(_) => point.to_string(),
        Err(e) => {
            tracing::warn!(error = %e, latitude = point.latitude, longitude = point.longitude, "Reverse geocoding failed");
            point.to_string()
        }
    }
}
