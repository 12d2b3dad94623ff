use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::DeliveryConfig;

// ============================================================================
// Distance / ETA Estimator
// ============================================================================

/// Mean Earth radius used by the haversine formula
pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// `"lat, lon"` to four decimals, the fallback label when reverse geocoding fails
impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Great-circle distance in kilometres
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + from.latitude.to_radians().cos() * to.latitude.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Constant-speed travel model plus a fixed handling buffer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EtaEstimator {
    pub average_speed_kmh: f64,
    pub buffer: Duration,
}

impl EtaEstimator {
    pub fn new(average_speed_kmh: f64, buffer: Duration) -> Self {
        Self { average_speed_kmh, buffer }
    }

    pub fn from_config(config: &DeliveryConfig) -> Self {
        Self::new(config.average_speed_kmh, config.buffer)
    }

    /// Travel time only, rounded to whole seconds
    pub fn travel_time(&self, from: GeoPoint, to: GeoPoint) -> Duration {
        let hours = haversine_km(from, to) / self.average_speed_kmh;
        Duration::seconds((hours * 3600.0).round() as i64)
    }

    /// now + distance / speed + buffer
    pub fn estimate(&self, from: GeoPoint, to: GeoPoint, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.travel_time(from, to) + self.buffer
    }
}

impl Default for EtaEstimator {
    fn default() -> Self {
        Self::from_config(&DeliveryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 3, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_identical_points_have_zero_distance() {
        let p = GeoPoint::new(40.7128, -74.0060);
        assert_eq!(haversine_km(p, p), 0.0);
        assert_eq!(EtaEstimator::default().estimate(p, p, now()), now() + Duration::minutes(30));
    }

    #[test]
    fn test_distance_is_symmetric() {
        let nyc = GeoPoint::new(40.7128, -74.0060);
        let la = GeoPoint::new(34.0522, -118.2437);
        assert!((haversine_km(nyc, la) - haversine_km(la, nyc)).abs() < 1e-9);
    }

    #[test]
    fn test_known_distance() {
        // New York to Los Angeles is roughly 3936 km
        let nyc = GeoPoint::new(40.7128, -74.0060);
        let la = GeoPoint::new(34.0522, -118.2437);
        let d = haversine_km(nyc, la);
        assert!((d - 3936.0).abs() < 10.0, "distance was {d}");
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let d = haversine_km(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0));
        assert!((d - 111.19).abs() < 0.01, "distance was {d}");
    }

    #[test]
    fn test_eta_adds_travel_time_and_buffer() {
        // one degree of latitude is ~111.19 km, ~3h42m at 30 km/h
        let estimator = EtaEstimator::default();
        let eta = estimator.estimate(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 0.0), now());
        let elapsed = eta - now();

        assert!(elapsed > Duration::minutes(30 + 3 * 60 + 40));
        assert!(elapsed < Duration::minutes(30 + 3 * 60 + 45));
    }

    #[test]
    fn test_faster_courier_arrives_sooner() {
        let from = GeoPoint::new(51.5074, -0.1278);
        let to = GeoPoint::new(51.4545, -2.5879);
        let slow = EtaEstimator::new(30.0, Duration::minutes(30)).estimate(from, to, now());
        let fast = EtaEstimator::new(60.0, Duration::minutes(30)).estimate(from, to, now());
        assert!(fast < slow);
    }

    #[test]
    fn test_coordinate_label() {
        assert_eq!(GeoPoint::new(40.712776, -74.005974).to_string(), "40.7128, -74.0060");
    }
}
