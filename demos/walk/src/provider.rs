//! Offline stand-in for a road-geometry service.

use sr_core::{GeoPoint, polyline_length_m};
use sr_route::{ProviderError, ProviderResult, ProviderRoute, RoadProvider};

/// Walks in straight lines between waypoints, emitting a vertex every
/// `spacing_m`.  Good enough to exercise the planner without a network.
pub struct StraightLineProvider {
    pub spacing_m: f64,
    pub speed_mps: f64,
}

impl Default for StraightLineProvider {
    fn default() -> Self {
        Self { spacing_m: 50.0, speed_mps: 1.4 }
    }
}

impl RoadProvider for StraightLineProvider {
    fn route(&self, waypoints: &[GeoPoint]) -> ProviderResult<ProviderRoute> {
        if waypoints.len() < 2 {
            return Err(ProviderError::TooFewWaypoints(waypoints.len()));
        }
        let mut points = vec![waypoints[0]];
        for w in waypoints.windows(2) {
            let steps = (w[0].distance_m(w[1]) / self.spacing_m).ceil().max(1.0) as usize;
            points.extend((1..=steps).map(|i| w[0].lerp(w[1], i as f64 / steps as f64)));
        }
        let distance_m = polyline_length_m(&points);
        Ok(ProviderRoute { points, distance_m, duration_s: distance_m / self.speed_mps })
    }
}
