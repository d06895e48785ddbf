//! The road-geometry provider boundary.
//!
//! The engine never computes street geometry itself.  Given two or more
//! waypoints, an external service returns the polyline a traveller would
//! actually walk, with its length and duration.  [`RoadProvider`] is that
//! boundary; HTTP clients, offline routers and test fakes all plug in here.
//!
//! Any `Fn(&[GeoPoint]) -> ProviderResult<ProviderRoute> + Send + Sync`
//! closure is a provider, which keeps tests and demos free of boilerplate.

use sr_core::GeoPoint;

use crate::{ProviderError, ProviderResult};

/// Raw provider answer: the alignment plus its totals.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProviderRoute {
    pub points: Vec<GeoPoint>,
    pub distance_m: f64,
    pub duration_s: f64,
}

/// Pluggable road-geometry service.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so a single provider can serve a
/// planner shared across threads.  Timeouts and retries belong to the
/// implementation; the engine calls each request exactly once.
pub trait RoadProvider: Send + Sync {
    /// Route through `waypoints` in order (first = origin, last =
    /// destination).
    fn route(&self, waypoints: &[GeoPoint]) -> ProviderResult<ProviderRoute>;
}

impl<F> RoadProvider for F
where
    F: Fn(&[GeoPoint]) -> ProviderResult<ProviderRoute> + Send + Sync,
{
    fn route(&self, waypoints: &[GeoPoint]) -> ProviderResult<ProviderRoute> {
        self(waypoints)
    }
}

/// Call `provider` and apply the engine's acceptance rules: at least two
/// waypoints going in, a non-empty polyline coming out.
///
/// Failures are logged at `warn` and returned; callers decide whether to
/// fall back.
pub(crate) fn fetch(provider: &dyn RoadProvider, waypoints: &[GeoPoint]) -> ProviderResult<ProviderRoute> {
    if waypoints.len() < 2 {
        return Err(ProviderError::TooFewWaypoints(waypoints.len()));
    }
    let result = provider.route(waypoints).and_then(|route| {
        if route.points.is_empty() {
            Err(ProviderError::EmptyRoute)
        } else {
            Ok(route)
        }
    });
    match &result {
        Ok(route) => log::debug!(
            "provider: {} waypoint(s) -> {} point(s), {:.0} m",
            waypoints.len(),
            route.points.len(),
            route.distance_m
        ),
        Err(e) => log::warn!("provider request via {} waypoint(s) failed: {e}", waypoints.len()),
    }
    result
}
