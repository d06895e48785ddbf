//! Candidate generation: alternatives, safe-place detours and SOS legs.
//!
//! # Alternatives
//!
//! [`generate`](RouteAlternativesGenerator::generate) asks the provider for
//! the direct route and for two perturbed routes forced through the
//! start→end midpoint shifted `alternative_offset_m` to either side
//! (perpendicular to the start→end bearing):
//!
//! ```text
//!            via (+90°)
//!               ●
//!   start ●─────┼─────● end
//!               ●
//!            via (−90°)
//! ```
//!
//! Providers often snap both perturbed requests back onto the same streets,
//! so every candidate is checked against the routes already kept and dropped
//! when it is a near duplicate.
//!
//! # Duplicates
//!
//! Two polylines are compared after resampling each to `duplicate_samples`
//! points spaced evenly by arc length, so routes with different vertex
//! counts are still comparable.  A candidate is a duplicate when more than
//! `duplicate_ratio` of the aligned samples lie within
//! `duplicate_proximity_m` of each other.
//!
//! # Failure isolation
//!
//! Each provider request stands alone.  A failed request drops that
//! candidate only; if every request fails one last direct request is made
//! before giving up with an empty list.

use sr_core::{GeoPoint, RouteConfig, SafePlace, resample_polyline};
use sr_risk::RiskModel;

use crate::provider::fetch;
use crate::{RoadProvider, RoadType, RouteData};

/// Route to the nearest safe place of any kind.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SosRoute {
    pub place: SafePlace,
    /// Great-circle distance from the request point to `place`.
    pub straight_line_m: f64,
    pub route: RouteData,
}

/// Produces candidate [`RouteData`] via a [`RoadProvider`].
pub struct RouteAlternativesGenerator<'a> {
    model: &'a RiskModel,
    provider: &'a dyn RoadProvider,
    config: &'a RouteConfig,
}

impl<'a> RouteAlternativesGenerator<'a> {
    pub fn new(model: &'a RiskModel, provider: &'a dyn RoadProvider, config: &'a RouteConfig) -> Self {
        Self { model, provider, config }
    }

    /// Direct route first (when the provider returns one), then up to
    /// `max_alternatives - 1` distinct perturbed routes.
    pub fn generate(&self, start: GeoPoint, end: GeoPoint) -> Vec<RouteData> {
        let bearing = start.bearing_deg(end);
        let mid = start.midpoint(end);
        let offset = self.config.alternative_offset_m;

        let mut requests: Vec<(Vec<GeoPoint>, RoadType)> = vec![(vec![start, end], RoadType::Direct)];
        for side in [90.0, -90.0] {
            let via = mid.offset_m(bearing + side, offset);
            requests.push((vec![start, via, end], RoadType::Mixed));
        }

        let mut kept: Vec<RouteData> = Vec::with_capacity(self.config.max_alternatives);
        let mut any_succeeded = false;

        for (waypoints, road_type) in requests {
            if kept.len() >= self.config.max_alternatives {
                break;
            }
            let Ok(route) = fetch(self.provider, &waypoints) else {
                continue;
            };
            any_succeeded = true;
            if let Some(i) = self.find_duplicate_route(&route.points, &kept) {
                log::debug!("alternatives: dropping {road_type} candidate, duplicates route {i}");
                continue;
            }
            kept.push(RouteData::from_provider(route, road_type));
        }

        if !any_succeeded {
            log::warn!("alternatives: every request failed, retrying direct route once");
            return match fetch(self.provider, &[start, end]) {
                Ok(route) => vec![RouteData::from_provider(route, RoadType::Direct)],
                Err(_) => Vec::new(),
            };
        }

        log::debug!("alternatives: {} distinct route(s) from {start} to {end}", kept.len());
        kept
    }

    /// Whether `candidate` follows substantially the same path as `existing`.
    ///
    /// Empty polylines are never duplicates of anything.
    pub fn is_duplicate(&self, candidate: &[GeoPoint], existing: &[GeoPoint]) -> bool {
        if candidate.is_empty() || existing.is_empty() {
            return false;
        }
        let n = self.config.duplicate_samples.max(2);
        let a = resample_polyline(candidate, n);
        let b = resample_polyline(existing, n);
        let close = a
            .iter()
            .zip(&b)
            .filter(|(p, q)| p.distance_m(**q) <= self.config.duplicate_proximity_m)
            .count();
        close as f64 / n as f64 > self.config.duplicate_ratio
    }

    /// Index of the first route in `routes` that `candidate` duplicates.
    pub fn find_duplicate_route(&self, candidate: &[GeoPoint], routes: &[RouteData]) -> Option<usize> {
        routes.iter().position(|r| self.is_duplicate(candidate, &r.points))
    }

    /// A route from `start` to `end` forced through a police post or
    /// hospital, or `None` when no eligible place fits the detour budget
    /// (`direct_distance_m × detour_budget`, measured as the great-circle
    /// sum of both legs) with both provider legs succeeding.
    ///
    /// Places are tried in dataset order; the first that works wins.
    pub fn route_via_safe_place(
        &self,
        start: GeoPoint,
        end: GeoPoint,
        direct_distance_m: f64,
    ) -> Option<RouteData> {
        let budget = direct_distance_m * self.config.detour_budget;

        for place in self.model.safe_places().iter().filter(|p| p.kind.is_emergency()) {
            let detour = start.distance_m(place.point) + place.point.distance_m(end);
            if detour > budget {
                continue;
            }
            let Ok(first) = fetch(self.provider, &[start, place.point]) else {
                continue;
            };
            let Ok(second) = fetch(self.provider, &[place.point, end]) else {
                continue;
            };

            let mut points = first.points;
            let skip = usize::from(points.last() == second.points.first());
            points.extend_from_slice(&second.points[skip..]);

            log::debug!("detour via {} ({:.0} m of {budget:.0} m budget)", place.label(), detour);
            return Some(RouteData::new(
                points,
                first.distance_m + second.distance_m,
                first.duration_s + second.duration_s,
                RoadType::ViaSafe,
            ));
        }

        log::debug!("no safe-place detour within {budget:.0} m");
        None
    }

    /// One direct leg from `start` to the nearest safe place of any kind.
    ///
    /// `None` when there are no safe places or the provider fails.
    pub fn sos_route(&self, start: GeoPoint) -> Option<SosRoute> {
        let (place, straight_line_m) = self.model.nearest_safe_place(start, |_| true)?;
        let route = fetch(self.provider, &[start, place.point]).ok()?;
        log::info!("sos: heading to {} {:.0} m away", place.label(), straight_line_m);
        Some(SosRoute {
            place: place.clone(),
            straight_line_m,
            route: RouteData::from_provider(route, RoadType::Direct),
        })
    }
}
