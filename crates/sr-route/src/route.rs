//! Route records shared by the generator, ranker and planner.

use sr_core::{GeoPoint, polyline_length_m};

use crate::ProviderRoute;
use crate::rank::ExtendedRouteEvaluation;

// ── RoadType ──────────────────────────────────────────────────────────────────

/// How a candidate was produced, or what kind of streets it follows.
///
/// The ranker turns this into a score bonus; see
/// [`RoadTypeBonuses`](sr_core::RoadTypeBonuses).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RoadType {
    #[default]
    Direct,
    MajorLit,
    ViaSafe,
    Mixed,
    Minor,
}

impl RoadType {
    pub fn as_str(self) -> &'static str {
        match self {
            RoadType::Direct => "direct",
            RoadType::MajorLit => "major_lit",
            RoadType::ViaSafe => "via_safe",
            RoadType::Mixed => "mixed",
            RoadType::Minor => "minor",
        }
    }
}

impl std::fmt::Display for RoadType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── RouteData ─────────────────────────────────────────────────────────────────

/// A candidate route: alignment, totals and road-type tag.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteData {
    pub points: Vec<GeoPoint>,
    pub distance_m: f64,
    pub duration_s: f64,
    pub road_type: RoadType,
}

impl RouteData {
    pub fn new(points: Vec<GeoPoint>, distance_m: f64, duration_s: f64, road_type: RoadType) -> Self {
        Self { points, distance_m, duration_s, road_type }
    }

    /// Tag a provider answer.
    pub fn from_provider(route: ProviderRoute, road_type: RoadType) -> Self {
        Self::new(route.points, route.distance_m, route.duration_s, road_type)
    }

    /// A route over `points` whose distance is the polyline length and whose
    /// duration assumes `speed_mps`.
    pub fn from_points(points: Vec<GeoPoint>, speed_mps: f64, road_type: RoadType) -> Self {
        let distance_m = polyline_length_m(&points);
        let duration_s = if speed_mps > 0.0 { distance_m / speed_mps } else { 0.0 };
        Self::new(points, distance_m, duration_s, road_type)
    }
}

// ── RouteOption ───────────────────────────────────────────────────────────────

/// Why a route is offered to the traveller.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RouteKind {
    Direct,
    /// A perturbed route that ranked first overall.
    Safest,
    /// Any other perturbed route.
    Alternative,
    ViaSafePlace,
}

/// A ranked route ready for presentation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteOption {
    pub route: RouteData,
    pub evaluation: ExtendedRouteEvaluation,
    pub kind: RouteKind,
    pub description: String,
    pub passes_safe_place: bool,
}
