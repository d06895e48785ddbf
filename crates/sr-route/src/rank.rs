//! Contextual re-scoring and ordering of candidate routes.
//!
//! The base [`RouteEvaluation`] only sees the risk surface.  The ranker
//! rewards context the surface does not capture:
//!
//! | Bonus     | Rule                                                          |
//! |-----------|---------------------------------------------------------------|
//! | light     | `light_bonus` per segment passing within `light_proximity_m` of a lit street |
//! | crowd     | `crowd_bonus` per route point inside a crowded area           |
//! | road type | [`RoadTypeBonuses`](sr_core::RoadTypeBonuses) entry for the route's tag |
//!
//! ```text
//! adjusted = max(0, avg_risk − light − crowd − road)
//! total    = adjusted × ranking_risk_weight + km × ranking_distance_weight
//! ```
//!
//! Routes are sorted ascending by `total`; ties keep input order.

use chrono::{DateTime, Utc};

use sr_core::{CrowdedArea, RouteConfig};
use sr_risk::RiskModel;

use crate::{RoadType, RouteData, RouteEvaluation, RouteEvaluator};

/// A [`RouteEvaluation`] with contextual adjustments applied.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtendedRouteEvaluation {
    pub base: RouteEvaluation,
    pub adjusted_risk: f64,
    pub total_score: f64,
    /// Share of segments near a lit street, 0–100.
    pub light_coverage_pct: f64,
    /// Share of route points inside a crowded area, 0–100.
    pub crowd_coverage_pct: f64,
    pub road_quality: String,
}

pub struct RouteRanker<'a> {
    model: &'a RiskModel,
    config: &'a RouteConfig,
    crowded_areas: &'a [CrowdedArea],
}

impl<'a> RouteRanker<'a> {
    pub fn new(model: &'a RiskModel, config: &'a RouteConfig, crowded_areas: &'a [CrowdedArea]) -> Self {
        Self { model, config, crowded_areas }
    }

    /// Score a single route.
    pub fn evaluate(&self, route: &RouteData, now: DateTime<Utc>) -> ExtendedRouteEvaluation {
        let cfg = self.config;
        let base = RouteEvaluator::new(self.model, cfg).evaluate(&route.points, now);

        let lit = base
            .segments
            .iter()
            .filter(|s| {
                self.model
                    .segment_distance_to_light(s.start, s.end, cfg.light_proximity_m)
                    <= cfg.light_proximity_m
            })
            .count();
        let crowded = route
            .points
            .iter()
            .filter(|p| self.crowded_areas.iter().any(|a| a.contains(**p)))
            .count();

        let light_coverage_pct = percent(lit, base.segments.len());
        let crowd_coverage_pct = percent(crowded, route.points.len());

        let bonus = lit as f64 * cfg.light_bonus
            + crowded as f64 * cfg.crowd_bonus
            + road_bonus(route.road_type, cfg);
        let adjusted_risk = (base.avg_risk - bonus).max(0.0);
        let total_score = adjusted_risk * cfg.ranking_risk_weight
            + (route.distance_m / 1000.0) * cfg.ranking_distance_weight;

        ExtendedRouteEvaluation {
            road_quality: road_quality(route.road_type, light_coverage_pct).to_owned(),
            base,
            adjusted_risk,
            total_score,
            light_coverage_pct,
            crowd_coverage_pct,
        }
    }

    /// Score every route and sort best-first.
    pub fn rank(&self, routes: Vec<RouteData>, now: DateTime<Utc>) -> Vec<(RouteData, ExtendedRouteEvaluation)> {
        let mut ranked: Vec<(RouteData, ExtendedRouteEvaluation)> = routes
            .into_iter()
            .map(|r| {
                let eval = self.evaluate(&r, now);
                (r, eval)
            })
            .collect();
        ranked.sort_by(|a, b| a.1.total_score.total_cmp(&b.1.total_score));
        if let Some((route, eval)) = ranked.first() {
            log::debug!(
                "ranked {} route(s); best is {} at {:.2}",
                ranked.len(),
                route.road_type,
                eval.total_score
            );
        }
        ranked
    }
}

fn road_bonus(road_type: RoadType, cfg: &RouteConfig) -> f64 {
    let b = &cfg.road_bonuses;
    match road_type {
        RoadType::Direct => b.direct,
        RoadType::MajorLit => b.major_lit,
        RoadType::ViaSafe => b.via_safe,
        RoadType::Mixed => b.mixed,
        RoadType::Minor => b.minor,
    }
}

fn road_quality(road_type: RoadType, light_pct: f64) -> &'static str {
    match road_type {
        RoadType::MajorLit => "well-lit main roads",
        RoadType::ViaSafe => "passes a police post or hospital",
        _ if light_pct >= 70.0 => "well-lit streets",
        _ if light_pct >= 30.0 => "partially lit streets",
        RoadType::Minor => "poorly lit side streets",
        _ => "mostly unlit streets",
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 { 0.0 } else { part as f64 * 100.0 / whole as f64 }
}
