//! Distance-weighted route risk with a per-segment breakdown.
//!
//! For a polyline `p0 … pn` the evaluator scores every consecutive pair with
//! [`RiskModel::risk_along_segment_default`] and weights it by the pair's
//! length:
//!
//! ```text
//! avg_risk = Σ risk_i × d_i / Σ d_i        (0 when Σ d_i = 0)
//! score    = avg_risk × risk_weight + (Σ d_i / 1000) × distance_weight
//! ```
//!
//! Lower is better.  Segment levels use `safe_below` / `medium_below` from
//! [`RouteConfig`] (defaults 0.5 / 1.5).

use chrono::{DateTime, Utc};

use sr_core::{GeoPoint, RouteConfig};
use sr_risk::RiskModel;

/// Coarse label for a segment's risk.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RiskLevel {
    Safe,
    Medium,
    High,
}

impl RiskLevel {
    pub fn classify(risk: f64, config: &RouteConfig) -> Self {
        if risk < config.safe_below {
            RiskLevel::Safe
        } else if risk < config.medium_below {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

/// One consecutive point pair of an evaluated route.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentRisk {
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub distance_m: f64,
    pub risk: f64,
    pub level: RiskLevel,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteEvaluation {
    pub total_distance_m: f64,
    pub avg_risk: f64,
    pub score: f64,
    pub segments: Vec<SegmentRisk>,
}

impl RouteEvaluation {
    /// The evaluation of a route with no length.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Segments classified [`RiskLevel::High`].
    pub fn high_risk_segments(&self) -> impl Iterator<Item = &SegmentRisk> {
        self.segments.iter().filter(|s| s.level == RiskLevel::High)
    }
}

/// Scores polylines against a [`RiskModel`].
pub struct RouteEvaluator<'a> {
    model: &'a RiskModel,
    config: &'a RouteConfig,
}

impl<'a> RouteEvaluator<'a> {
    pub fn new(model: &'a RiskModel, config: &'a RouteConfig) -> Self {
        Self { model, config }
    }

    /// Evaluate `points` as of `now`.  Fewer than two points give
    /// [`RouteEvaluation::zero`].
    pub fn evaluate(&self, points: &[GeoPoint], now: DateTime<Utc>) -> RouteEvaluation {
        if points.len() < 2 {
            return RouteEvaluation::zero();
        }

        let mut segments = Vec::with_capacity(points.len() - 1);
        let mut weighted_risk = 0.0;
        let mut total_distance_m = 0.0;

        for w in points.windows(2) {
            let (start, end) = (w[0], w[1]);
            let distance_m = start.distance_m(end);
            let risk = self.model.risk_along_segment_default(start, end, now);
            weighted_risk += risk * distance_m;
            total_distance_m += distance_m;
            segments.push(SegmentRisk {
                start,
                end,
                distance_m,
                risk,
                level: RiskLevel::classify(risk, self.config),
            });
        }

        let avg_risk = if total_distance_m > 0.0 { weighted_risk / total_distance_m } else { 0.0 };
        let score = avg_risk * self.config.risk_weight
            + (total_distance_m / 1000.0) * self.config.distance_weight;

        RouteEvaluation { total_distance_m, avg_risk, score, segments }
    }
}
