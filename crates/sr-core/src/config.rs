//! Tunable constants for risk scoring, route ranking and grid scanning.
//!
//! Every distance, decay length and weight used by the engine lives here with
//! its default value; nothing downstream hard-codes a magic number.  The
//! defaults are hand-tuned for dense urban walking and have no derivation
//! beyond that.
//!
//! Typically loaded from a TOML file by the application crate (with the
//! `serde` feature, every field is optional and falls back to its default)
//! and passed to the model / planner / scanner constructors.

use rustc_hash::FxHashMap;

use crate::{CoreError, CoreResult};

// ── CategoryWeights ───────────────────────────────────────────────────────────

/// Severity multiplier per incident category.
///
/// Keys are normalised (lower-case, `-` and spaces folded into `_`) on
/// insert, on deserialization and on lookup, so `"Sexual Assault"` and
/// `"sexual_assault"` match.  Unknown categories weigh
/// [`default_weight`](Self::default_weight).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "CategoryWeightsRepr"))]
pub struct CategoryWeights {
    pub default_weight: f64,
    weights: FxHashMap<String, f64>,
}

impl CategoryWeights {
    /// An empty table: every category weighs `default_weight`.
    pub fn empty(default_weight: f64) -> Self {
        Self { default_weight, weights: FxHashMap::default() }
    }

    /// Insert or replace the weight for `category`.
    pub fn set(&mut self, category: &str, weight: f64) {
        self.weights.insert(normalise(category), weight);
    }

    /// A table from `(category, weight)` pairs; later duplicates win.
    pub fn from_entries<K: AsRef<str>>(
        default_weight: f64,
        entries: impl IntoIterator<Item = (K, f64)>,
    ) -> Self {
        let mut table = Self::empty(default_weight);
        for (category, weight) in entries {
            table.set(category.as_ref(), weight);
        }
        table
    }

    pub fn with(mut self, category: &str, weight: f64) -> Self {
        self.set(category, weight);
        self
    }

    /// Weight for `category`, or the default for unknown keys.
    pub fn weight(&self, category: &str) -> f64 {
        self.weights
            .get(&normalise(category))
            .copied()
            .unwrap_or(self.default_weight)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl Default for CategoryWeights {
    /// Severe violent categories sit in 3.5–5.0, property and petty crime in
    /// 1.0–2.5.
    fn default() -> Self {
        Self::empty(1.0)
            .with("murder", 5.0)
            .with("homicide", 5.0)
            .with("rape", 5.0)
            .with("sexual_assault", 5.0)
            .with("kidnapping", 4.5)
            .with("armed_robbery", 4.5)
            .with("assault", 4.0)
            .with("robbery", 4.0)
            .with("stabbing", 4.5)
            .with("shooting", 5.0)
            .with("harassment", 3.5)
            .with("stalking", 3.5)
            .with("burglary", 2.5)
            .with("drug_dealing", 2.0)
            .with("car_theft", 2.0)
            .with("pickpocketing", 1.5)
            .with("theft", 1.5)
            .with("fraud", 1.0)
            .with("vandalism", 1.0)
            .with("public_drinking", 1.0)
    }
}

fn normalise(category: &str) -> String {
    category.trim().to_ascii_lowercase().replace(['-', ' '], "_")
}

/// Wire shape of [`CategoryWeights`]; keys arrive as written in the file.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(default)]
struct CategoryWeightsRepr {
    default_weight: f64,
    weights: FxHashMap<String, f64>,
}

#[cfg(feature = "serde")]
impl Default for CategoryWeightsRepr {
    fn default() -> Self {
        let CategoryWeights { default_weight, weights } = CategoryWeights::default();
        Self { default_weight, weights }
    }
}

#[cfg(feature = "serde")]
impl From<CategoryWeightsRepr> for CategoryWeights {
    fn from(repr: CategoryWeightsRepr) -> Self {
        Self::from_entries(repr.default_weight, repr.weights)
    }
}

// ── RiskConfig ────────────────────────────────────────────────────────────────

/// One step of the ambient-context function.
///
/// A point falls in this tier when it is farther than `safe_beyond_m` from
/// every safe place **and** farther than `light_beyond_m` from every lit
/// segment.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContextTier {
    pub safe_beyond_m: f64,
    pub light_beyond_m: f64,
    pub risk: f64,
}

/// Parameters of the point risk model.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RiskConfig {
    /// Incidents farther than this contribute nothing.  Default: 1200 m.
    pub incident_radius_m: f64,
    /// e-folding length of incident influence.  Default: 400 m.
    pub incident_decay_m: f64,
    /// Severity is divided by this before weighting.  Default: 3.
    pub severity_baseline: f64,
    pub category_weights: CategoryWeights,

    /// Complaints farther than this contribute nothing.  Default: 800 m.
    pub complaint_radius_m: f64,
    /// e-folding length of complaint influence.  Default: 250 m.
    pub complaint_decay_m: f64,
    /// Multiplier for complaints with the reporter-gender flag.  Default: 1.8.
    pub gender_factor: f64,

    /// Signal half-life in days.  Default: 90.
    pub half_life_days: f64,

    /// Ambient tiers, checked in order; the first match wins.
    pub context_tiers: Vec<ContextTier>,
    /// Ambient risk when no tier matches (very close to protection or light).
    pub context_floor: f64,

    /// Lighting applies within this distance of a lit segment.  Default: 100 m.
    pub light_radius_m: f64,
    /// Lighting multiplier right at the light; rises linearly to 1.0 at
    /// `light_radius_m`.  Default: 0.4.
    pub light_min_factor: f64,

    /// Samples per segment in `risk_along_segment`.  Default: 25.
    pub segment_steps: usize,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            incident_radius_m: 1_200.0,
            incident_decay_m: 400.0,
            severity_baseline: 3.0,
            category_weights: CategoryWeights::default(),
            complaint_radius_m: 800.0,
            complaint_decay_m: 250.0,
            gender_factor: 1.8,
            half_life_days: 90.0,
            context_tiers: vec![
                ContextTier { safe_beyond_m: 800.0, light_beyond_m: 500.0, risk: 0.6 },
                ContextTier { safe_beyond_m: 400.0, light_beyond_m: 250.0, risk: 0.4 },
                ContextTier { safe_beyond_m: 150.0, light_beyond_m: 80.0, risk: 0.25 },
            ],
            context_floor: 0.1,
            light_radius_m: 100.0,
            light_min_factor: 0.4,
            segment_steps: 25,
        }
    }
}

impl RiskConfig {
    /// Reject values that would make the model produce NaN or nonsense.
    pub fn validate(&self) -> CoreResult<()> {
        positive("incident_decay_m", self.incident_decay_m)?;
        positive("complaint_decay_m", self.complaint_decay_m)?;
        positive("severity_baseline", self.severity_baseline)?;
        positive("half_life_days", self.half_life_days)?;
        positive("light_radius_m", self.light_radius_m)?;
        non_negative("incident_radius_m", self.incident_radius_m)?;
        non_negative("complaint_radius_m", self.complaint_radius_m)?;
        non_negative("context_floor", self.context_floor)?;
        if !(0.0..=1.0).contains(&self.light_min_factor) {
            return Err(CoreError::Config(format!(
                "light_min_factor must be within [0, 1], got {}",
                self.light_min_factor
            )));
        }
        if self.segment_steps == 0 {
            return Err(CoreError::Config("segment_steps must be at least 1".into()));
        }
        Ok(())
    }
}

// ── RouteConfig ───────────────────────────────────────────────────────────────

/// Fixed score adjustment per road-type tag.  Positive values make a route
/// look safer.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RoadTypeBonuses {
    pub direct: f64,
    pub major_lit: f64,
    pub via_safe: f64,
    pub mixed: f64,
    pub minor: f64,
}

impl Default for RoadTypeBonuses {
    fn default() -> Self {
        Self { direct: 0.0, major_lit: 0.5, via_safe: 0.4, mixed: 0.1, minor: -0.2 }
    }
}

/// Parameters for route evaluation, candidate generation and ranking.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RouteConfig {
    // ── Evaluation ────────────────────────────────────────────────────────
    /// Weight of average risk in the base score.  Default: 1.0.
    pub risk_weight: f64,
    /// Weight of route kilometres in the base score.  Default: 0.3.
    pub distance_weight: f64,
    /// Segments below this risk are "safe".  Default: 0.5.
    pub safe_below: f64,
    /// Segments below this risk (and not safe) are "medium".  Default: 1.5.
    pub medium_below: f64,

    // ── Candidate generation ──────────────────────────────────────────────
    /// Perpendicular midpoint offset for alternative requests.  Default: 500 m.
    pub alternative_offset_m: f64,
    /// Maximum candidates kept, direct included.  Default: 3.
    pub max_alternatives: usize,
    /// Aligned samples closer than this count as overlapping.  Default: 50 m.
    pub duplicate_proximity_m: f64,
    /// A candidate is a duplicate when more than this share of samples
    /// overlap.  Default: 0.8.
    pub duplicate_ratio: f64,
    /// Arc-length samples per polyline for the duplicate check.  Default: 32.
    pub duplicate_samples: usize,
    /// Maximum via-waypoint distance as a multiple of the direct distance.
    /// Default: 1.5.
    pub detour_budget: f64,

    // ── Ranking ───────────────────────────────────────────────────────────
    /// Bonus per route segment passing near a lit segment.  Default: 0.2.
    pub light_bonus: f64,
    /// "Near a lit segment" threshold.  Default: 50 m.
    pub light_proximity_m: f64,
    /// Bonus per route point inside a crowded area.  Default: 0.15.
    pub crowd_bonus: f64,
    pub road_bonuses: RoadTypeBonuses,
    /// Weight of adjusted risk in the ranking score.  Default: 100.
    pub ranking_risk_weight: f64,
    /// Weight of route kilometres in the ranking score.  Default: 1.0.
    pub ranking_distance_weight: f64,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            risk_weight: 1.0,
            distance_weight: 0.3,
            safe_below: 0.5,
            medium_below: 1.5,
            alternative_offset_m: 500.0,
            max_alternatives: 3,
            duplicate_proximity_m: 50.0,
            duplicate_ratio: 0.8,
            duplicate_samples: 32,
            detour_budget: 1.5,
            light_bonus: 0.2,
            light_proximity_m: 50.0,
            crowd_bonus: 0.15,
            road_bonuses: RoadTypeBonuses::default(),
            ranking_risk_weight: 100.0,
            ranking_distance_weight: 1.0,
        }
    }
}

impl RouteConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.safe_below > self.medium_below {
            return Err(CoreError::Config(format!(
                "safe_below ({}) must not exceed medium_below ({})",
                self.safe_below, self.medium_below
            )));
        }
        if self.max_alternatives == 0 {
            return Err(CoreError::Config("max_alternatives must be at least 1".into()));
        }
        if self.duplicate_samples < 2 {
            return Err(CoreError::Config("duplicate_samples must be at least 2".into()));
        }
        if !(0.0..=1.0).contains(&self.duplicate_ratio) {
            return Err(CoreError::Config(format!(
                "duplicate_ratio must be within [0, 1], got {}",
                self.duplicate_ratio
            )));
        }
        if self.detour_budget < 1.0 {
            return Err(CoreError::Config(format!(
                "detour_budget must be at least 1.0, got {}",
                self.detour_budget
            )));
        }
        non_negative("alternative_offset_m", self.alternative_offset_m)?;
        non_negative("duplicate_proximity_m", self.duplicate_proximity_m)?;
        non_negative("light_proximity_m", self.light_proximity_m)?;
        Ok(())
    }
}

// ── ScanConfig ────────────────────────────────────────────────────────────────

/// Parameters for grid scanning and zone aggregation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScanConfig {
    /// Grid spacing.  Default: 300 m.
    pub step_m: f64,
    /// Points at or above this risk are reported.  Default: 0.8.
    pub threshold: f64,
    /// Radius attached to each reported zone.  Default: 120 m.
    pub zone_radius_m: f64,
    /// Grids larger than this are coarsened.  Default: 250 000.
    pub max_points: usize,
    /// Cell size for zone averages, degrees.  Default: 0.01 (~1.1 km).
    pub zone_cell_deg: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            step_m: 300.0,
            threshold: 0.8,
            zone_radius_m: 120.0,
            max_points: 250_000,
            zone_cell_deg: 0.01,
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> CoreResult<()> {
        positive("step_m", self.step_m)?;
        positive("zone_cell_deg", self.zone_cell_deg)?;
        non_negative("zone_radius_m", self.zone_radius_m)?;
        if self.max_points == 0 {
            return Err(CoreError::Config("max_points must be at least 1".into()));
        }
        Ok(())
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn positive(name: &str, v: f64) -> CoreResult<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(CoreError::Config(format!("{name} must be positive and finite, got {v}")))
    }
}

fn non_negative(name: &str, v: f64) -> CoreResult<()> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(CoreError::Config(format!("{name} must be non-negative and finite, got {v}")))
    }
}
