//! The point risk model.
//!
//! # Formula
//!
//! For a point `p` observed at time `now`:
//!
//! ```text
//! incident   = Σ_{d ≤ 1200 m} weight(category) · severity/3 · decay(t) · e^(-d/400)
//! complaint  = Σ_{d ≤ 800 m}  weight · gender · decay(t) · e^(-d/250)
//! context    = step(nearest safe place, nearest lit segment)     0.6 … 0.1
//! protection = Σ_{d ≤ radius} power · e^(-d / (radius/2))
//! lighting   = 0.4 + 0.6 · d/100   if nearest lit segment d ≤ 100 m, else 1
//!
//! risk = max(0, (incident + complaint + context − protection) · lighting)
//! ```
//!
//! `decay(t) = 2^(-days/90)`.  All constants come from [`RiskConfig`].
//!
//! # Sharing
//!
//! `RiskModel` is `Send + Sync` and cheap to clone: datasets and their
//! R-trees sit behind `Arc`s and are never mutated.  Scoring takes `&self`
//! and can run from any number of threads without synchronisation.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use sr_core::time::half_life_factor;
use sr_core::{Complaint, GeoPoint, Incident, LitSegment, RiskConfig, SafePlace};

use crate::index::{PointLayer, SegmentLayer};
use crate::{RiskResult, loader};

// ── RiskDatasets ──────────────────────────────────────────────────────────────

/// The four input datasets, as handed over by the data layer.
#[derive(Clone, Debug, Default)]
pub struct RiskDatasets {
    pub incidents: Vec<Incident>,
    pub complaints: Vec<Complaint>,
    pub safe_places: Vec<SafePlace>,
    pub lit_segments: Vec<LitSegment>,
}

impl RiskDatasets {
    /// Load `incidents.csv`, `complaints.csv`, `safe_places.csv` and
    /// `lit_segments.csv` from `dir`.  Missing files yield empty datasets;
    /// malformed files are an error.
    pub fn load_dir(dir: &Path) -> RiskResult<Self> {
        let incidents = load_optional(dir, "incidents.csv", loader::load_incidents_csv)?;
        let complaints = load_optional(dir, "complaints.csv", loader::load_complaints_csv)?;
        let safe_places = load_optional(dir, "safe_places.csv", loader::load_safe_places_csv)?;
        let lit_segments = load_optional(dir, "lit_segments.csv", loader::load_lit_segments_csv)?;
        Ok(Self { incidents, complaints, safe_places, lit_segments })
    }
}

fn load_optional<T>(
    dir: &Path,
    file: &str,
    load: fn(&Path) -> RiskResult<Vec<T>>,
) -> RiskResult<Vec<T>> {
    let path = dir.join(file);
    if path.exists() {
        load(&path)
    } else {
        log::info!("{} not found, using an empty dataset", path.display());
        Ok(Vec::new())
    }
}

// ── RiskBreakdown ─────────────────────────────────────────────────────────────

/// Every component of one risk evaluation.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RiskBreakdown {
    pub incident: f64,
    pub complaint: f64,
    pub context: f64,
    pub protection: f64,
    /// Multiplier in `[light_min_factor, 1]`.
    pub lighting: f64,
    /// `f64::INFINITY` when there are no safe places.
    pub nearest_safe_m: f64,
    /// `f64::INFINITY` when there are no lit segments.
    pub nearest_light_m: f64,
    pub total: f64,
}

// ── RiskModel ─────────────────────────────────────────────────────────────────

/// Immutable snapshot of the safety signals plus the scoring parameters.
#[derive(Clone)]
pub struct RiskModel {
    config: Arc<RiskConfig>,
    incidents: Arc<PointLayer<Incident>>,
    complaints: Arc<PointLayer<Complaint>>,
    safe_places: Arc<PointLayer<SafePlace>>,
    lit_segments: Arc<SegmentLayer>,
    max_safe_radius_m: f64,
}

impl RiskModel {
    /// Build a model from a dataset snapshot.
    ///
    /// Records with out-of-range coordinates are dropped with a warning.
    /// Fails only if `config` is invalid.
    pub fn new(datasets: RiskDatasets, config: RiskConfig) -> RiskResult<Self> {
        config.validate()?;
        Ok(Self::build(datasets, config))
    }

    /// Build with [`RiskConfig::default`].
    pub fn with_default_config(datasets: RiskDatasets) -> Self {
        Self::build(datasets, RiskConfig::default())
    }

    fn build(datasets: RiskDatasets, config: RiskConfig) -> Self {
        let RiskDatasets { incidents, complaints, safe_places, lit_segments } = datasets;
        let incidents = keep_valid("incident", incidents, |i| i.point.is_valid());
        let complaints = keep_valid("complaint", complaints, |c| c.point.is_valid());
        let safe_places = keep_valid("safe place", safe_places, |s| {
            s.point.is_valid() && s.radius_m.is_finite() && s.radius_m >= 0.0
        });
        let lit_segments =
            keep_valid("lit segment", lit_segments, |s| s.start.is_valid() && s.end.is_valid());

        log::info!(
            "risk model: {} incidents, {} complaints, {} safe places, {} lit segments",
            incidents.len(),
            complaints.len(),
            safe_places.len(),
            lit_segments.len()
        );

        let max_safe_radius_m = safe_places.iter().map(|s| s.radius_m).fold(0.0, f64::max);

        Self {
            config: Arc::new(config),
            incidents: Arc::new(PointLayer::new(incidents)),
            complaints: Arc::new(PointLayer::new(complaints)),
            safe_places: Arc::new(PointLayer::new(safe_places)),
            lit_segments: Arc::new(SegmentLayer::new(lit_segments)),
            max_safe_radius_m,
        }
    }

    /// A new snapshot with the complaint set replaced.
    ///
    /// Incidents, safe places, lit segments and their indexes are shared with
    /// `self`; `self` remains valid and unchanged.
    pub fn with_complaints(&self, complaints: Vec<Complaint>) -> RiskModel {
        let complaints = keep_valid("complaint", complaints, |c| c.point.is_valid());
        log::debug!("rebuilding risk model with {} complaints", complaints.len());
        RiskModel {
            complaints: Arc::new(PointLayer::new(complaints)),
            ..self.clone()
        }
    }

    /// A new snapshot with one complaint appended.
    pub fn with_complaint(&self, complaint: Complaint) -> RiskModel {
        let mut complaints = self.complaints.items().to_vec();
        complaints.push(complaint);
        self.with_complaints(complaints)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    pub fn incidents(&self) -> &[Incident] {
        self.incidents.items()
    }

    pub fn complaints(&self) -> &[Complaint] {
        self.complaints.items()
    }

    pub fn safe_places(&self) -> &[SafePlace] {
        self.safe_places.items()
    }

    pub fn lit_segments(&self) -> &[LitSegment] {
        self.lit_segments.items()
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Nearest safe place accepted by `filter`, with its distance in metres.
    pub fn nearest_safe_place(
        &self,
        p: GeoPoint,
        filter: impl Fn(&SafePlace) -> bool,
    ) -> Option<(&SafePlace, f64)> {
        self.safe_places.nearest(p, filter)
    }

    /// Distance to the nearest lit segment; `f64::INFINITY` when there are
    /// none.
    pub fn distance_to_nearest_light(&self, p: GeoPoint) -> f64 {
        self.lit_segments.nearest_distance(p)
    }

    /// Distance from the segment `start → end` to the nearest lit segment,
    /// looking no farther than `search_m`; `f64::INFINITY` when nothing is
    /// that close.
    pub fn segment_distance_to_light(&self, start: GeoPoint, end: GeoPoint, search_m: f64) -> f64 {
        self.lit_segments.nearest_distance_to_segment(start, end, search_m)
    }

    /// Safe places whose protective radius contains `p`, with distances.
    pub fn safe_places_covering(&self, p: GeoPoint) -> impl Iterator<Item = (&SafePlace, f64)> + '_ {
        self.safe_places
            .within(p, self.max_safe_radius_m)
            .filter(|(s, d)| *d <= s.radius_m)
    }

    // ── Scoring ───────────────────────────────────────────────────────────

    /// Danger score at `p` as of `now`.  Always finite and `≥ 0` for valid
    /// inputs.
    pub fn risk_at_point(&self, p: GeoPoint, now: DateTime<Utc>) -> f64 {
        self.risk_breakdown(p, now).total
    }

    /// Like [`risk_at_point`](Self::risk_at_point) but returns every
    /// component.
    pub fn risk_breakdown(&self, p: GeoPoint, now: DateTime<Utc>) -> RiskBreakdown {
        let cfg = &*self.config;

        let incident = self.incident_risk(p, now);
        let complaint = self.complaint_risk(p, now);

        let nearest_safe_m = self
            .safe_places
            .nearest(p, |_| true)
            .map_or(f64::INFINITY, |(_, d)| d);
        let nearest_light_m = self.distance_to_nearest_light(p);
        let context = self.context_risk(nearest_safe_m, nearest_light_m);

        let protection: f64 = self
            .safe_places_covering(p)
            .map(|(s, d)| {
                let half = s.radius_m / 2.0;
                if half > 0.0 { s.power * (-d / half).exp() } else { s.power }
            })
            .sum();

        let lighting = if nearest_light_m <= cfg.light_radius_m {
            cfg.light_min_factor + (1.0 - cfg.light_min_factor) * nearest_light_m / cfg.light_radius_m
        } else {
            1.0
        };

        let total = ((incident + complaint + context - protection) * lighting).max(0.0);

        RiskBreakdown {
            incident,
            complaint,
            context,
            protection,
            lighting,
            nearest_safe_m,
            nearest_light_m,
            total,
        }
    }

    /// Mean risk over `steps` samples from `start` (inclusive) towards `end`
    /// (exclusive).  `steps == 0` is treated as 1.
    pub fn risk_along_segment(
        &self,
        start: GeoPoint,
        end: GeoPoint,
        now: DateTime<Utc>,
        steps: usize,
    ) -> f64 {
        let steps = steps.max(1);
        let sum: f64 = (0..steps)
            .map(|i| self.risk_at_point(start.lerp(end, i as f64 / steps as f64), now))
            .sum();
        sum / steps as f64
    }

    /// [`risk_along_segment`](Self::risk_along_segment) with the configured
    /// step count.
    pub fn risk_along_segment_default(&self, start: GeoPoint, end: GeoPoint, now: DateTime<Utc>) -> f64 {
        self.risk_along_segment(start, end, now, self.config.segment_steps)
    }

    // ── Components ────────────────────────────────────────────────────────

    fn incident_risk(&self, p: GeoPoint, now: DateTime<Utc>) -> f64 {
        let cfg = &*self.config;
        self.incidents
            .within(p, cfg.incident_radius_m)
            .map(|(i, d)| {
                cfg.category_weights.weight(&i.category)
                    * (f64::from(i.severity) / cfg.severity_baseline)
                    * half_life_factor(i.timestamp, now, cfg.half_life_days)
                    * (-d / cfg.incident_decay_m).exp()
            })
            .sum()
    }

    fn complaint_risk(&self, p: GeoPoint, now: DateTime<Utc>) -> f64 {
        let cfg = &*self.config;
        self.complaints
            .within(p, cfg.complaint_radius_m)
            .map(|(c, d)| {
                let gender = if c.reporter_female { cfg.gender_factor } else { 1.0 };
                c.weight
                    * gender
                    * half_life_factor(c.timestamp, now, cfg.half_life_days)
                    * (-d / cfg.complaint_decay_m).exp()
            })
            .sum()
    }

    fn context_risk(&self, safe_m: f64, light_m: f64) -> f64 {
        let cfg = &*self.config;
        cfg.context_tiers
            .iter()
            .find(|t| safe_m > t.safe_beyond_m && light_m > t.light_beyond_m)
            .map_or(cfg.context_floor, |t| t.risk)
    }
}

impl std::fmt::Debug for RiskModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskModel")
            .field("incidents", &self.incidents().len())
            .field("complaints", &self.complaints().len())
            .field("safe_places", &self.safe_places().len())
            .field("lit_segments", &self.lit_segments().len())
            .finish()
    }
}

fn keep_valid<T>(what: &str, items: Vec<T>, valid: impl Fn(&T) -> bool) -> Vec<T> {
    let before = items.len();
    let kept: Vec<T> = items.into_iter().filter(|i| valid(i)).collect();
    if kept.len() < before {
        log::warn!("dropped {} {what} record(s) with invalid geometry", before - kept.len());
    }
    kept
}
