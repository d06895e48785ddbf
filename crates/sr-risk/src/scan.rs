//! Grid risk scanning for heatmaps and forecast hotspots.
//!
//! The scanner lays a regular grid over a bounding box (default spacing
//! 300 m; the longitude step is widened by `1/cos(lat)` so cells stay roughly
//! square on the ground), evaluates [`RiskModel::risk_at_point`] at every
//! grid point, and keeps the points at or above the configured threshold.
//!
//! # Parallelism
//!
//! With the `parallel` feature (default) the evaluations are fanned out over
//! Rayon's thread pool.  Workers share only `&RiskModel`, which is immutable,
//! so no synchronisation is needed and result order carries no meaning.
//! Results are returned sorted by descending risk for stable consumption.

use chrono::{DateTime, Utc};

use sr_core::geo::METERS_PER_DEGREE;
use sr_core::{GeoPoint, ScanConfig};

use crate::{RiskError, RiskModel, RiskResult};

// ── BoundingBox ───────────────────────────────────────────────────────────────

/// An axis-aligned lat/lon box.  Does not wrap the antimeridian.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> RiskResult<Self> {
        let sw = GeoPoint::try_new(south, west)?;
        let ne = GeoPoint::try_new(north, east)?;
        if sw.lat > ne.lat || sw.lon > ne.lon {
            return Err(RiskError::InvalidBounds(format!(
                "south-west {sw} is not below/left of north-east {ne}"
            )));
        }
        Ok(Self { south, west, north, east })
    }

    /// Smallest box containing all `points`, or `None` when empty.
    pub fn around(points: &[GeoPoint]) -> Option<Self> {
        let first = points.first()?;
        let mut b = Self { south: first.lat, west: first.lon, north: first.lat, east: first.lon };
        for p in &points[1..] {
            b.south = b.south.min(p.lat);
            b.north = b.north.max(p.lat);
            b.west = b.west.min(p.lon);
            b.east = b.east.max(p.lon);
        }
        Some(b)
    }

    pub fn contains(&self, p: GeoPoint) -> bool {
        (self.south..=self.north).contains(&p.lat) && (self.west..=self.east).contains(&p.lon)
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new((self.south + self.north) / 2.0, (self.west + self.east) / 2.0)
    }
}

// ── Results ───────────────────────────────────────────────────────────────────

/// A circular area whose centre scored at or above the threshold.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RiskZone {
    pub center: GeoPoint,
    pub risk: f64,
    pub radius_m: f64,
}

/// A risk zone evaluated for a specific (usually future) time.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hotspot {
    pub center: GeoPoint,
    pub risk: f64,
    pub radius_m: f64,
    pub forecast_at: DateTime<Utc>,
}

// ── GridRiskScanner ───────────────────────────────────────────────────────────

/// Evaluates a [`RiskModel`] over a lat/lon grid.
pub struct GridRiskScanner<'a> {
    model: &'a RiskModel,
    config: ScanConfig,
}

impl<'a> GridRiskScanner<'a> {
    pub fn new(model: &'a RiskModel, config: ScanConfig) -> RiskResult<Self> {
        config.validate()?;
        Ok(Self { model, config })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Grid points covering `bounds`, south-west first, row by row.
    ///
    /// When the grid would exceed `max_points`, both steps are widened by the
    /// same factor until it fits.
    pub fn grid_points(&self, bounds: &BoundingBox) -> Vec<GeoPoint> {
        let mid_cos = bounds.center().lat.to_radians().cos().max(0.01);
        let mut lat_step = self.config.step_m / METERS_PER_DEGREE;
        let mut lon_step = self.config.step_m / (METERS_PER_DEGREE * mid_cos);

        let count = |lat_step: f64, lon_step: f64| {
            let rows = ((bounds.north - bounds.south) / lat_step).floor() as usize + 1;
            let cols = ((bounds.east - bounds.west) / lon_step).floor() as usize + 1;
            (rows, cols)
        };

        let (mut rows, mut cols) = count(lat_step, lon_step);
        if rows.saturating_mul(cols) > self.config.max_points {
            let factor = (rows as f64 * cols as f64 / self.config.max_points as f64).sqrt();
            log::warn!(
                "grid of {rows}x{cols} exceeds {} points, widening step by {factor:.2}x",
                self.config.max_points
            );
            lat_step *= factor;
            lon_step *= factor;
            (rows, cols) = count(lat_step, lon_step);
            while rows.saturating_mul(cols) > self.config.max_points {
                lat_step *= 1.05;
                lon_step *= 1.05;
                (rows, cols) = count(lat_step, lon_step);
            }
        }

        let mut points = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            let lat = bounds.south + r as f64 * lat_step;
            for c in 0..cols {
                points.push(GeoPoint::new(lat, bounds.west + c as f64 * lon_step));
            }
        }
        points
    }

    /// Risk at every grid point as of `at`.  Points whose score is not finite
    /// are skipped.
    pub fn sample(&self, bounds: &BoundingBox, at: DateTime<Utc>) -> Vec<(GeoPoint, f64)> {
        let points = self.grid_points(bounds);
        let model = self.model;
        let eval = |p: &GeoPoint| {
            let risk = model.risk_at_point(*p, at);
            if risk.is_finite() {
                Some((*p, risk))
            } else {
                log::debug!("skipping grid point {p}: non-finite risk {risk}");
                None
            }
        };

        #[cfg(not(feature = "parallel"))]
        let samples: Vec<(GeoPoint, f64)> = points.iter().filter_map(eval).collect();

        #[cfg(feature = "parallel")]
        let samples: Vec<(GeoPoint, f64)> = {
            use rayon::prelude::*;
            points.par_iter().filter_map(eval).collect()
        };

        if samples.len() < points.len() {
            log::warn!("{} of {} grid points skipped", points.len() - samples.len(), points.len());
        }
        samples
    }

    /// Grid points at or above the threshold as fixed-radius zones.
    pub fn scan_zones(&self, bounds: &BoundingBox, now: DateTime<Utc>) -> Vec<RiskZone> {
        let zones: Vec<RiskZone> = self
            .above_threshold(bounds, now)
            .into_iter()
            .map(|(center, risk)| RiskZone { center, risk, radius_m: self.config.zone_radius_m })
            .collect();
        log::info!("scan: {} risk zone(s) at or above {}", zones.len(), self.config.threshold);
        zones
    }

    /// Like [`scan_zones`](Self::scan_zones) but scored as of `forecast_at`
    /// and stamped with it.
    pub fn scan_hotspots(&self, bounds: &BoundingBox, forecast_at: DateTime<Utc>) -> Vec<Hotspot> {
        let hotspots: Vec<Hotspot> = self
            .above_threshold(bounds, forecast_at)
            .into_iter()
            .map(|(center, risk)| Hotspot {
                center,
                risk,
                radius_m: self.config.zone_radius_m,
                forecast_at,
            })
            .collect();
        log::info!("scan: {} hotspot(s) forecast for {forecast_at}", hotspots.len());
        hotspots
    }

    fn above_threshold(&self, bounds: &BoundingBox, at: DateTime<Utc>) -> Vec<(GeoPoint, f64)> {
        let mut hits: Vec<(GeoPoint, f64)> = self
            .sample(bounds, at)
            .into_iter()
            .filter(|(_, risk)| *risk >= self.config.threshold)
            .collect();
        hits.sort_by(|a, b| b.1.total_cmp(&a.1));
        hits
    }
}
