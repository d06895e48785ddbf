//! Per-cell average risk, for anomaly-style comparisons.
//!
//! Callers that ask "is this point unusually dangerous for its area?" need a
//! baseline per area.  The baseline is an explicit [`ZoneAverages`] value
//! built from grid samples (or supplied by the caller) and passed to
//! whatever needs it; nothing here is global, so two analyses over different
//! snapshots never interfere.

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;

use sr_core::GeoPoint;

use crate::{BoundingBox, GridRiskScanner};

/// Integer cell coordinates on a `cell_deg` × `cell_deg` lattice.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ZoneKey {
    pub row: i64,
    pub col: i64,
}

impl ZoneKey {
    pub fn for_point(p: GeoPoint, cell_deg: f64) -> Self {
        Self {
            row: (p.lat / cell_deg).floor() as i64,
            col: (p.lon / cell_deg).floor() as i64,
        }
    }
}

/// Average risk per [`ZoneKey`] cell.
#[derive(Clone, Debug)]
pub struct ZoneAverages {
    cell_deg: f64,
    averages: FxHashMap<ZoneKey, f64>,
}

impl ZoneAverages {
    /// An empty mapping on a `cell_deg` lattice.
    pub fn new(cell_deg: f64) -> Self {
        Self { cell_deg, averages: FxHashMap::default() }
    }

    /// Average the `(point, risk)` samples per cell.
    pub fn from_samples(cell_deg: f64, samples: impl IntoIterator<Item = (GeoPoint, f64)>) -> Self {
        let mut sums: FxHashMap<ZoneKey, (f64, u32)> = FxHashMap::default();
        for (p, risk) in samples {
            let slot = sums.entry(ZoneKey::for_point(p, cell_deg)).or_insert((0.0, 0));
            slot.0 += risk;
            slot.1 += 1;
        }
        let averages = sums
            .into_iter()
            .map(|(k, (sum, n))| (k, sum / f64::from(n)))
            .collect();
        Self { cell_deg, averages }
    }

    /// Scan `bounds` with `scanner` and average the samples per cell, using
    /// the scanner's `zone_cell_deg`.
    pub fn compute(scanner: &GridRiskScanner<'_>, bounds: &BoundingBox, now: DateTime<Utc>) -> Self {
        let cell_deg = scanner.config().zone_cell_deg;
        let averages = Self::from_samples(cell_deg, scanner.sample(bounds, now));
        log::debug!("zone averages: {} cell(s) at {cell_deg}°", averages.len());
        averages
    }

    /// Set the average for the cell containing `p`.
    pub fn insert(&mut self, p: GeoPoint, average: f64) {
        self.averages.insert(ZoneKey::for_point(p, self.cell_deg), average);
    }

    pub fn cell_deg(&self) -> f64 {
        self.cell_deg
    }

    pub fn len(&self) -> usize {
        self.averages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.averages.is_empty()
    }

    /// Average risk of the cell containing `p`.
    pub fn average_at(&self, p: GeoPoint) -> Option<f64> {
        self.averages.get(&ZoneKey::for_point(p, self.cell_deg)).copied()
    }

    /// `risk` relative to its cell average: `> 1` is worse than usual for the
    /// area.  `None` when the cell has no average or the average is 0.
    pub fn anomaly_ratio(&self, p: GeoPoint, risk: f64) -> Option<f64> {
        self.average_at(p).filter(|avg| *avg > 0.0).map(|avg| risk / avg)
    }
}
