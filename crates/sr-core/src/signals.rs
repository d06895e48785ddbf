//! Spatial safety signals: the four datasets a risk model is built from, plus
//! the crowded-area circles consumed by route ranking.
//!
//! Every record is an immutable value.  Datasets are loaded once by the
//! caller and handed to the model as snapshots; nothing here is mutated after
//! construction.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::{CoreError, GeoPoint};

// ── Incident ──────────────────────────────────────────────────────────────────

/// A reported crime or safety incident.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Incident {
    pub point: GeoPoint,
    /// Key into the category weight table (`"robbery"`, `"theft"`, …).
    pub category: String,
    /// 1 (minor) to 5 (severe).
    pub severity: u8,
    /// `None` when the source timestamp was missing or unparsable; treated
    /// as "now" (no decay).
    pub timestamp: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

impl Incident {
    /// Build an incident, clamping `severity` into `1..=5`.
    pub fn new(
        point: GeoPoint,
        category: impl Into<String>,
        severity: u8,
        timestamp: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            point,
            category: category.into(),
            severity: severity.clamp(1, 5),
            timestamp,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// ── Complaint ─────────────────────────────────────────────────────────────────

/// A user-submitted "I felt unsafe here" report.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Complaint {
    pub point: GeoPoint,
    /// Felt danger, continuous 1.0–5.0.
    pub weight: f64,
    /// Reporter-gender flag; complaints from female reporters carry the
    /// configured gender factor.
    pub reporter_female: bool,
    pub timestamp: Option<DateTime<Utc>>,
    pub text: Option<String>,
}

impl Complaint {
    /// Build a complaint, clamping `weight` into `1.0..=5.0`.
    pub fn new(
        point: GeoPoint,
        weight: f64,
        reporter_female: bool,
        timestamp: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            point,
            weight: weight.clamp(1.0, 5.0),
            reporter_female,
            timestamp,
            text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

// ── SafePlace ─────────────────────────────────────────────────────────────────

/// Category of a protective landmark.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SafePlaceKind {
    Police,
    Hospital,
    Shop24h,
    Cafe24h,
}

impl SafePlaceKind {
    /// Police posts and hospitals: the only kinds eligible as detour
    /// waypoints.
    #[inline]
    pub fn is_emergency(self) -> bool {
        matches!(self, SafePlaceKind::Police | SafePlaceKind::Hospital)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SafePlaceKind::Police => "police",
            SafePlaceKind::Hospital => "hospital",
            SafePlaceKind::Shop24h => "shop_24h",
            SafePlaceKind::Cafe24h => "cafe_24h",
        }
    }
}

impl fmt::Display for SafePlaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SafePlaceKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "police" => Ok(SafePlaceKind::Police),
            "hospital" => Ok(SafePlaceKind::Hospital),
            "shop_24h" | "24h_shop" | "shop" => Ok(SafePlaceKind::Shop24h),
            "cafe_24h" | "24h_cafe" | "cafe" => Ok(SafePlaceKind::Cafe24h),
            other => Err(CoreError::Parse(format!(
                "unknown safe place kind {other:?}: expected police, hospital, shop_24h or cafe_24h"
            ))),
        }
    }
}

/// A point-like protective landmark with a radius of effect.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SafePlace {
    pub point: GeoPoint,
    pub kind: SafePlaceKind,
    /// Protective strength subtracted from risk at the centre.
    pub power: f64,
    /// Radius of protective effect, metres.
    pub radius_m: f64,
    pub name: Option<String>,
}

impl SafePlace {
    pub fn new(point: GeoPoint, kind: SafePlaceKind, power: f64, radius_m: f64) -> Self {
        Self { point, kind, power, radius_m, name: None }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// `true` if `p` lies inside the protective radius.
    #[inline]
    pub fn covers(&self, p: GeoPoint) -> bool {
        self.point.distance_m(p) <= self.radius_m
    }

    /// Display label: the name if present, otherwise the kind.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(self.kind.as_str())
    }
}

// ── LitSegment ────────────────────────────────────────────────────────────────

/// An illuminated street stretch, treated as a line segment.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LitSegment {
    pub start: GeoPoint,
    pub end: GeoPoint,
}

impl LitSegment {
    pub fn new(start: GeoPoint, end: GeoPoint) -> Self {
        Self { start, end }
    }

    /// Minimum distance in metres from `p` to this segment.
    #[inline]
    pub fn distance_m(&self, p: GeoPoint) -> f64 {
        crate::geo::distance_to_segment_m(p, self.start, self.end)
    }
}

// ── CrowdedArea ───────────────────────────────────────────────────────────────

/// A circle where foot traffic is usually high (markets, stations, squares).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CrowdedArea {
    pub center: GeoPoint,
    pub radius_m: f64,
    pub name: Option<String>,
}

impl CrowdedArea {
    pub fn new(center: GeoPoint, radius_m: f64) -> Self {
        Self { center, radius_m, name: None }
    }

    #[inline]
    pub fn contains(&self, p: GeoPoint) -> bool {
        self.center.distance_m(p) <= self.radius_m
    }
}
