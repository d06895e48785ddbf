//! Geographic coordinate type and spatial utilities.
//!
//! `GeoPoint` uses `f64` latitude/longitude.  Risk decay kernels work on
//! distances of tens of metres, so single precision would visibly quantise
//! the scores near a signal.
//!
//! All distances are great-circle (haversine) metres on a spherical Earth.
//! Projections onto segments use a local planar `(lon, lat)` approximation
//! with no datum correction, which is accurate enough at street scale.

use crate::{CoreError, CoreResult};

/// Mean Earth radius, metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Metres per degree of arc on the haversine sphere (latitude, or longitude
/// at the equator).
pub const METERS_PER_DEGREE: f64 = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;

/// A WGS-84 geographic coordinate in degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Like [`new`](Self::new) but rejects coordinates outside
    /// `lat ∈ [-90, 90]`, `lon ∈ [-180, 180]` (and NaN).
    pub fn try_new(lat: f64, lon: f64) -> CoreResult<Self> {
        let p = Self { lat, lon };
        if p.is_valid() {
            Ok(p)
        } else {
            Err(CoreError::InvalidCoordinate { lat, lon })
        }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lon)
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    /// Initial great-circle bearing from `self` to `other`, degrees clockwise
    /// from north in `[0, 360)`.
    pub fn bearing_deg(self, other: GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let y = d_lon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
        y.atan2(x).to_degrees().rem_euclid(360.0)
    }

    /// The point reached by travelling `distance_m` metres from `self` along
    /// the great circle with initial bearing `bearing_deg`.
    pub fn offset_m(self, bearing_deg: f64, distance_m: f64) -> GeoPoint {
        let delta = distance_m / EARTH_RADIUS_M;
        let theta = bearing_deg.to_radians();
        let lat1 = self.lat.to_radians();
        let lon1 = self.lon.to_radians();

        let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * theta.cos()).asin();
        let lon2 = lon1
            + (theta.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());

        // Normalise longitude back into [-180, 180).
        let lon2 = (lon2.to_degrees() + 540.0).rem_euclid(360.0) - 180.0;
        GeoPoint::new(lat2.to_degrees(), lon2)
    }

    /// Linear interpolation in degree space; `t = 0` is `self`, `t = 1` is
    /// `other`.  Fine for street-length segments.
    #[inline]
    pub fn lerp(self, other: GeoPoint, t: f64) -> GeoPoint {
        GeoPoint::new(
            self.lat + (other.lat - self.lat) * t,
            self.lon + (other.lon - self.lon) * t,
        )
    }

    #[inline]
    pub fn midpoint(self, other: GeoPoint) -> GeoPoint {
        self.lerp(other, 0.5)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// Minimum distance in metres from `point` to the segment `start → end`.
///
/// The projection parameter is computed in planar `(lon, lat)` space and
/// clamped to `[0, 1]`; the final distance is haversine from `point` to the
/// clamped projection.  A zero-length segment degenerates to the direct
/// distance to `start`.
pub fn distance_to_segment_m(point: GeoPoint, start: GeoPoint, end: GeoPoint) -> f64 {
    let dx = end.lon - start.lon;
    let dy = end.lat - start.lat;
    let len_sq = dx * dx + dy * dy;

    if len_sq == 0.0 {
        return point.distance_m(start);
    }

    let t = ((point.lon - start.lon) * dx + (point.lat - start.lat) * dy) / len_sq;
    let projection = start.lerp(end, t.clamp(0.0, 1.0));
    point.distance_m(projection)
}

/// Minimum distance in metres between segments `a0 → a1` and `b0 → b1`.
///
/// Zero when they cross in planar `(lon, lat)` space; otherwise the smallest
/// of the four endpoint-to-segment distances.
pub fn segment_distance_m(a0: GeoPoint, a1: GeoPoint, b0: GeoPoint, b1: GeoPoint) -> f64 {
    if segments_intersect(a0, a1, b0, b1) {
        return 0.0;
    }
    distance_to_segment_m(a0, b0, b1)
        .min(distance_to_segment_m(a1, b0, b1))
        .min(distance_to_segment_m(b0, a0, a1))
        .min(distance_to_segment_m(b1, a0, a1))
}

/// Signed area of `o, a, b` in `(lon, lat)` space.
fn cross(o: GeoPoint, a: GeoPoint, b: GeoPoint) -> f64 {
    (a.lon - o.lon) * (b.lat - o.lat) - (a.lat - o.lat) * (b.lon - o.lon)
}

/// Proper crossings only.  Touching and collinear cases fall through to the
/// endpoint distances, which are 0 there.
fn segments_intersect(a0: GeoPoint, a1: GeoPoint, b0: GeoPoint, b1: GeoPoint) -> bool {
    let d1 = cross(b0, b1, a0);
    let d2 = cross(b0, b1, a1);
    let d3 = cross(a0, a1, b0);
    let d4 = cross(a0, a1, b1);
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}

/// Total haversine length of a polyline in metres.  Empty and single-point
/// polylines have length 0.
pub fn polyline_length_m(points: &[GeoPoint]) -> f64 {
    points.windows(2).map(|w| w[0].distance_m(w[1])).sum()
}

/// Resample `points` to exactly `count` points spaced evenly by arc length.
///
/// The first and last samples coincide with the polyline's endpoints.  An
/// empty input yields an empty output; a single point (or a zero-length
/// polyline) is repeated `count` times.
pub fn resample_polyline(points: &[GeoPoint], count: usize) -> Vec<GeoPoint> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };
    if count == 0 {
        return Vec::new();
    }

    let mut cumulative = Vec::with_capacity(points.len());
    let mut acc = 0.0;
    cumulative.push(0.0);
    for w in points.windows(2) {
        acc += w[0].distance_m(w[1]);
        cumulative.push(acc);
    }
    let total = acc;

    if total == 0.0 || count == 1 {
        return vec![first; count];
    }

    let mut out = Vec::with_capacity(count);
    let mut seg = 0;
    for k in 0..count {
        let target = total * k as f64 / (count - 1) as f64;
        while seg + 2 < points.len() && cumulative[seg + 1] < target {
            seg += 1;
        }
        let seg_len = cumulative[seg + 1] - cumulative[seg];
        let t = if seg_len > 0.0 {
            ((target - cumulative[seg]) / seg_len).clamp(0.0, 1.0)
        } else {
            0.0
        };
        out.push(points[seg].lerp(points[seg + 1], t));
    }
    out
}
