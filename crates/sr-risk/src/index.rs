//! R-tree layers over the input datasets.
//!
//! Entries live in `[lat, lon]` degree space.  Degree distances are only used
//! to *prune* candidates; every reported distance is recomputed exactly
//! (haversine or point-to-segment) before it reaches the risk formulas.

use rstar::{AABB, Envelope, PointDistance, RTree, RTreeObject};

use sr_core::geo::METERS_PER_DEGREE;
use sr_core::{Complaint, GeoPoint, Incident, LitSegment, SafePlace, segment_distance_m};

// ── Located ───────────────────────────────────────────────────────────────────

/// Anything with a single representative position.
pub(crate) trait Located {
    fn location(&self) -> GeoPoint;
}

impl Located for Incident {
    fn location(&self) -> GeoPoint {
        self.point
    }
}

impl Located for Complaint {
    fn location(&self) -> GeoPoint {
        self.point
    }
}

impl Located for SafePlace {
    fn location(&self) -> GeoPoint {
        self.point
    }
}

// ── R-tree entries ────────────────────────────────────────────────────────────

/// A 2-D `[lat, lon]` point with the index of its record.
#[derive(Clone)]
pub(crate) struct PointEntry {
    point: [f64; 2],
    idx: usize,
}

impl RTreeObject for PointEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for PointEntry {
    /// Squared Euclidean distance in lat/lon space.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

/// A lit segment stored by its bounding box.
#[derive(Clone)]
pub(crate) struct SegmentEntry {
    start: [f64; 2],
    end: [f64; 2],
    idx: usize,
}

impl RTreeObject for SegmentEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.start, self.end)
    }
}

impl PointDistance for SegmentEntry {
    /// Squared planar distance from `point` to the segment, degree space.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let [sy, sx] = self.start;
        let [ey, ex] = self.end;
        let (dx, dy) = (ex - sx, ey - sy);
        let len_sq = dx * dx + dy * dy;
        let t = if len_sq == 0.0 {
            0.0
        } else {
            (((point[1] - sx) * dx + (point[0] - sy) * dy) / len_sq).clamp(0.0, 1.0)
        };
        let (px, py) = (sx + dx * t, sy + dy * t);
        (point[1] - px).powi(2) + (point[0] - py).powi(2)
    }
}

// ── Layers ────────────────────────────────────────────────────────────────────

/// Lower bound on ground metres per degree of Euclidean lat/lon distance for
/// any point within `span_deg` of latitude of `lat`.  Clamped at 89° so the
/// bound stays positive; within 1° of a pole it is approximate.
fn metres_per_degree_floor(lat: f64, span_deg: f64) -> f64 {
    METERS_PER_DEGREE * (lat.abs() + span_deg).min(89.0).to_radians().cos()
}

/// Whether a candidate at Euclidean degree distance `deg` from a point at
/// `lat` is provably farther than `best_m` metres.
///
/// Anything within `best_m` lies inside a latitude band of half-width
/// `best_m / METERS_PER_DEGREE`, so the floor for that band bounds it.
fn beyond(lat: f64, deg: f64, best_m: f64) -> bool {
    deg * metres_per_degree_floor(lat, best_m / METERS_PER_DEGREE) > best_m
}

/// A box containing every point within `radius_m` of `center`.
fn degree_box(center: GeoPoint, radius_m: f64) -> AABB<[f64; 2]> {
    let half_lat = radius_m / METERS_PER_DEGREE;
    let half_lon = radius_m / metres_per_degree_floor(center.lat, half_lat);
    AABB::from_corners(
        [center.lat - half_lat, center.lon - half_lon],
        [center.lat + half_lat, center.lon + half_lon],
    )
}

/// A dataset of point records plus its R-tree.
pub(crate) struct PointLayer<T> {
    items: Vec<T>,
    tree: RTree<PointEntry>,
}

impl<T: Located> PointLayer<T> {
    pub fn new(items: Vec<T>) -> Self {
        let entries = items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                let p = item.location();
                PointEntry { point: [p.lat, p.lon], idx }
            })
            .collect();
        Self { items, tree: RTree::bulk_load(entries) }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Every record within `radius_m` of `center`, with its exact distance.
    pub fn within(&self, center: GeoPoint, radius_m: f64) -> impl Iterator<Item = (&T, f64)> + '_ {
        self.tree
            .locate_in_envelope(&degree_box(center, radius_m))
            .filter_map(move |e| {
                let item = &self.items[e.idx];
                let d = center.distance_m(item.location());
                (d <= radius_m).then_some((item, d))
            })
    }

    /// Nearest record accepted by `filter`, with its haversine distance.
    pub fn nearest(&self, p: GeoPoint, filter: impl Fn(&T) -> bool) -> Option<(&T, f64)> {
        let mut best: Option<(&T, f64)> = None;
        for (entry, d2) in self.tree.nearest_neighbor_iter_with_distance_2(&[p.lat, p.lon]) {
            if let Some((_, b)) = best {
                if beyond(p.lat, d2.sqrt(), b) {
                    break;
                }
            }
            let item = &self.items[entry.idx];
            if !filter(item) {
                continue;
            }
            let d = p.distance_m(item.location());
            if best.is_none_or(|(_, b)| d < b) {
                best = Some((item, d));
            }
        }
        best
    }
}

/// Lit segments plus their R-tree.
pub(crate) struct SegmentLayer {
    items: Vec<LitSegment>,
    tree: RTree<SegmentEntry>,
}

impl SegmentLayer {
    pub fn new(items: Vec<LitSegment>) -> Self {
        let entries = items
            .iter()
            .enumerate()
            .map(|(idx, s)| SegmentEntry {
                start: [s.start.lat, s.start.lon],
                end: [s.end.lat, s.end.lon],
                idx,
            })
            .collect();
        Self { items, tree: RTree::bulk_load(entries) }
    }

    pub fn items(&self) -> &[LitSegment] {
        &self.items
    }

    /// Distance in metres to the nearest segment; `f64::INFINITY` when empty.
    pub fn nearest_distance(&self, p: GeoPoint) -> f64 {
        let mut best = f64::INFINITY;
        for (entry, d2) in self.tree.nearest_neighbor_iter_with_distance_2(&[p.lat, p.lon]) {
            if best.is_finite() && beyond(p.lat, d2.sqrt(), best) {
                break;
            }
            best = best.min(self.items[entry.idx].distance_m(p));
        }
        best
    }

    /// Smallest distance in metres between the segment `start → end` and any
    /// stored segment within `search_m` of it; `f64::INFINITY` when there is
    /// none.
    pub fn nearest_distance_to_segment(&self, start: GeoPoint, end: GeoPoint, search_m: f64) -> f64 {
        let a = degree_box(start, search_m);
        let b = degree_box(end, search_m);
        let envelope = a.merged(&b);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|e| {
                let lit = &self.items[e.idx];
                segment_distance_m(start, end, lit.start, lit.end)
            })
            .filter(|d| *d <= search_m)
            .fold(f64::INFINITY, f64::min)
    }
}
