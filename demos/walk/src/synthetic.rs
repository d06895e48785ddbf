//! Seeded synthetic city around central Bishkek.
//!
//! Used when no `--data-dir` is given.  The same seed always produces the
//! same datasets, so runs are comparable.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use sr_core::{Complaint, CrowdedArea, GeoPoint, Incident, LitSegment, SafePlace, SafePlaceKind};
use sr_risk::RiskDatasets;

pub const CITY_CENTER: GeoPoint = GeoPoint { lat: 42.8746, lon: 74.5698 };

const INCIDENT_COUNT:  usize = 60;
const COMPLAINT_COUNT: usize = 25;
const SPREAD_M:        f64   = 3_000.0;

const CATEGORIES: [&str; 8] = [
    "robbery", "assault", "theft", "pickpocketing", "harassment", "vandalism", "burglary", "fraud",
];

/// Build datasets and crowded areas from `seed`, with event timestamps up to a
/// year before `now`.
pub fn build_city(seed: u64, now: DateTime<Utc>) -> (RiskDatasets, Vec<CrowdedArea>) {
    let mut rng = SmallRng::seed_from_u64(seed);

    let incidents = (0..INCIDENT_COUNT)
        .map(|_| {
            let point = scatter(&mut rng, CITY_CENTER, SPREAD_M);
            let category = *CATEGORIES.choose(&mut rng).unwrap_or(&"theft");
            let severity = rng.gen_range(1..=5);
            Incident::new(point, category, severity, Some(days_ago(&mut rng, now, 365)))
        })
        .collect();

    let complaints = (0..COMPLAINT_COUNT)
        .map(|_| {
            let point = scatter(&mut rng, CITY_CENTER, SPREAD_M);
            Complaint::new(
                point,
                rng.gen_range(1.0..=5.0),
                rng.gen_bool(0.6),
                Some(days_ago(&mut rng, now, 120)),
            )
        })
        .collect();

    let safe_places = vec![
        SafePlace::new(CITY_CENTER.offset_m(10.0, 350.0), SafePlaceKind::Police, 2.5, 300.0)
            .with_name("Central precinct"),
        SafePlace::new(CITY_CENTER.offset_m(120.0, 1_400.0), SafePlaceKind::Hospital, 2.0, 250.0)
            .with_name("City hospital No. 1"),
        SafePlace::new(CITY_CENTER.offset_m(250.0, 900.0), SafePlaceKind::Police, 2.5, 300.0),
        SafePlace::new(CITY_CENTER.offset_m(60.0, 600.0), SafePlaceKind::Shop24h, 0.8, 120.0),
        SafePlace::new(CITY_CENTER.offset_m(300.0, 1_100.0), SafePlaceKind::Cafe24h, 0.6, 100.0),
    ];

    // Two lit avenues through the centre plus a lit side street.
    let lit_segments = vec![
        avenue(CITY_CENTER, 90.0, 2_500.0),
        avenue(CITY_CENTER, 0.0, 2_000.0),
        avenue(CITY_CENTER.offset_m(180.0, 700.0), 90.0, 800.0),
    ]
    .into_iter()
    .flatten()
    .collect();

    let crowded = vec![
        CrowdedArea { name: Some("Ala-Too square".into()), ..CrowdedArea::new(CITY_CENTER, 200.0) },
        CrowdedArea {
            name: Some("Osh bazaar".into()),
            ..CrowdedArea::new(CITY_CENTER.offset_m(270.0, 1_800.0), 300.0)
        },
    ];

    (RiskDatasets { incidents, complaints, safe_places, lit_segments }, crowded)
}

/// Uniform point in a disc of `radius_m` around `center`.
fn scatter(rng: &mut SmallRng, center: GeoPoint, radius_m: f64) -> GeoPoint {
    let bearing = rng.gen_range(0.0..360.0);
    let distance = radius_m * rng.gen_range(0.0_f64..1.0).sqrt();
    center.offset_m(bearing, distance)
}

fn days_ago(rng: &mut SmallRng, now: DateTime<Utc>, max_days: i64) -> DateTime<Utc> {
    now - Duration::days(rng.gen_range(0..=max_days))
}

/// A straight lit street through `center`, split into 250 m segments.
fn avenue(center: GeoPoint, bearing: f64, length_m: f64) -> Vec<LitSegment> {
    let from = center.offset_m(bearing + 180.0, length_m / 2.0);
    let pieces = (length_m / 250.0).ceil().max(1.0) as usize;
    (0..pieces)
        .map(|i| {
            let a = from.offset_m(bearing, length_m * i as f64 / pieces as f64);
            let b = from.offset_m(bearing, length_m * (i + 1) as f64 / pieces as f64);
            LitSegment::new(a, b)
        })
        .collect()
}
