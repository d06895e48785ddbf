//! Unit tests for sr-route.
//!
//! Providers are plain functions or closures; none of these tests touch the
//! network.

#[cfg(test)]
mod helpers {
    use chrono::{DateTime, TimeZone, Utc};

    use sr_core::{GeoPoint, polyline_length_m};
    use sr_risk::{RiskDatasets, RiskModel};

    use crate::{ProviderError, ProviderResult, ProviderRoute};

    pub const WALK_MPS: f64 = 1.4;

    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 22, 0, 0).unwrap()
    }

    pub fn start() -> GeoPoint {
        GeoPoint::new(42.8746, 74.5698)
    }

    /// 2 km due east of [`start`].
    pub fn end() -> GeoPoint {
        start().offset_m(90.0, 2_000.0)
    }

    pub fn mid() -> GeoPoint {
        start().midpoint(end())
    }

    /// Walks straight through every waypoint.
    pub fn straight(waypoints: &[GeoPoint]) -> ProviderResult<ProviderRoute> {
        let points = waypoints.to_vec();
        let distance_m = polyline_length_m(&points);
        Ok(ProviderRoute { points, distance_m, duration_s: distance_m / WALK_MPS })
    }

    /// Ignores intermediate waypoints, like a provider snapping back onto the
    /// main road.
    pub fn snapping(waypoints: &[GeoPoint]) -> ProviderResult<ProviderRoute> {
        match (waypoints.first(), waypoints.last()) {
            (Some(a), Some(b)) => straight(&[*a, *b]),
            _ => Err(ProviderError::EmptyRoute),
        }
    }

    pub fn failing(_: &[GeoPoint]) -> ProviderResult<ProviderRoute> {
        Err(ProviderError::Status(503))
    }

    /// `points` with `k` evenly spaced points inserted in every gap.
    pub fn densify(points: &[GeoPoint], k: usize) -> Vec<GeoPoint> {
        let mut out = Vec::new();
        for w in points.windows(2) {
            for i in 0..=k {
                out.push(w[0].lerp(w[1], i as f64 / (k + 1) as f64));
            }
        }
        out.extend(points.last());
        out
    }

    pub fn model_with(datasets: RiskDatasets) -> RiskModel {
        RiskModel::with_default_config(datasets)
    }

    pub fn empty_model() -> RiskModel {
        model_with(RiskDatasets::default())
    }
}

// ── Evaluation ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod evaluate {
    use sr_core::{Incident, RouteConfig, polyline_length_m};
    use sr_risk::RiskDatasets;

    use super::helpers::*;
    use crate::{RiskLevel, RouteEvaluation, RouteEvaluator};

    #[test]
    fn fewer_than_two_points_is_zero() {
        let model = empty_model();
        let config = RouteConfig::default();
        let evaluator = RouteEvaluator::new(&model, &config);
        assert_eq!(evaluator.evaluate(&[], now()), RouteEvaluation::zero());
        assert_eq!(evaluator.evaluate(&[start()], now()), RouteEvaluation::zero());
    }

    #[test]
    fn segments_cover_the_route() {
        let model = empty_model();
        let config = RouteConfig::default();
        let points = densify(&[start(), end()], 4);
        let eval = RouteEvaluator::new(&model, &config).evaluate(&points, now());

        assert_eq!(eval.segments.len(), points.len() - 1);
        let sum: f64 = eval.segments.iter().map(|s| s.distance_m).sum();
        assert!((sum - eval.total_distance_m).abs() < 1e-6);
        assert!((eval.total_distance_m - polyline_length_m(&points)).abs() < 1e-6);
        for (s, w) in eval.segments.iter().zip(points.windows(2)) {
            assert_eq!((s.start, s.end), (w[0], w[1]));
        }
    }

    #[test]
    fn empty_model_scores_ambient_risk_plus_distance() {
        let model = empty_model();
        let config = RouteConfig::default();
        let eval = RouteEvaluator::new(&model, &config).evaluate(&[start(), mid(), end()], now());

        assert!((eval.avg_risk - 0.6).abs() < 1e-9);
        let expected = 0.6 + eval.total_distance_m / 1000.0 * 0.3;
        assert!((eval.score - expected).abs() < 1e-9);
        assert!((eval.total_distance_m - 2_000.0).abs() < 1.0);
        assert!(eval.segments.iter().all(|s| s.level == RiskLevel::Medium));
    }

    #[test]
    fn segment_near_robbery_is_high() {
        let model = model_with(RiskDatasets {
            incidents: vec![Incident::new(start(), "robbery", 5, Some(now()))],
            ..Default::default()
        });
        let config = RouteConfig::default();
        let near = start().offset_m(90.0, 50.0);
        let far_a = start().offset_m(0.0, 3_000.0);
        let far_b = far_a.offset_m(90.0, 50.0);

        let evaluator = RouteEvaluator::new(&model, &config);
        let hot = evaluator.evaluate(&[start(), near], now());
        let calm = evaluator.evaluate(&[far_a, far_b], now());

        assert_eq!(hot.segments[0].level, RiskLevel::High);
        assert_eq!(hot.high_risk_segments().count(), 1);
        assert_eq!(calm.segments[0].level, RiskLevel::Medium);
        assert!(hot.score > calm.score);
    }

    #[test]
    fn zero_length_route_has_zero_average() {
        let model = empty_model();
        let config = RouteConfig::default();
        let eval = RouteEvaluator::new(&model, &config).evaluate(&[start(), start()], now());
        assert_eq!(eval.segments.len(), 1);
        assert_eq!(eval.total_distance_m, 0.0);
        assert_eq!(eval.avg_risk, 0.0);
        assert_eq!(eval.score, 0.0);
    }

    #[test]
    fn classify_thresholds() {
        let config = RouteConfig::default();
        assert_eq!(RiskLevel::classify(0.0, &config), RiskLevel::Safe);
        assert_eq!(RiskLevel::classify(0.49, &config), RiskLevel::Safe);
        assert_eq!(RiskLevel::classify(0.5, &config), RiskLevel::Medium);
        assert_eq!(RiskLevel::classify(1.49, &config), RiskLevel::Medium);
        assert_eq!(RiskLevel::classify(1.5, &config), RiskLevel::High);
    }
}

// ── Alternatives ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod alternatives {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use sr_core::{GeoPoint, RouteConfig, SafePlace, SafePlaceKind};
    use sr_risk::RiskDatasets;

    use super::helpers::*;
    use crate::{ProviderError, ProviderResult, ProviderRoute, RoadType, RouteAlternativesGenerator, RouteData};

    fn police(at: GeoPoint) -> SafePlace {
        SafePlace::new(at, SafePlaceKind::Police, 2.5, 300.0)
    }

    #[test]
    fn identical_polylines_are_duplicates() {
        let model = empty_model();
        let config = RouteConfig::default();
        let generator = RouteAlternativesGenerator::new(&model, &straight, &config);
        let line = [start(), mid(), end()];
        assert!(generator.is_duplicate(&line, &line));
    }

    #[test]
    fn vertex_count_does_not_matter() {
        let model = empty_model();
        let config = RouteConfig::default();
        let generator = RouteAlternativesGenerator::new(&model, &straight, &config);
        let sparse = [start(), end()];
        let dense = densify(&sparse, 17);
        assert!(generator.is_duplicate(&dense, &sparse));
        assert!(generator.is_duplicate(&sparse, &dense));
    }

    #[test]
    fn parallel_street_is_not_a_duplicate() {
        let model = empty_model();
        let config = RouteConfig::default();
        let generator = RouteAlternativesGenerator::new(&model, &straight, &config);
        let a = [start(), end()];
        let b = [start().offset_m(0.0, 100.0), end().offset_m(0.0, 100.0)];
        assert!(!generator.is_duplicate(&a, &b));
    }

    #[test]
    fn shared_endpoints_only_is_not_a_duplicate() {
        let model = empty_model();
        let config = RouteConfig::default();
        let generator = RouteAlternativesGenerator::new(&model, &straight, &config);
        let direct = [start(), end()];
        let bent = [start(), mid().offset_m(0.0, 500.0), end()];
        assert!(!generator.is_duplicate(&bent, &direct));
    }

    #[test]
    fn empty_polyline_is_never_a_duplicate() {
        let model = empty_model();
        let config = RouteConfig::default();
        let generator = RouteAlternativesGenerator::new(&model, &straight, &config);
        assert!(!generator.is_duplicate(&[], &[start(), end()]));
        assert!(!generator.is_duplicate(&[start(), end()], &[]));
    }

    #[test]
    fn find_duplicate_route_reports_first_match() {
        let model = empty_model();
        let config = RouteConfig::default();
        let generator = RouteAlternativesGenerator::new(&model, &straight, &config);
        let north = vec![start(), mid().offset_m(0.0, 500.0), end()];
        let routes = vec![
            RouteData::from_points(north, WALK_MPS, RoadType::Mixed),
            RouteData::from_points(vec![start(), end()], WALK_MPS, RoadType::Direct),
            RouteData::from_points(vec![start(), mid(), end()], WALK_MPS, RoadType::Direct),
        ];
        assert_eq!(generator.find_duplicate_route(&[start(), end()], &routes), Some(1));
        let south = [start(), mid().offset_m(180.0, 500.0), end()];
        assert_eq!(generator.find_duplicate_route(&south, &routes), None);
    }

    #[test]
    fn generate_returns_direct_and_two_alternatives() {
        let model = empty_model();
        let config = RouteConfig::default();
        let routes = RouteAlternativesGenerator::new(&model, &straight, &config).generate(start(), end());

        assert_eq!(routes.len(), 3);
        assert_eq!(routes[0].road_type, RoadType::Direct);
        assert_eq!(routes[0].points, vec![start(), end()]);
        for alt in &routes[1..] {
            assert_eq!(alt.road_type, RoadType::Mixed);
            assert_eq!(alt.points.len(), 3);
            let offset = alt.points[1].distance_m(mid());
            assert!((offset - 500.0).abs() < 1.0, "via point {offset} m from midpoint");
        }
        // One alternative on each side.
        assert!((routes[1].points[1].lat - mid().lat) * (routes[2].points[1].lat - mid().lat) < 0.0);
    }

    #[test]
    fn snapped_alternatives_are_dropped() {
        let model = empty_model();
        let config = RouteConfig::default();
        let calls = AtomicUsize::new(0);
        let provider = |wps: &[GeoPoint]| -> ProviderResult<ProviderRoute> {
            calls.fetch_add(1, Ordering::SeqCst);
            snapping(wps)
        };
        let routes = RouteAlternativesGenerator::new(&model, &provider, &config).generate(start(), end());
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].road_type, RoadType::Direct);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn max_alternatives_caps_requests() {
        let model = empty_model();
        let config = RouteConfig { max_alternatives: 2, ..RouteConfig::default() };
        let calls = AtomicUsize::new(0);
        let provider = |wps: &[GeoPoint]| -> ProviderResult<ProviderRoute> {
            calls.fetch_add(1, Ordering::SeqCst);
            straight(wps)
        };
        let routes = RouteAlternativesGenerator::new(&model, &provider, &config).generate(start(), end());
        assert_eq!(routes.len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn all_failures_retry_direct_once_then_give_up() {
        let model = empty_model();
        let config = RouteConfig::default();
        let calls = AtomicUsize::new(0);
        let provider = |wps: &[GeoPoint]| -> ProviderResult<ProviderRoute> {
            calls.fetch_add(1, Ordering::SeqCst);
            failing(wps)
        };
        let routes = RouteAlternativesGenerator::new(&model, &provider, &config).generate(start(), end());
        assert!(routes.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn retry_can_recover_the_direct_route() {
        let model = empty_model();
        let config = RouteConfig::default();
        let calls = AtomicUsize::new(0);
        let provider = |wps: &[GeoPoint]| -> ProviderResult<ProviderRoute> {
            if calls.fetch_add(1, Ordering::SeqCst) < 3 {
                Err(ProviderError::Transport("connection reset".into()))
            } else {
                straight(wps)
            }
        };
        let routes = RouteAlternativesGenerator::new(&model, &provider, &config).generate(start(), end());
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].road_type, RoadType::Direct);
        assert_eq!(routes[0].points, vec![start(), end()]);
    }

    #[test]
    fn failed_direct_keeps_alternatives_without_retry() {
        let model = empty_model();
        let config = RouteConfig::default();
        let calls = AtomicUsize::new(0);
        let provider = |wps: &[GeoPoint]| -> ProviderResult<ProviderRoute> {
            calls.fetch_add(1, Ordering::SeqCst);
            if wps.len() == 2 { Err(ProviderError::Status(500)) } else { straight(wps) }
        };
        let routes = RouteAlternativesGenerator::new(&model, &provider, &config).generate(start(), end());
        assert_eq!(routes.len(), 2);
        assert!(routes.iter().all(|r| r.road_type == RoadType::Mixed));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn empty_provider_answer_is_a_failure() {
        let model = empty_model();
        let config = RouteConfig::default();
        let provider = |wps: &[GeoPoint]| -> ProviderResult<ProviderRoute> {
            if wps.len() == 2 {
                Ok(ProviderRoute { points: Vec::new(), distance_m: 0.0, duration_s: 0.0 })
            } else {
                straight(wps)
            }
        };
        let routes = RouteAlternativesGenerator::new(&model, &provider, &config).generate(start(), end());
        assert!(routes.iter().all(|r| !r.points.is_empty()));
        assert!(routes.iter().all(|r| r.road_type != RoadType::Direct));
    }

    #[test]
    fn detour_through_police_is_spliced() {
        let station = police(mid().offset_m(0.0, 100.0));
        let model = model_with(RiskDatasets { safe_places: vec![station.clone()], ..Default::default() });
        let config = RouteConfig::default();
        let generator = RouteAlternativesGenerator::new(&model, &straight, &config);

        let detour = generator.route_via_safe_place(start(), end(), 2_000.0).expect("detour");
        assert_eq!(detour.road_type, RoadType::ViaSafe);
        assert_eq!(detour.points, vec![start(), station.point, end()]);
        let legs = start().distance_m(station.point) + station.point.distance_m(end());
        assert!((detour.distance_m - legs).abs() < 1e-6);
        assert!((detour.duration_s - legs / WALK_MPS).abs() < 1e-6);
    }

    #[test]
    fn detour_ignores_non_emergency_places() {
        let shop = SafePlace::new(mid().offset_m(0.0, 100.0), SafePlaceKind::Shop24h, 1.0, 100.0);
        let model = model_with(RiskDatasets { safe_places: vec![shop], ..Default::default() });
        let config = RouteConfig::default();
        let generator = RouteAlternativesGenerator::new(&model, &straight, &config);
        assert!(generator.route_via_safe_place(start(), end(), 2_000.0).is_none());
    }

    #[test]
    fn detour_respects_budget() {
        // 2 × √(1000² + 2000²) ≈ 4472 m > 1.5 × 2000 m.
        let model = model_with(RiskDatasets {
            safe_places: vec![police(mid().offset_m(0.0, 2_000.0))],
            ..Default::default()
        });
        let config = RouteConfig::default();
        let generator = RouteAlternativesGenerator::new(&model, &straight, &config);
        assert!(generator.route_via_safe_place(start(), end(), 2_000.0).is_none());
    }

    #[test]
    fn detour_takes_first_eligible_in_dataset_order() {
        let farther = police(mid().offset_m(180.0, 300.0));
        let nearer = police(mid().offset_m(0.0, 100.0));
        let model = model_with(RiskDatasets {
            safe_places: vec![farther.clone(), nearer],
            ..Default::default()
        });
        let config = RouteConfig::default();
        let generator = RouteAlternativesGenerator::new(&model, &straight, &config);
        let detour = generator.route_via_safe_place(start(), end(), 2_000.0).expect("detour");
        assert_eq!(detour.points[1], farther.point);
    }

    #[test]
    fn detour_skips_place_whose_legs_fail() {
        let broken = police(mid().offset_m(0.0, 100.0));
        let working = police(mid().offset_m(180.0, 150.0));
        let model = model_with(RiskDatasets {
            safe_places: vec![broken.clone(), working.clone()],
            ..Default::default()
        });
        let config = RouteConfig::default();
        let bad = broken.point;
        let provider = move |wps: &[GeoPoint]| -> ProviderResult<ProviderRoute> {
            if wps.contains(&bad) { Err(ProviderError::Status(404)) } else { straight(wps) }
        };
        let generator = RouteAlternativesGenerator::new(&model, &provider, &config);
        let detour = generator.route_via_safe_place(start(), end(), 2_000.0).expect("detour");
        assert_eq!(detour.points[1], working.point);
    }

    #[test]
    fn sos_goes_to_nearest_place_of_any_kind() {
        let cafe = SafePlace::new(start().offset_m(45.0, 200.0), SafePlaceKind::Cafe24h, 0.5, 50.0);
        let station = police(start().offset_m(225.0, 800.0));
        let model = model_with(RiskDatasets {
            safe_places: vec![station, cafe.clone()],
            ..Default::default()
        });
        let config = RouteConfig::default();
        let sos = RouteAlternativesGenerator::new(&model, &straight, &config)
            .sos_route(start())
            .expect("sos route");
        assert_eq!(sos.place, cafe);
        assert!((sos.straight_line_m - 200.0).abs() < 1.0);
        assert_eq!(sos.route.points, vec![start(), cafe.point]);
    }

    #[test]
    fn sos_none_without_places_or_provider() {
        let config = RouteConfig::default();
        let empty = empty_model();
        assert!(RouteAlternativesGenerator::new(&empty, &straight, &config).sos_route(start()).is_none());

        let model = model_with(RiskDatasets {
            safe_places: vec![police(start().offset_m(0.0, 300.0))],
            ..Default::default()
        });
        assert!(RouteAlternativesGenerator::new(&model, &failing, &config).sos_route(start()).is_none());
    }
}

// ── Ranking ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod rank {
    use sr_core::{CrowdedArea, LitSegment, RouteConfig};
    use sr_risk::RiskDatasets;

    use super::helpers::*;
    use crate::{RoadType, RouteData, RouteRanker};

    fn route(road_type: RoadType) -> RouteData {
        RouteData::from_points(vec![start(), mid(), end()], WALK_MPS, road_type)
    }

    #[test]
    fn major_lit_beats_identical_minor() {
        let model = empty_model();
        let config = RouteConfig::default();
        let ranker = RouteRanker::new(&model, &config, &[]);

        let ranked = ranker.rank(vec![route(RoadType::Minor), route(RoadType::MajorLit)], now());
        assert_eq!(ranked[0].0.road_type, RoadType::MajorLit);
        assert!(ranked[0].1.total_score < ranked[1].1.total_score);
    }

    #[test]
    fn total_score_formula() {
        let model = empty_model();
        let config = RouteConfig::default();
        let r = route(RoadType::Minor);
        let eval = RouteRanker::new(&model, &config, &[]).evaluate(&r, now());

        // No light, no crowd, minor roads add 0.2.
        assert!((eval.adjusted_risk - 0.8).abs() < 1e-9);
        let expected = 0.8 * 100.0 + r.distance_m / 1000.0;
        assert!((eval.total_score - expected).abs() < 1e-9);
        assert_eq!(eval.road_quality, "poorly lit side streets");
    }

    #[test]
    fn lit_route_gets_full_coverage() {
        let model = model_with(RiskDatasets {
            lit_segments: vec![LitSegment::new(start(), end())],
            ..Default::default()
        });
        let config = RouteConfig::default();
        let ranker = RouteRanker::new(&model, &config, &[]);

        let lit = ranker.evaluate(&route(RoadType::Direct), now());
        assert_eq!(lit.light_coverage_pct, 100.0);
        assert_eq!(lit.adjusted_risk, 0.0);
        assert_eq!(lit.road_quality, "well-lit streets");

        let north = RouteData::from_points(
            vec![start().offset_m(0.0, 1_000.0), end().offset_m(0.0, 1_000.0)],
            WALK_MPS,
            RoadType::Direct,
        );
        let dark = ranker.evaluate(&north, now());
        assert_eq!(dark.light_coverage_pct, 0.0);
        assert!(dark.total_score > lit.total_score);
    }

    #[test]
    fn crossing_street_lights_a_long_segment() {
        // A north-south street crosses a 1 km segment 250 m in; both route
        // endpoints and the midpoint are more than 50 m from it.
        let crossing = start().offset_m(90.0, 250.0);
        let model = model_with(RiskDatasets {
            lit_segments: vec![LitSegment::new(crossing.offset_m(0.0, 200.0), crossing.offset_m(180.0, 200.0))],
            ..Default::default()
        });
        let config = RouteConfig::default();
        let r = RouteData::from_points(vec![start(), start().offset_m(90.0, 1_000.0)], WALK_MPS, RoadType::Direct);

        let lit = RouteRanker::new(&model, &config, &[]).evaluate(&r, now());
        let dark = RouteRanker::new(&empty_model(), &config, &[]).evaluate(&r, now());
        assert_eq!(lit.light_coverage_pct, 100.0);
        assert_eq!(dark.light_coverage_pct, 0.0);
        assert!(lit.adjusted_risk < dark.adjusted_risk);
    }

    #[test]
    fn parallel_street_beyond_proximity_does_not_count() {
        let model = model_with(RiskDatasets {
            lit_segments: vec![LitSegment::new(start().offset_m(0.0, 80.0), end().offset_m(0.0, 80.0))],
            ..Default::default()
        });
        let config = RouteConfig::default();
        let eval = RouteRanker::new(&model, &config, &[]).evaluate(&route(RoadType::Direct), now());
        assert_eq!(eval.light_coverage_pct, 0.0);
    }

    #[test]
    fn crowd_coverage_counts_points() {
        let model = empty_model();
        let config = RouteConfig::default();
        let areas = [CrowdedArea::new(start(), 100.0)];
        let r = RouteData::from_points(vec![start(), end()], WALK_MPS, RoadType::Direct);
        let eval = RouteRanker::new(&model, &config, &areas).evaluate(&r, now());

        assert_eq!(eval.crowd_coverage_pct, 50.0);
        assert!((eval.adjusted_risk - (0.6 - 0.15)).abs() < 1e-9);
    }

    #[test]
    fn adjusted_risk_is_never_negative() {
        let model = empty_model();
        let config = RouteConfig::default();
        let areas = [CrowdedArea::new(mid(), 5_000.0)];
        let eval = RouteRanker::new(&model, &config, &areas).evaluate(&route(RoadType::MajorLit), now());
        assert_eq!(eval.adjusted_risk, 0.0);
        assert_eq!(eval.road_quality, "well-lit main roads");
    }

    #[test]
    fn ties_keep_input_order() {
        let model = empty_model();
        let config = RouteConfig::default();
        let ranker = RouteRanker::new(&model, &config, &[]);
        let mut a = route(RoadType::Direct);
        let mut b = route(RoadType::Direct);
        a.duration_s = 1.0;
        b.duration_s = 2.0;

        let ranked = ranker.rank(vec![a.clone(), b.clone()], now());
        assert_eq!(ranked[0].0.duration_s, 1.0);
        let ranked = ranker.rank(vec![b, a], now());
        assert_eq!(ranked[0].0.duration_s, 2.0);
    }

    #[test]
    fn empty_route_scores_zero() {
        let model = empty_model();
        let config = RouteConfig::default();
        let r = RouteData::new(Vec::new(), 0.0, 0.0, RoadType::Direct);
        let eval = RouteRanker::new(&model, &config, &[]).evaluate(&r, now());
        assert_eq!(eval.total_score, 0.0);
        assert_eq!(eval.light_coverage_pct, 0.0);
        assert_eq!(eval.crowd_coverage_pct, 0.0);
    }
}

// ── Planner ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod planner {
    use std::sync::Arc;

    use sr_core::{Complaint, RouteConfig, SafePlace, SafePlaceKind};
    use sr_risk::{RiskDatasets, RiskModel};

    use super::helpers::*;
    use crate::{RoadProvider, RouteKind, SafeRoutePlanner};

    fn precinct() -> SafePlace {
        SafePlace::new(mid().offset_m(0.0, 100.0), SafePlaceKind::Police, 2.5, 300.0)
            .with_name("Central precinct")
    }

    fn planner(model: RiskModel, provider: Arc<dyn RoadProvider>) -> SafeRoutePlanner {
        SafeRoutePlanner::new(model, provider, RouteConfig::default()).expect("valid config")
    }

    fn model() -> RiskModel {
        model_with(RiskDatasets { safe_places: vec![precinct()], ..Default::default() })
    }

    #[test]
    fn plan_offers_every_candidate_best_first() {
        let options = planner(model(), Arc::new(straight)).plan(start(), end(), now());

        // Direct, two perturbed routes and the precinct detour.
        assert_eq!(options.len(), 4);
        let count = |kind| options.iter().filter(|o| o.kind == kind).count();
        assert_eq!(count(RouteKind::Direct), 1);
        assert_eq!(count(RouteKind::ViaSafePlace), 1);
        assert_eq!(count(RouteKind::Safest) + count(RouteKind::Alternative), 2);
        assert!(count(RouteKind::Safest) <= 1);
        for (i, o) in options.iter().enumerate() {
            if o.kind == RouteKind::Safest {
                assert_eq!(i, 0);
            }
        }
        for w in options.windows(2) {
            assert!(w[0].evaluation.total_score <= w[1].evaluation.total_score);
        }
    }

    #[test]
    fn direct_outranking_alternatives_is_not_called_safest() {
        // Uniform risk and no bonus for perturbed roads: the shortest wins.
        let mut config = RouteConfig::default();
        config.road_bonuses.mixed = 0.0;
        let planner = SafeRoutePlanner::new(empty_model(), Arc::new(straight), config).expect("valid config");
        let options = planner.plan(start(), end(), now());

        assert_eq!(options.len(), 3);
        assert_eq!(options[0].kind, RouteKind::Direct);
        for o in &options[1..] {
            assert_eq!(o.kind, RouteKind::Alternative);
            assert!(o.description.starts_with("Alternative route:"), "{}", o.description);
            assert!(o.evaluation.total_score > options[0].evaluation.total_score);
        }
    }

    #[test]
    fn detour_option_passes_safe_place() {
        let options = planner(model(), Arc::new(straight)).plan(start(), end(), now());

        let detour = options.iter().find(|o| o.kind == RouteKind::ViaSafePlace).expect("detour");
        assert!(detour.passes_safe_place);
        assert!(detour.description.starts_with("Via Central precinct:"), "{}", detour.description);
        assert_eq!(detour.evaluation.road_quality, "passes a police post or hospital");

        let direct = options.iter().find(|o| o.kind == RouteKind::Direct).expect("direct");
        assert!(!direct.passes_safe_place);
        assert!(direct.description.starts_with("Direct route: 2.0 km"), "{}", direct.description);
    }

    #[test]
    fn failing_provider_plans_nothing() {
        let options = planner(model(), Arc::new(failing)).plan(start(), end(), now());
        assert!(options.is_empty());
    }

    #[test]
    fn new_complaint_snapshot_raises_direct_score() {
        let base = planner(empty_model(), Arc::new(straight));
        let direct_score = |p: &SafeRoutePlanner| {
            p.plan(start(), end(), now())
                .into_iter()
                .find(|o| o.kind == RouteKind::Direct)
                .map(|o| o.evaluation.total_score)
                .expect("direct option")
        };
        let before = direct_score(&base);

        let updated = base.with_model(
            base.model().with_complaint(Complaint::new(start(), 5.0, true, Some(now()))),
        );
        assert!(direct_score(&updated) > before);
        // The original planner still sees the old snapshot.
        assert_eq!(direct_score(&base), before);
    }

    #[test]
    fn sos_delegates_to_generator() {
        let sos = planner(model(), Arc::new(straight)).sos(start()).expect("sos");
        assert_eq!(sos.place, precinct());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = RouteConfig { max_alternatives: 0, ..RouteConfig::default() };
        assert!(SafeRoutePlanner::new(empty_model(), Arc::new(straight), config).is_err());
    }
}
