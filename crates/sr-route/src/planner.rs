//! End-to-end planning: generate, detour, rank, label.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use sr_core::{CoreResult, CrowdedArea, GeoPoint, RouteConfig, SafePlace};
use sr_risk::RiskModel;

use crate::alternatives::SosRoute;
use crate::{
    ExtendedRouteEvaluation, RoadProvider, RoadType, RouteAlternativesGenerator, RouteData,
    RouteKind, RouteOption, RouteRanker,
};

/// Runs the generator → evaluator → ranker pipeline and turns the result
/// into presentable [`RouteOption`]s.
///
/// The planner owns a [`RiskModel`] snapshot.  When the complaint set
/// changes, swap in the new snapshot with [`with_model`](Self::with_model);
/// the provider and configuration are shared.
#[derive(Clone)]
pub struct SafeRoutePlanner {
    model: RiskModel,
    provider: Arc<dyn RoadProvider>,
    config: Arc<RouteConfig>,
    crowded_areas: Arc<[CrowdedArea]>,
}

impl SafeRoutePlanner {
    pub fn new(model: RiskModel, provider: Arc<dyn RoadProvider>, config: RouteConfig) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self {
            model,
            provider,
            config: Arc::new(config),
            crowded_areas: Arc::from(Vec::new()),
        })
    }

    pub fn with_crowded_areas(mut self, areas: Vec<CrowdedArea>) -> Self {
        self.crowded_areas = Arc::from(areas);
        self
    }

    /// Same provider and configuration over a different risk snapshot.
    pub fn with_model(&self, model: RiskModel) -> Self {
        Self { model, ..self.clone() }
    }

    pub fn model(&self) -> &RiskModel {
        &self.model
    }

    pub fn config(&self) -> &RouteConfig {
        &self.config
    }

    pub fn generator(&self) -> RouteAlternativesGenerator<'_> {
        RouteAlternativesGenerator::new(&self.model, &*self.provider, &self.config)
    }

    pub fn ranker(&self) -> RouteRanker<'_> {
        RouteRanker::new(&self.model, &self.config, &self.crowded_areas)
    }

    /// Best-first route options from `start` to `end`.
    ///
    /// Every ranked candidate is offered.  A perturbed route is labelled
    /// `Safest` only when it ranks first overall; the rest are plain
    /// `Alternative`s.  Empty when the provider returned nothing usable.
    pub fn plan(&self, start: GeoPoint, end: GeoPoint, now: DateTime<Utc>) -> Vec<RouteOption> {
        let generator = self.generator();
        let mut candidates = generator.generate(start, end);

        let direct_distance_m = candidates
            .iter()
            .find(|r| r.road_type == RoadType::Direct)
            .map_or_else(|| start.distance_m(end), |r| r.distance_m);
        if let Some(detour) = generator.route_via_safe_place(start, end, direct_distance_m) {
            candidates.push(detour);
        }

        let mut options = Vec::with_capacity(candidates.len());
        for (rank, (route, evaluation)) in self.ranker().rank(candidates, now).into_iter().enumerate() {
            let kind = match route.road_type {
                RoadType::Direct => RouteKind::Direct,
                RoadType::ViaSafe => RouteKind::ViaSafePlace,
                _ if rank == 0 => RouteKind::Safest,
                _ => RouteKind::Alternative,
            };
            let via = self.place_along(&route);
            let passes_safe_place = kind == RouteKind::ViaSafePlace || via.is_some();
            let description = describe(kind, &route, &evaluation, via);
            options.push(RouteOption { route, evaluation, kind, description, passes_safe_place });
        }

        log::info!("plan: {} option(s) from {start} to {end}", options.len());
        options
    }

    /// Route to the nearest safe place; see
    /// [`RouteAlternativesGenerator::sos_route`].
    pub fn sos(&self, start: GeoPoint) -> Option<SosRoute> {
        self.generator().sos_route(start)
    }

    /// First safe place whose radius covers a point of `route`.
    fn place_along(&self, route: &RouteData) -> Option<&SafePlace> {
        route
            .points
            .iter()
            .find_map(|p| self.model.safe_places_covering(*p).next().map(|(s, _)| s))
    }
}

impl std::fmt::Debug for SafeRoutePlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafeRoutePlanner")
            .field("model", &self.model)
            .field("crowded_areas", &self.crowded_areas.len())
            .finish_non_exhaustive()
    }
}

fn describe(
    kind: RouteKind,
    route: &RouteData,
    evaluation: &ExtendedRouteEvaluation,
    via: Option<&SafePlace>,
) -> String {
    let head = match (kind, via) {
        (RouteKind::Direct, _) => "Direct route".to_owned(),
        (RouteKind::Safest, _) => "Safest alternative".to_owned(),
        (RouteKind::Alternative, _) => "Alternative route".to_owned(),
        (RouteKind::ViaSafePlace, Some(place)) => format!("Via {}", place.label()),
        (RouteKind::ViaSafePlace, None) => "Via a safe place".to_owned(),
    };
    format!(
        "{head}: {:.1} km, ~{} min, {}",
        route.distance_m / 1000.0,
        (route.duration_s / 60.0).round() as u64,
        evaluation.road_quality
    )
}
