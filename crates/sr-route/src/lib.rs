//! `sr-route` — turns a risk surface into ranked walking routes.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                   |
//! |------------------|------------------------------------------------------------|
//! | [`provider`]     | `RoadProvider` boundary trait, `ProviderRoute`             |
//! | [`route`]        | `RouteData`, `RoadType`, `RouteOption`, `RouteKind`        |
//! | [`evaluate`]     | `RouteEvaluator`, `RouteEvaluation`, `SegmentRisk`         |
//! | [`alternatives`] | `RouteAlternativesGenerator` (duplicates, detour, SOS)     |
//! | [`rank`]         | `RouteRanker`, `ExtendedRouteEvaluation`                   |
//! | [`planner`]      | `SafeRoutePlanner`: the whole pipeline                     |
//! | [`error`]        | `ProviderError`, `ProviderResult<T>`                       |
//!
//! # Data flow
//!
//! ```text
//! RoadProvider ──► RouteAlternativesGenerator ──► RouteEvaluator ──► RouteRanker ──► Vec<RouteOption>
//!                              ▲                          ▲
//!                              └──────── RiskModel ───────┘
//! ```
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on route and result types. |

pub mod alternatives;
pub mod error;
pub mod evaluate;
pub mod planner;
pub mod provider;
pub mod rank;
pub mod route;

#[cfg(test)]
mod tests;

pub use alternatives::{RouteAlternativesGenerator, SosRoute};
pub use error::{ProviderError, ProviderResult};
pub use evaluate::{RiskLevel, RouteEvaluation, RouteEvaluator, SegmentRisk};
pub use planner::SafeRoutePlanner;
pub use provider::{ProviderRoute, RoadProvider};
pub use rank::{ExtendedRouteEvaluation, RouteRanker};
pub use route::{RoadType, RouteData, RouteKind, RouteOption};
