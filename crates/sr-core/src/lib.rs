//! `sr-core` — foundational types for the `saferoute` risk engine.
//!
//! This crate is a dependency of every other `sr-*` crate.  It intentionally
//! has no `sr-*` dependencies and minimal external ones (`chrono`,
//! `rustc-hash` and `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`geo`]       | `GeoPoint`, haversine, point-to-segment distance          |
//! | [`signals`]   | `Incident`, `Complaint`, `SafePlace`, `LitSegment`, …      |
//! | [`time`]      | timestamp parsing, half-life decay                        |
//! | [`config`]    | `RiskConfig`, `RouteConfig`, `ScanConfig`, weight tables  |
//! | [`error`]     | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod signals;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{CategoryWeights, ContextTier, RiskConfig, RoadTypeBonuses, RouteConfig, ScanConfig};
pub use error::{CoreError, CoreResult};
pub use geo::{
    GeoPoint, distance_to_segment_m, polyline_length_m, resample_polyline, segment_distance_m,
};
pub use signals::{Complaint, CrowdedArea, Incident, LitSegment, SafePlace, SafePlaceKind};
pub use time::{half_life_factor, parse_timestamp};
