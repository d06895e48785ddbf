//! `sr-risk` — the point risk model and everything that evaluates it in bulk.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                      |
//! |------------|---------------------------------------------------------------|
//! | [`model`]  | `RiskModel` (immutable snapshot + R-trees), `RiskDatasets`    |
//! | [`scan`]   | `GridRiskScanner`, `BoundingBox`, `RiskZone`, `Hotspot`       |
//! | [`zones`]  | `ZoneAverages`, `ZoneKey`: explicit per-cell averages         |
//! | [`loader`] | CSV loaders for the four input datasets                       |
//! | [`error`]  | `RiskError`, `RiskResult<T>`                                  |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                    |
//! |------------|-----------------------------------------------------------|
//! | `parallel` | Grid scans run on Rayon's thread pool (default).          |
//! | `serde`    | Derives `Serialize`/`Deserialize` on result types.        |
//!
//! # Snapshot model
//!
//! A [`RiskModel`] never changes after construction.  When the complaint set
//! changes, build a new model with [`RiskModel::with_complaints`]; readers
//! holding the old model keep a consistent view until they drop it.

mod index;

pub mod error;
pub mod loader;
pub mod model;
pub mod scan;
pub mod zones;


pub use error::{RiskError, RiskResult};
pub use loader::{
    load_complaints_csv, load_complaints_reader, load_incidents_csv, load_incidents_reader,
    load_lit_segments_csv, load_lit_segments_reader, load_safe_places_csv,
    load_safe_places_reader,
};
pub use model::{RiskBreakdown, RiskDatasets, RiskModel};
pub use scan::{BoundingBox, GridRiskScanner, Hotspot, RiskZone};
pub use zones::{ZoneAverages, ZoneKey};
