//! Road-provider error type.

use thiserror::Error;

/// Why a [`RoadProvider`](crate::RoadProvider) request produced no route.
///
/// Every variant is recoverable from the engine's point of view: the
/// generator logs it and falls back or drops the candidate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    #[error("provider returned status {0}")]
    Status(u16),

    #[error("provider returned an empty route")]
    EmptyRoute,

    #[error("at least 2 waypoints are required, got {0}")]
    TooFewWaypoints(usize),

    #[error("transport error: {0}")]
    Transport(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;
