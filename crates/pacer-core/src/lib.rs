//! Pacer core engine.
//!
//! Synthesizes running routes of a requested distance inside the Singapore
//! service area: rectangle loops snapped to walkable paths, point-to-point
//! routes lengthened with a detour, and waypoint chains reconciled against
//! the target distance.

pub mod assembler;
pub mod config;
pub mod direct_route;
pub mod error;
pub mod loop_route;
pub mod models;
pub mod providers;
pub mod region;
pub mod sampling;
pub mod spatial;
pub mod synth;

#[cfg(test)]
pub(crate) mod test_support;

pub use assembler::{RouteAssembler, ValidatedRequest};
pub use config::EngineConfig;
pub use direct_route::DirectRouteGenerator;
pub use error::{ProviderError, Result, RouteError};
pub use loop_route::LoopRouteGenerator;
pub use models::*;
pub use providers::{
    Collaborators, Geocoder, ProviderResult, RegionValidator, WalkingDirections, WeatherAdvisor,
};
pub use region::{polygons_from_geojson, Polygon, RegionDataError, RegionMask};
pub use sampling::sample_every_2km;
pub use synth::{Orientation, RectangleLoopSynthesizer};
