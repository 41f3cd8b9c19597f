//! Collaborator interfaces consumed by the engine.
//!
//! Network-backed collaborators return boxed futures so they can be held as
//! `Arc<dyn ...>` and swapped for test doubles.

use crate::error::ProviderError;
use crate::models::{GeoPoint, WalkingSegment, WeatherWarning};
use futures::future::BoxFuture;
use std::sync::Arc;

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Third-party pedestrian routing provider.
pub trait WalkingDirections: Send + Sync {
    /// Walking route from `origin` to `destination` through ordered
    /// `waypoints`. `Ok(None)` means no route exists.
    fn walking_route<'a>(
        &'a self,
        origin: GeoPoint,
        destination: GeoPoint,
        waypoints: &'a [GeoPoint],
    ) -> BoxFuture<'a, ProviderResult<Option<WalkingSegment>>>;

    /// Nearest walkable point. `Ok(None)` means nothing walkable nearby.
    fn snap_to_walking_path(&self, point: GeoPoint) -> BoxFuture<'_, ProviderResult<Option<GeoPoint>>>;
}

/// Static land mask and restricted-zone membership tests.
pub trait RegionValidator: Send + Sync {
    fn is_on_land(&self, point: GeoPoint) -> bool;

    /// True when any part of the `[lng, lat]` path enters a restricted zone.
    fn is_route_in_restricted_area(&self, coords: &[[f64; 2]]) -> bool;
}

/// Place-name resolution.
pub trait Geocoder: Send + Sync {
    fn geocode_place<'a>(&'a self, name: &'a str) -> BoxFuture<'a, ProviderResult<Option<GeoPoint>>>;
}

/// Advisory weather annotations for sampled route points.
pub trait WeatherAdvisor: Send + Sync {
    fn weather_warnings<'a>(
        &'a self,
        points: &'a [GeoPoint],
    ) -> BoxFuture<'a, ProviderResult<Vec<WeatherWarning>>>;
}

/// The full set of collaborators a route request needs.
#[derive(Clone)]
pub struct Collaborators {
    pub directions: Arc<dyn WalkingDirections>,
    pub region: Arc<dyn RegionValidator>,
    pub geocoder: Arc<dyn Geocoder>,
    pub weather: Arc<dyn WeatherAdvisor>,
}
