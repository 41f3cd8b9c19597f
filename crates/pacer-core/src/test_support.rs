//! In-memory collaborators for unit tests.

use crate::error::ProviderError;
use crate::models::{BoundingBox, GeoPoint, WalkingSegment, WeatherWarning};
use crate::providers::{
    Collaborators, Geocoder, ProviderResult, RegionValidator, WalkingDirections, WeatherAdvisor,
};
use crate::region::RegionMask;
use crate::spatial::path_length_m;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type SnapFn = dyn Fn(GeoPoint) -> ProviderResult<Option<GeoPoint>> + Send + Sync;
type RouteFn =
    dyn Fn(GeoPoint, GeoPoint, &[GeoPoint]) -> ProviderResult<Option<WalkingSegment>> + Send + Sync;

/// Straight-line polyline through `origin`, `waypoints`, `destination`.
pub(crate) fn straight_segment(
    origin: GeoPoint,
    destination: GeoPoint,
    waypoints: &[GeoPoint],
) -> WalkingSegment {
    let coords: Vec<[f64; 2]> = std::iter::once(origin)
        .chain(waypoints.iter().copied())
        .chain(std::iter::once(destination))
        .map(GeoPoint::to_lng_lat)
        .collect();
    let distance_m = path_length_m(&coords);
    WalkingSegment { coords, distance_m }
}

/// Scriptable directions provider. Defaults to identity snapping and
/// straight-line routes.
pub(crate) struct FakeDirections {
    snap: Box<SnapFn>,
    route: Box<RouteFn>,
    pub snap_calls: AtomicUsize,
    pub route_calls: AtomicUsize,
    pub route_log: Mutex<Vec<(GeoPoint, GeoPoint, Vec<GeoPoint>)>>,
}

impl FakeDirections {
    pub fn straight_lines() -> Self {
        Self {
            snap: Box::new(|p: GeoPoint| Ok(Some(p))),
            route: Box::new(|o: GeoPoint, d: GeoPoint, w: &[GeoPoint]| {
                Ok(Some(straight_segment(o, d, w)))
            }),
            snap_calls: AtomicUsize::new(0),
            route_calls: AtomicUsize::new(0),
            route_log: Mutex::new(Vec::new()),
        }
    }

    pub fn with_snap<F>(mut self, snap: F) -> Self
    where
        F: Fn(GeoPoint) -> ProviderResult<Option<GeoPoint>> + Send + Sync + 'static,
    {
        self.snap = Box::new(snap);
        self
    }

    pub fn with_route<F>(mut self, route: F) -> Self
    where
        F: Fn(GeoPoint, GeoPoint, &[GeoPoint]) -> ProviderResult<Option<WalkingSegment>>
            + Send
            + Sync
            + 'static,
    {
        self.route = Box::new(route);
        self
    }

    pub fn routes_requested(&self) -> Vec<(GeoPoint, GeoPoint, Vec<GeoPoint>)> {
        self.route_log.lock().unwrap().clone()
    }
}

impl WalkingDirections for FakeDirections {
    fn walking_route<'a>(
        &'a self,
        origin: GeoPoint,
        destination: GeoPoint,
        waypoints: &'a [GeoPoint],
    ) -> BoxFuture<'a, ProviderResult<Option<WalkingSegment>>> {
        self.route_calls.fetch_add(1, Ordering::SeqCst);
        self.route_log
            .lock()
            .unwrap()
            .push((origin, destination, waypoints.to_vec()));
        let result = (self.route)(origin, destination, waypoints);
        async move { result }.boxed()
    }

    fn snap_to_walking_path(&self, point: GeoPoint) -> BoxFuture<'_, ProviderResult<Option<GeoPoint>>> {
        self.snap_calls.fetch_add(1, Ordering::SeqCst);
        let result = (self.snap)(point);
        async move { result }.boxed()
    }
}

/// Geocoder backed by a fixed name table.
#[derive(Default)]
pub(crate) struct StaticGeocoder {
    places: HashMap<String, GeoPoint>,
    pub fail: bool,
}

impl StaticGeocoder {
    pub fn with_place(mut self, name: &str, point: GeoPoint) -> Self {
        self.places.insert(name.to_lowercase(), point);
        self
    }
}

impl Geocoder for StaticGeocoder {
    fn geocode_place<'a>(&'a self, name: &'a str) -> BoxFuture<'a, ProviderResult<Option<GeoPoint>>> {
        let result = if self.fail {
            Err(ProviderError::Timeout)
        } else {
            Ok(self.places.get(&name.to_lowercase()).copied())
        };
        async move { result }.boxed()
    }
}

/// Weather advisor that flags every sampled point, or fails outright.
#[derive(Default)]
pub(crate) struct FakeWeather {
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl WeatherAdvisor for FakeWeather {
    fn weather_warnings<'a>(
        &'a self,
        points: &'a [GeoPoint],
    ) -> BoxFuture<'a, ProviderResult<Vec<WeatherWarning>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = if self.fail {
            Err(ProviderError::Status {
                status: 503,
                body: "unavailable".to_string(),
            })
        } else {
            Ok(points
                .iter()
                .map(|p| WeatherWarning {
                    lat: p.lat,
                    lng: p.lng,
                    bad_hours: vec!["2026-01-01T15:00".to_string()],
                })
                .collect())
        };
        async move { result }.boxed()
    }
}

/// Collaborators over the given directions fake, the Singapore box as land,
/// an empty geocoder and a working weather fake.
pub(crate) fn collaborators(directions: Arc<FakeDirections>) -> Collaborators {
    Collaborators {
        directions,
        region: Arc::new(RegionMask::from_bounds(&BoundingBox::SINGAPORE)) as Arc<dyn RegionValidator>,
        geocoder: Arc::new(StaticGeocoder::default()),
        weather: Arc::new(FakeWeather::default()),
    }
}
