//! OSRM-compatible pedestrian routing.

use super::{build_client, fetch_json, trim_base_url};
use crate::backoff::{retry, RetryPolicy};
use crate::cache::SnapCache;
use crate::config::Config;
use futures::future::BoxFuture;
use futures::FutureExt;
use pacer_core::{GeoPoint, ProviderError, ProviderResult, WalkingDirections, WalkingSegment};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub(crate) struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
    #[serde(default)]
    waypoints: Vec<OsrmWaypoint>,
}

impl OsrmResponse {
    fn is_no_match(&self) -> bool {
        matches!(self.code.as_str(), "NoRoute" | "NoSegment" | "NoMatch")
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct OsrmWaypoint {
    location: [f64; 2],
}

pub struct OsrmDirections {
    client: Client,
    base_url: String,
    profile: String,
    retry: RetryPolicy,
    snap_cache: SnapCache,
}

impl OsrmDirections {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_client(Duration::from_secs(config.provider_timeout_s.max(1)))?,
            base_url: trim_base_url(&config.directions_url),
            profile: config.directions_profile.clone(),
            retry: RetryPolicy {
                max_retries: config.provider_max_retries,
                base: Duration::from_millis(config.retry_base_ms),
                max: Duration::from_millis(config.retry_max_ms),
            },
            snap_cache: SnapCache::new(
                config.snap_cache_max_entries,
                Duration::from_secs(config.snap_cache_ttl_s),
            ),
        })
    }

    fn route_url(&self, stops: &[GeoPoint]) -> String {
        let path = stops
            .iter()
            .map(|p| format!("{:.6},{:.6}", p.lng, p.lat))
            .collect::<Vec<_>>()
            .join(";");
        format!(
            "{}/route/v1/{}/{}?overview=full&geometries=geojson",
            self.base_url, self.profile, path
        )
    }

    fn nearest_url(&self, point: GeoPoint) -> String {
        format!(
            "{}/nearest/v1/{}/{:.6},{:.6}?number=1",
            self.base_url, self.profile, point.lng, point.lat
        )
    }

    async fn route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        waypoints: &[GeoPoint],
    ) -> ProviderResult<Option<WalkingSegment>> {
        let mut stops = Vec::with_capacity(waypoints.len() + 2);
        stops.push(origin);
        stops.extend_from_slice(waypoints);
        stops.push(destination);
        let url = self.route_url(&stops);

        let response: OsrmResponse = retry(&self.retry, "walking route", || {
            fetch_json(self.client.get(&url), OsrmResponse::is_no_match)
        })
        .await?;
        segment_from_response(response)
    }

    async fn snap(&self, point: GeoPoint) -> ProviderResult<Option<GeoPoint>> {
        if let Some(cached) = self.snap_cache.get(point) {
            return Ok(cached);
        }

        let url = self.nearest_url(point);
        let response: OsrmResponse = retry(&self.retry, "snap to path", || {
            fetch_json(self.client.get(&url), OsrmResponse::is_no_match)
        })
        .await?;
        let snapped = snapped_from_response(response)?;
        self.snap_cache.insert(point, snapped);
        Ok(snapped)
    }
}

impl WalkingDirections for OsrmDirections {
    fn walking_route<'a>(
        &'a self,
        origin: GeoPoint,
        destination: GeoPoint,
        waypoints: &'a [GeoPoint],
    ) -> BoxFuture<'a, ProviderResult<Option<WalkingSegment>>> {
        self.route(origin, destination, waypoints).boxed()
    }

    fn snap_to_walking_path(&self, point: GeoPoint) -> BoxFuture<'_, ProviderResult<Option<GeoPoint>>> {
        self.snap(point).boxed()
    }
}

pub(crate) fn segment_from_response(response: OsrmResponse) -> ProviderResult<Option<WalkingSegment>> {
    if response.is_no_match() {
        return Ok(None);
    }
    if response.code != "Ok" {
        return Err(ProviderError::Decode(format!(
            "routing provider returned {}: {}",
            response.code,
            response.message.unwrap_or_default()
        )));
    }
    Ok(response.routes.into_iter().next().map(|route| WalkingSegment {
        coords: route.geometry.coordinates,
        distance_m: route.distance,
    }))
}

pub(crate) fn snapped_from_response(response: OsrmResponse) -> ProviderResult<Option<GeoPoint>> {
    if response.is_no_match() {
        return Ok(None);
    }
    if response.code != "Ok" {
        return Err(ProviderError::Decode(format!(
            "routing provider returned {}: {}",
            response.code,
            response.message.unwrap_or_default()
        )));
    }
    Ok(response
        .waypoints
        .into_iter()
        .next()
        .map(|w| GeoPoint::from_lng_lat(w.location)))
}
