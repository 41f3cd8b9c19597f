//! Request-level route assembly.
//!
//! Validates a [`RouteRequest`] without touching the network, resolves
//! place names, dispatches to the loop or direct generator, chains waypoint
//! legs and reconciles the chained distance against the target, then
//! enforces the service boundary and annotates the result with weather.

use crate::config::EngineConfig;
use crate::error::{Result, RouteError};
use crate::direct_route::DirectRouteGenerator;
use crate::loop_route::LoopRouteGenerator;
use crate::models::{
    GeoPoint, LineString, LocationInput, OvershootPolicy, RouteKind, RouteRequest, RouteResponse,
    RouteResult, RouteType,
};
use crate::providers::Collaborators;
use crate::sampling::sample_every;
use crate::spatial::{append_leg, path_length_m, truncate_path};
use rand::rngs::StdRng;
use serde_json::Value;
use std::sync::Arc;

/// A request that passed validation. Place names are still unresolved.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub start: LocationInput,
    pub end: Option<LocationInput>,
    pub distance_km: f64,
    pub route_type: RouteType,
    pub waypoints: Vec<GeoPoint>,
    pub include_corners: bool,
    pub overshoot_policy: OvershootPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Start,
    End,
}

impl Endpoint {
    fn label(self) -> &'static str {
        match self {
            Endpoint::Start => "starting",
            Endpoint::End => "ending",
        }
    }

    fn unresolvable(self, message: String) -> RouteError {
        match self {
            Endpoint::Start => RouteError::InvalidStartLocation(message),
            Endpoint::End => RouteError::InvalidEndLocation(message),
        }
    }
}

pub struct RouteAssembler {
    collaborators: Collaborators,
    config: Arc<EngineConfig>,
    rng: StdRng,
}

impl RouteAssembler {
    pub fn new(collaborators: Collaborators, config: Arc<EngineConfig>, rng: StdRng) -> Self {
        Self {
            collaborators,
            config,
            rng,
        }
    }

    /// Full pipeline: validate, resolve, generate, check, annotate.
    pub async fn generate(&mut self, request: &RouteRequest) -> Result<RouteResponse> {
        let validated = self.validate(request)?;
        let start = self.resolve(&validated.start, Endpoint::Start).await?;
        let end = match (validated.route_type, &validated.end) {
            (RouteType::Direct, Some(end)) => Some(self.resolve(end, Endpoint::End).await?),
            _ => None,
        };

        tracing::info!(
            route_type = ?validated.route_type,
            distance_km = validated.distance_km,
            waypoints = validated.waypoints.len(),
            "Generating route from {},{}",
            start.lat,
            start.lng
        );

        let result = match (validated.route_type, end, validated.waypoints.is_empty()) {
            (RouteType::Loop, _, true) => {
                LoopRouteGenerator::new(
                    self.collaborators.directions.as_ref(),
                    self.collaborators.region.as_ref(),
                    &self.config,
                )
                .generate(start, validated.distance_km, validated.include_corners, &mut self.rng)
                .await?
            }
            (RouteType::Direct, Some(end), true) => {
                DirectRouteGenerator::new(
                    self.collaborators.directions.as_ref(),
                    self.collaborators.region.as_ref(),
                    &self.config,
                )
                .generate(start, end, validated.distance_km, &mut self.rng)
                .await?
            }
            (_, end, false) => self.chain_waypoints(start, end, &validated).await?,
            (RouteType::Direct, None, true) => {
                return Err(RouteError::InvalidInput(
                    "Please provide an ending location for direct routes".to_string(),
                ))
            }
        };

        self.finish(result).await
    }

    /// Fail-fast checks; performs no collaborator calls.
    pub fn validate(&self, request: &RouteRequest) -> Result<ValidatedRequest> {
        let start = request.start.clone().ok_or_else(|| {
            RouteError::InvalidInput("Please provide a starting location".to_string())
        })?;

        let end = match request.route_type {
            RouteType::Direct => Some(request.end.clone().ok_or_else(|| {
                RouteError::InvalidInput(
                    "Please provide an ending location for direct routes".to_string(),
                )
            })?),
            RouteType::Loop => request.end.clone(),
        };

        let distance_km = parse_distance(request.distance.as_ref()).ok_or_else(|| {
            RouteError::InvalidInput("Distance must be a positive number".to_string())
        })?;

        let mut waypoints = Vec::with_capacity(request.waypoints.len());
        for (idx, raw) in request.waypoints.iter().enumerate() {
            let point = parse_waypoint(raw).ok_or_else(|| {
                RouteError::InvalidWaypoint(format!(
                    "Waypoint {} must have numeric lat and lng within global bounds",
                    idx + 1
                ))
            })?;
            if !self.config.bounds.contains(point) {
                return Err(RouteError::OutsideBoundary(format!(
                    "Waypoint {} ({}, {}) is outside the Singapore service area",
                    idx + 1,
                    point.lat,
                    point.lng
                )));
            }
            waypoints.push(point);
        }

        if let LocationInput::Point(point) = &start {
            self.check_location(*point, Endpoint::Start)?;
        }
        if request.route_type == RouteType::Direct {
            if let Some(LocationInput::Point(point)) = &end {
                self.check_location(*point, Endpoint::End)?;
            }
        }

        Ok(ValidatedRequest {
            start,
            end,
            distance_km,
            route_type: request.route_type,
            waypoints,
            include_corners: request.include_corners,
            overshoot_policy: request.overshoot_policy,
        })
    }

    fn check_location(&self, point: GeoPoint, endpoint: Endpoint) -> Result<()> {
        if !point.is_valid() {
            return Err(RouteError::InvalidInput(format!(
                "The {} location must have numeric lat and lng within global bounds",
                endpoint.label()
            )));
        }
        if self.config.is_unresolvable_fallback(point) {
            return Err(endpoint.unresolvable(format!(
                "The {} location could not be resolved",
                endpoint.label()
            )));
        }
        if !self.config.bounds.contains(point) {
            return Err(RouteError::OutsideBoundary(format!(
                "The {} location ({}, {}) is outside the Singapore service area",
                endpoint.label(),
                point.lat,
                point.lng
            )));
        }
        Ok(())
    }

    async fn resolve(&self, input: &LocationInput, endpoint: Endpoint) -> Result<GeoPoint> {
        let name = match input {
            LocationInput::Point(point) => return Ok(*point),
            LocationInput::Place(name) => name.trim(),
        };
        if name.is_empty() {
            return Err(endpoint.unresolvable(format!(
                "The {} location name is empty",
                endpoint.label()
            )));
        }

        let point = match self.collaborators.geocoder.geocode_place(name).await {
            Ok(Some(point)) => point,
            Ok(None) => {
                return Err(endpoint.unresolvable(format!(
                    "Could not find {} location \"{}\"",
                    endpoint.label(),
                    name
                )))
            }
            Err(err) => {
                tracing::warn!("Geocoding \"{}\" failed: {}", name, err);
                return Err(RouteError::ProviderUnavailable(err.to_string()));
            }
        };
        tracing::debug!("Geocoded \"{}\" to {},{}", name, point.lat, point.lng);
        self.check_location(point, endpoint)?;
        Ok(point)
    }

    /// Walk `[start, ..waypoints, end]` (or back to start for loops) leg by
    /// leg, then extend or cut toward the target distance.
    async fn chain_waypoints(
        &mut self,
        start: GeoPoint,
        end: Option<GeoPoint>,
        request: &ValidatedRequest,
    ) -> Result<RouteResult> {
        let target_m = request.distance_km * 1000.0;
        let (kind, last) = match (request.route_type, end) {
            (RouteType::Direct, Some(end)) => (RouteKind::DirectWithLoop, end),
            _ => (RouteKind::LoopWithWaypoints, start),
        };

        let mut stops = Vec::with_capacity(request.waypoints.len() + 2);
        stops.push(start);
        stops.extend_from_slice(&request.waypoints);
        stops.push(last);

        let directions = self.collaborators.directions.as_ref();
        let mut coords: Vec<[f64; 2]> = Vec::new();
        let mut accumulated_m = 0.0;
        for (leg, pair) in stops.windows(2).enumerate() {
            let segment = match directions.walking_route(pair[0], pair[1], &[]).await {
                Ok(Some(segment)) => segment,
                Ok(None) => {
                    return Err(RouteError::ProviderUnavailable(format!(
                        "no walking route for leg {} of the waypoint chain",
                        leg + 1
                    )))
                }
                Err(err) => return Err(RouteError::ProviderUnavailable(err.to_string())),
            };
            tracing::debug!(leg = leg + 1, distance_m = segment.distance_m, "Chained waypoint leg");
            append_leg(&mut coords, &segment.coords);
            accumulated_m += segment.distance_m;
        }

        let mut warning = None;
        if accumulated_m < target_m {
            let remaining_km = (target_m - accumulated_m) / 1000.0;
            tracing::debug!(remaining_km, "Extending waypoint chain with a loop");
            let extension = LoopRouteGenerator::new(
                directions,
                self.collaborators.region.as_ref(),
                &self.config,
            )
            .generate(last, remaining_km, false, &mut self.rng)
            .await?;
            append_leg(&mut coords, &extension.geojson.coordinates);
            accumulated_m += extension.actual_dist_m;
        } else if accumulated_m > target_m {
            match request.overshoot_policy {
                OvershootPolicy::KeepFullChain => {
                    warning = Some(format!(
                        "Visiting every waypoint takes {:.2} km, more than the requested {:.2} km",
                        accumulated_m / 1000.0,
                        request.distance_km
                    ));
                }
                OvershootPolicy::TruncateAtBudget => {
                    // Provider distances and polyline length differ, so the
                    // cut is made at the same fraction of the polyline.
                    let polyline_m = path_length_m(&coords);
                    let budget_m = polyline_m * target_m / accumulated_m;
                    coords = truncate_path(&coords, budget_m);
                    accumulated_m = target_m;
                }
            }
        }

        Ok(RouteResult {
            kind,
            geojson: LineString::new(coords),
            actual_dist_m: accumulated_m,
            corners: None,
            warning,
        })
    }

    async fn finish(&self, result: RouteResult) -> Result<RouteResponse> {
        let coords = &result.geojson.coordinates;
        if coords.iter().any(|c| !c[0].is_finite() || !c[1].is_finite()) {
            return Err(RouteError::RouteParseError(
                "route geometry contains non-numeric coordinates".to_string(),
            ));
        }
        if let Some(outside) = coords
            .iter()
            .find(|c| !self.config.bounds.contains_lng_lat(**c))
        {
            return Err(RouteError::OutsideBoundary(format!(
                "Route leaves the Singapore service area at ({}, {})",
                outside[1], outside[0]
            )));
        }
        if coords.len() < 2 {
            return Err(RouteError::InsufficientCoords(coords.len()));
        }

        let route_coords: Vec<GeoPoint> = coords.iter().map(|c| GeoPoint::from_lng_lat(*c)).collect();
        let samples = sample_every(coords, self.config.sample_interval_m);
        let weather_warnings = if samples.is_empty() {
            Vec::new()
        } else {
            match self.collaborators.weather.weather_warnings(&samples).await {
                Ok(warnings) => warnings,
                Err(err) => {
                    tracing::warn!("Weather lookup failed, continuing without warnings: {}", err);
                    Vec::new()
                }
            }
        };

        tracing::info!(
            kind = ?result.kind,
            actual_dist_m = result.actual_dist_m,
            points = route_coords.len(),
            "Route generated"
        );

        Ok(RouteResponse {
            success: true,
            kind: result.kind,
            geojson: result.geojson,
            actual_dist: result.actual_dist_m,
            route_coords,
            samples_every_2km: samples,
            weather_warnings,
            corners: result.corners,
            warning: result.warning,
        })
    }
}

/// Distance in kilometers: a finite, positive number or numeric string.
fn parse_distance(value: Option<&Value>) -> Option<f64> {
    let distance = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (distance.is_finite() && distance > 0.0).then_some(distance)
}

fn parse_waypoint(value: &Value) -> Option<GeoPoint> {
    let lat = value.get("lat").and_then(Value::as_f64)?;
    let lng = value
        .get("lng")
        .or_else(|| value.get("lon"))
        .and_then(Value::as_f64)?;
    let point = GeoPoint::new(lat, lng);
    point.is_valid().then_some(point)
}
