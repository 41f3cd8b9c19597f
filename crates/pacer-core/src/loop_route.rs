//! Closed loop generation around a start point.

use crate::config::EngineConfig;
use crate::error::{Result, RouteError};
use crate::models::{Corners, GeoPoint, LineString, RouteKind, RouteResult};
use crate::providers::{RegionValidator, WalkingDirections};
use crate::synth::{LoopSynthesis, RectangleLoopSynthesizer};
use rand::Rng;

pub struct LoopRouteGenerator<'a> {
    synthesizer: RectangleLoopSynthesizer<'a>,
}

impl<'a> LoopRouteGenerator<'a> {
    pub fn new(
        directions: &'a dyn WalkingDirections,
        region: &'a dyn RegionValidator,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            synthesizer: RectangleLoopSynthesizer::new(directions, region, config),
        }
    }

    /// Loop of roughly `distance_km` that starts and ends at `start`.
    pub async fn generate<R: Rng + Send>(
        &self,
        start: GeoPoint,
        distance_km: f64,
        include_corners: bool,
        rng: &mut R,
    ) -> Result<RouteResult> {
        let target_m = distance_km * 1000.0;
        let synthesis = self.synthesizer.synthesize(start, target_m, rng).await?;
        package_loop(synthesis, include_corners)
    }
}

pub(crate) fn package_loop(synthesis: LoopSynthesis, include_corners: bool) -> Result<RouteResult> {
    if !synthesis.corners.iter().all(GeoPoint::is_finite) {
        return Err(RouteError::InvalidCorners(
            "loop corners must be four finite coordinates".to_string(),
        ));
    }

    let route = synthesis.route;
    if route.coords.is_empty() {
        return Err(RouteError::InvalidRoute(
            "loop route has no coordinates".to_string(),
        ));
    }
    if !route.distance_m.is_finite() {
        return Err(RouteError::InvalidRoute(
            "loop route has no usable distance".to_string(),
        ));
    }

    Ok(RouteResult {
        kind: RouteKind::RectLoop,
        geojson: LineString::new(route.coords),
        actual_dist_m: route.distance_m,
        corners: include_corners.then(|| Corners::from_loop(synthesis.corners)),
        warning: None,
    })
}
