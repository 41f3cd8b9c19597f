//! Rectangle loop synthesis.
//!
//! A loop of roughly the target distance is approximated by a rectangle
//! anchored at the start. Each of the four orientations is snapped to
//! walkable paths, validated against the land mask and restricted zones,
//! and routed; the orientation whose walked distance is closest to the
//! target wins.

use crate::config::EngineConfig;
use crate::error::{Result, RouteError};
use crate::models::{GeoPoint, WalkingSegment};
use crate::providers::{RegionValidator, WalkingDirections};
use crate::spatial::{haversine_distance, meters_to_degrees, rectangle_corners};
use futures::future::join_all;
use rand::Rng;

/// Quadrant the rectangle is drawn into, relative to the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Orientation {
    /// Evaluation order. Ties go to the earliest entry.
    pub const ALL: [Orientation; 4] = [
        Orientation::NorthEast,
        Orientation::NorthWest,
        Orientation::SouthEast,
        Orientation::SouthWest,
    ];

    /// `(sign_h, sign_w)` for the latitude and longitude axes.
    pub fn signs(self) -> (f64, f64) {
        match self {
            Orientation::NorthEast => (1.0, 1.0),
            Orientation::NorthWest => (1.0, -1.0),
            Orientation::SouthEast => (-1.0, 1.0),
            Orientation::SouthWest => (-1.0, -1.0),
        }
    }
}

/// One validated rectangle trial.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub orientation: Orientation,
    /// `|walked distance - target distance|`
    pub error: f64,
    pub route: WalkingSegment,
    pub corners: [GeoPoint; 4],
}

/// Winning trial: the walked loop and its four snapped corners.
#[derive(Debug, Clone)]
pub struct LoopSynthesis {
    pub orientation: Orientation,
    pub route: WalkingSegment,
    pub corners: [GeoPoint; 4],
}

pub struct RectangleLoopSynthesizer<'a> {
    directions: &'a dyn WalkingDirections,
    region: &'a dyn RegionValidator,
    config: &'a EngineConfig,
}

impl<'a> RectangleLoopSynthesizer<'a> {
    pub fn new(
        directions: &'a dyn WalkingDirections,
        region: &'a dyn RegionValidator,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            directions,
            region,
            config,
        }
    }

    /// Rectangle height in meters: a uniform fraction of a quarter of the target.
    pub fn draw_height<R: Rng>(&self, rng: &mut R, target_m: f64) -> f64 {
        let low = self.config.min_height_fraction;
        let high = self.config.max_height_fraction.max(low);
        let fraction = if high > low {
            rng.random_range(low..=high)
        } else {
            low
        };
        fraction * target_m / 4.0
    }

    /// Best closed loop of roughly `target_m` meters starting and ending at `start`.
    pub async fn synthesize<R: Rng + Send>(
        &self,
        start: GeoPoint,
        target_m: f64,
        rng: &mut R,
    ) -> Result<LoopSynthesis> {
        let height_m = self.draw_height(rng, target_m);
        self.synthesize_with_height(start, target_m, height_m).await
    }

    /// Synthesis with a fixed rectangle height.
    ///
    /// The latitude-derived and longitude-derived offsets of the same height
    /// are used for both sides, so the rectangle is only approximately
    /// `height x height` away from the equator.
    pub async fn synthesize_with_height(
        &self,
        start: GeoPoint,
        target_m: f64,
        height_m: f64,
    ) -> Result<LoopSynthesis> {
        let (dh, dw) = meters_to_degrees(height_m, start.lat);
        tracing::debug!(
            target_m,
            height_m,
            dh,
            dw,
            "Synthesizing rectangle loop at {},{}",
            start.lat,
            start.lng
        );

        let trials = Orientation::ALL
            .map(|orientation| self.try_orientation(start, target_m, dh, dw, orientation));
        let results = join_all(trials).await;

        let best = select_best(results).ok_or(RouteError::NoValidRouteFound)?;
        tracing::info!(
            orientation = ?best.orientation,
            distance_m = best.route.distance_m,
            error_m = best.error,
            "Selected rectangle loop"
        );
        Ok(LoopSynthesis {
            orientation: best.orientation,
            route: best.route,
            corners: best.corners,
        })
    }

    async fn try_orientation(
        &self,
        start: GeoPoint,
        target_m: f64,
        dh: f64,
        dw: f64,
        orientation: Orientation,
    ) -> Option<Candidate> {
        let (sign_h, sign_w) = orientation.signs();
        let raw = rectangle_corners(start, dh, dw, sign_h, sign_w);

        let mut corners = raw;
        for (idx, corner) in raw.iter().enumerate() {
            let snapped = match self.directions.snap_to_walking_path(*corner).await {
                Ok(Some(point)) => point,
                Ok(None) => {
                    tracing::debug!(?orientation, corner = idx, "No walkable path near corner");
                    return None;
                }
                Err(err) => {
                    tracing::warn!(?orientation, corner = idx, "Corner snap failed: {}", err);
                    return None;
                }
            };

            let displacement = haversine_distance(*corner, snapped);
            if displacement > self.config.max_snap_displacement_m {
                tracing::debug!(
                    ?orientation,
                    corner = idx,
                    displacement_m = displacement,
                    "Snapped corner moved too far"
                );
                return None;
            }
            if !self.region.is_on_land(snapped) {
                tracing::debug!(?orientation, corner = idx, "Snapped corner is not on land");
                return None;
            }
            corners[idx] = snapped;
        }

        let route = match self
            .directions
            .walking_route(start, start, &corners[1..])
            .await
        {
            Ok(Some(route)) => route,
            Ok(None) => {
                tracing::debug!(?orientation, "No walking route through corners");
                return None;
            }
            Err(err) => {
                tracing::warn!(?orientation, "Loop route request failed: {}", err);
                return None;
            }
        };

        if self.region.is_route_in_restricted_area(&route.coords) {
            tracing::debug!(?orientation, "Loop enters a restricted area");
            return None;
        }

        let error = (route.distance_m - target_m).abs();
        Some(Candidate {
            orientation,
            error,
            route,
            corners,
        })
    }
}

/// Minimum-error candidate in evaluation order; a later candidate replaces
/// the incumbent only with a strictly smaller error.
pub(crate) fn select_best(
    candidates: impl IntoIterator<Item = Option<Candidate>>,
) -> Option<Candidate> {
    fn rank(error: f64) -> f64 {
        if error.is_nan() {
            f64::INFINITY
        } else {
            error
        }
    }

    candidates
        .into_iter()
        .flatten()
        .fold(None, |best: Option<Candidate>, candidate| match best {
            Some(incumbent) if rank(incumbent.error) <= rank(candidate.error) => Some(incumbent),
            _ => Some(candidate),
        })
}
