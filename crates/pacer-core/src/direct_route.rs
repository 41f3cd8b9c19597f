//! Point-to-point routes lengthened toward a target distance.
//!
//! When the shortest walk between start and end is already long enough it
//! is returned unchanged. Otherwise a rectangle detour sized to the missing
//! distance is synthesized at the start, and the route is stitched from the
//! detour's closing leg (D -> A) and one leg from A through B and C to the
//! end.

use crate::config::EngineConfig;
use crate::error::{Result, RouteError};
use crate::models::{Corners, GeoPoint, LineString, RouteKind, RouteResult};
use crate::providers::{RegionValidator, WalkingDirections};
use crate::spatial::append_leg;
use crate::synth::RectangleLoopSynthesizer;
use rand::Rng;

pub struct DirectRouteGenerator<'a> {
    directions: &'a dyn WalkingDirections,
    synthesizer: RectangleLoopSynthesizer<'a>,
}

impl<'a> DirectRouteGenerator<'a> {
    pub fn new(
        directions: &'a dyn WalkingDirections,
        region: &'a dyn RegionValidator,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            directions,
            synthesizer: RectangleLoopSynthesizer::new(directions, region, config),
        }
    }

    pub async fn generate<R: Rng + Send>(
        &self,
        start: GeoPoint,
        end: GeoPoint,
        distance_km: f64,
        rng: &mut R,
    ) -> Result<RouteResult> {
        let target_m = distance_km * 1000.0;

        let shortest = match self.directions.walking_route(start, end, &[]).await {
            Ok(Some(segment)) => segment,
            Ok(None) => {
                return Err(RouteError::ShortestRouteUnavailable(
                    "no walking route between start and end".to_string(),
                ))
            }
            Err(err) => return Err(RouteError::ProviderUnavailable(err.to_string())),
        };

        if shortest.distance_m >= target_m {
            tracing::info!(
                target_m,
                shortest_m = shortest.distance_m,
                "Shortest walk already covers the target distance"
            );
            let warning = format!(
                "Requested distance of {:.2} km is below the shortest walking route of {:.2} km; returning the shortest route",
                distance_km,
                shortest.distance_m / 1000.0
            );
            return Ok(RouteResult {
                kind: RouteKind::Shortest,
                geojson: LineString::new(shortest.coords),
                actual_dist_m: shortest.distance_m,
                corners: None,
                warning: Some(warning),
            });
        }

        let remaining_m = target_m - shortest.distance_m;
        tracing::debug!(target_m, remaining_m, "Synthesizing detour for direct route");
        let detour = self.synthesizer.synthesize(start, remaining_m, rng).await?;
        let [a, b, c, d] = detour.corners;

        let closing = match self.directions.walking_route(d, a, &[]).await {
            Ok(Some(segment)) => segment,
            Ok(None) => {
                return Err(RouteError::DASegmentFailed(
                    "no walking route from corner D back to corner A".to_string(),
                ))
            }
            Err(err) => return Err(RouteError::DASegmentFailed(err.to_string())),
        };

        let via = [b, c];
        let onward = match self.directions.walking_route(a, end, &via).await {
            Ok(Some(segment)) => segment,
            Ok(None) => {
                return Err(RouteError::ABCEndSegmentFailed(
                    "no walking route from corner A through B and C to the end".to_string(),
                ))
            }
            Err(err) => return Err(RouteError::ABCEndSegmentFailed(err.to_string())),
        };

        let mut coords = Vec::with_capacity(closing.coords.len() + onward.coords.len());
        append_leg(&mut coords, &closing.coords);
        append_leg(&mut coords, &onward.coords);
        let actual_dist_m = closing.distance_m + onward.distance_m;

        Ok(RouteResult {
            kind: RouteKind::CustomDirect,
            geojson: LineString::new(coords),
            actual_dist_m,
            corners: Some(Corners::Direct { a, b, c, end }),
            warning: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::models::{BoundingBox, WalkingSegment};
    use crate::region::RegionMask;
    use crate::test_support::{straight_segment, FakeDirections};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::Ordering;

    const START: GeoPoint = GeoPoint::new(1.3521, 103.8198);
    const END: GeoPoint = GeoPoint::new(1.3535, 103.8265);

    fn mask() -> RegionMask {
        RegionMask::from_bounds(&BoundingBox::SINGAPORE)
    }

    #[tokio::test]
    async fn long_shortest_route_is_returned_with_warning() {
        let directions = FakeDirections::straight_lines();
        let region = mask();
        let config = EngineConfig::default();
        let generator = DirectRouteGenerator::new(&directions, &region, &config);
        let mut rng = StdRng::seed_from_u64(1);

        // Start to end is ~760 m; ask for 0.5 km.
        let result = generator.generate(START, END, 0.5, &mut rng).await.unwrap();
        assert_eq!(result.kind, RouteKind::Shortest);
        assert!(result.warning.is_some());
        assert!(result.corners.is_none());
        assert_eq!(directions.route_calls.load(Ordering::SeqCst), 1);
        assert_eq!(directions.snap_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_shortest_route_fails() {
        let directions = FakeDirections::straight_lines().with_route(|_, _, _| Ok(None));
        let region = mask();
        let config = EngineConfig::default();
        let generator = DirectRouteGenerator::new(&directions, &region, &config);
        let mut rng = StdRng::seed_from_u64(1);

        let result = generator.generate(START, END, 1.0, &mut rng).await;
        assert!(matches!(result, Err(RouteError::ShortestRouteUnavailable(_))));
    }

    #[tokio::test]
    async fn short_route_gets_detour_with_labeled_corners() {
        let directions = FakeDirections::straight_lines();
        let region = mask();
        let config = EngineConfig::default();
        let generator = DirectRouteGenerator::new(&directions, &region, &config);
        let mut rng = StdRng::seed_from_u64(3);

        let result = generator.generate(START, END, 1.0, &mut rng).await.unwrap();
        assert_eq!(result.kind, RouteKind::CustomDirect);
        assert!(result.warning.is_none());

        match result.corners {
            Some(Corners::Direct { a, end, .. }) => {
                assert_eq!(a, START);
                assert_eq!(end, END);
            }
            other => panic!("expected direct corners, got {:?}", other),
        }

        let coords = &result.geojson.coordinates;
        assert_eq!(coords.last(), Some(&END.to_lng_lat()));
        let summed = crate::spatial::path_length_m(coords);
        assert!((summed - result.actual_dist_m).abs() < 1e-6);
    }

    #[tokio::test]
    async fn closing_leg_failure_is_reported() {
        // The D -> A leg is the only request ending at the start that does
        // not also begin there.
        let directions = FakeDirections::straight_lines().with_route(|origin, destination, waypoints| {
            if destination == START && origin != START {
                Ok(None)
            } else {
                Ok(Some(straight_segment(origin, destination, waypoints)))
            }
        });
        let region = mask();
        let config = EngineConfig::default();
        let generator = DirectRouteGenerator::new(&directions, &region, &config);
        let mut rng = StdRng::seed_from_u64(3);

        let result = generator.generate(START, END, 1.0, &mut rng).await;
        assert!(matches!(result, Err(RouteError::DASegmentFailed(_))));
    }

    #[tokio::test]
    async fn onward_leg_error_is_reported() {
        let directions = FakeDirections::straight_lines().with_route(|origin, destination, waypoints| {
            if destination == END && !waypoints.is_empty() {
                Err(ProviderError::Status {
                    status: 502,
                    body: "bad gateway".to_string(),
                })
            } else {
                Ok(Some(straight_segment(origin, destination, waypoints)))
            }
        });
        let region = mask();
        let config = EngineConfig::default();
        let generator = DirectRouteGenerator::new(&directions, &region, &config);
        let mut rng = StdRng::seed_from_u64(3);

        let result = generator.generate(START, END, 1.0, &mut rng).await;
        assert!(matches!(result, Err(RouteError::ABCEndSegmentFailed(_))));
    }

    #[tokio::test]
    async fn detour_is_sized_to_the_remaining_distance() {
        // Shortest walk is reported as 800 m, so the detour targets 1200 m.
        let directions = FakeDirections::straight_lines().with_route(|origin, destination, waypoints| {
            let mut segment: WalkingSegment = straight_segment(origin, destination, waypoints);
            if origin == START && destination == END && waypoints.is_empty() {
                segment.distance_m = 800.0;
            }
            Ok(Some(segment))
        });
        let region = mask();
        let config = EngineConfig::default();
        let generator = DirectRouteGenerator::new(&directions, &region, &config);
        let mut rng = StdRng::seed_from_u64(11);

        let result = generator.generate(START, END, 2.0, &mut rng).await.unwrap();
        assert_eq!(result.kind, RouteKind::CustomDirect);
        // Loop trials are start -> start with three corners, spanning at most
        // a 1200/4 m square around the start.
        let loops: Vec<_> = directions
            .routes_requested()
            .into_iter()
            .filter(|(o, d, w)| *o == START && *d == START && w.len() == 3)
            .collect();
        assert_eq!(loops.len(), 4);
        for (_, _, corners) in loops {
            for corner in corners {
                assert!(crate::spatial::haversine_distance(START, corner) <= 1200.0 / 4.0 * 1.5);
            }
        }
    }
}
