use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use futures::future::BoxFuture;
use futures::FutureExt;
use pacer_core::{
    BoundingBox, Collaborators, GeoPoint, Geocoder, ProviderError, ProviderResult, RegionMask,
    WalkingDirections, WalkingSegment, WeatherAdvisor, WeatherWarning,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use crate::{api, config::Config, state::AppState};

/// Straight-line routing with optional per-destination distance overrides.
#[derive(Default)]
struct StraightDirections {
    delay: Option<Duration>,
    fail_routes: bool,
    distances: Vec<(GeoPoint, f64)>,
    route_calls: AtomicUsize,
    snap_calls: AtomicUsize,
}

impl WalkingDirections for StraightDirections {
    fn walking_route<'a>(
        &'a self,
        origin: GeoPoint,
        destination: GeoPoint,
        waypoints: &'a [GeoPoint],
    ) -> BoxFuture<'a, ProviderResult<Option<WalkingSegment>>> {
        self.route_calls.fetch_add(1, Ordering::SeqCst);
        let coords: Vec<[f64; 2]> = std::iter::once(origin)
            .chain(waypoints.iter().copied())
            .chain(std::iter::once(destination))
            .map(GeoPoint::to_lng_lat)
            .collect();
        let distance_m = self
            .distances
            .iter()
            .find(|(point, _)| *point == destination)
            .map(|(_, distance)| *distance)
            .unwrap_or_else(|| pacer_core::spatial::path_length_m(&coords));

        async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_routes {
                return Err(ProviderError::Status {
                    status: 503,
                    body: "upstream down".to_string(),
                });
            }
            Ok(Some(WalkingSegment { coords, distance_m }))
        }
        .boxed()
    }

    fn snap_to_walking_path(&self, point: GeoPoint) -> BoxFuture<'_, ProviderResult<Option<GeoPoint>>> {
        self.snap_calls.fetch_add(1, Ordering::SeqCst);
        async move { Ok(Some(point)) }.boxed()
    }
}

struct NoGeocoder;

impl Geocoder for NoGeocoder {
    fn geocode_place<'a>(&'a self, _name: &'a str) -> BoxFuture<'a, ProviderResult<Option<GeoPoint>>> {
        async { Ok(None) }.boxed()
    }
}

struct ClearSkies;

impl WeatherAdvisor for ClearSkies {
    fn weather_warnings<'a>(
        &'a self,
        _points: &'a [GeoPoint],
    ) -> BoxFuture<'a, ProviderResult<Vec<WeatherWarning>>> {
        async { Ok(Vec::new()) }.boxed()
    }
}

fn setup_app(directions: Arc<StraightDirections>, configure: impl FnOnce(&mut Config)) -> axum::Router {
    let mut config = Config::from_env();
    config.rng_seed = Some(7);
    config.request_deadline_s = 30;
    configure(&mut config);

    let collaborators = Collaborators {
        directions,
        region: Arc::new(RegionMask::from_bounds(&BoundingBox::SINGAPORE)),
        geocoder: Arc::new(NoGeocoder),
        weather: Arc::new(ClearSkies),
    };
    api::app(Arc::new(AppState::new(config, collaborators)))
}

fn post_route(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/routes/generate")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

#[tokio::test]
async fn loop_route_end_to_end() {
    let app = setup_app(Arc::new(StraightDirections::default()), |_| {});

    let response = app
        .oneshot(post_route(json!({
            "routeType": "loop",
            "start": { "lat": 1.3521, "lng": 103.8198 },
            "distance": 1
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let body = read_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["type"], json!("rect-loop"));
    assert_eq!(body["geojson"]["type"], json!("LineString"));
    assert!(body["routeCoords"].as_array().unwrap().len() > 1);
    assert!(body["samplesEvery2km"].as_array().is_some());
    assert!(body.get("corners").is_none());
}

#[tokio::test]
async fn loop_route_includes_corners_on_request() {
    let app = setup_app(Arc::new(StraightDirections::default()), |_| {});

    let response = app
        .oneshot(post_route(json!({
            "routeType": "loop",
            "start": { "lat": 1.3521, "lng": 103.8198 },
            "distance": 2,
            "includeCorners": true
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    for key in ["A", "B", "C", "D"] {
        assert!(body["corners"][key]["lat"].is_f64(), "missing corner {}", key);
    }
}

#[tokio::test]
async fn direct_route_end_to_end() {
    let app = setup_app(Arc::new(StraightDirections::default()), |_| {});

    let response = app
        .oneshot(post_route(json!({
            "routeType": "direct",
            "start": { "lat": 1.3521, "lng": 103.8198 },
            "end": { "lat": 1.3535, "lng": 103.8265 },
            "distance": 1
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["type"], json!("custom-direct"));
    assert_eq!(body["corners"]["end"], json!({ "lat": 1.3535, "lng": 103.8265 }));
}

#[tokio::test]
async fn missing_start_is_bad_request() {
    for route_type in ["loop", "direct"] {
        let app = setup_app(Arc::new(StraightDirections::default()), |_| {});
        let response = app
            .oneshot(post_route(json!({
                "routeType": route_type,
                "end": { "lat": 1.3535, "lng": 103.8265 },
                "distance": 5
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["success"], json!(false));
        assert!(body["message"].as_str().unwrap().contains("starting location"));
    }
}

#[tokio::test]
async fn negative_distance_is_bad_request() {
    let app = setup_app(Arc::new(StraightDirections::default()), |_| {});

    let response = app
        .oneshot(post_route(json!({
            "routeType": "loop",
            "start": { "lat": 1.3521, "lng": 103.8198 },
            "distance": -5
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error"], json!("InvalidInput"));
    assert!(body["message"].as_str().unwrap().contains("positive number"));
}

#[tokio::test]
async fn waypoint_outside_singapore_is_rejected() {
    let directions = Arc::new(StraightDirections::default());
    let app = setup_app(directions.clone(), |_| {});

    let response = app
        .oneshot(post_route(json!({
            "routeType": "loop",
            "start": { "lat": 1.3521, "lng": 103.8198 },
            "distance": 5,
            "waypoints": [{ "lat": 2.0, "lng": 105.0 }]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error"], json!("OutsideBoundary"));
    assert_eq!(directions.route_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn exact_waypoint_chain_is_not_extended() {
    let waypoint = GeoPoint::new(1.3530, 103.8230);
    let end = GeoPoint::new(1.3535, 103.8265);
    let directions = Arc::new(StraightDirections {
        distances: vec![(waypoint, 400.0), (end, 600.0)],
        ..StraightDirections::default()
    });
    let app = setup_app(directions.clone(), |_| {});

    let response = app
        .oneshot(post_route(json!({
            "routeType": "direct",
            "start": { "lat": 1.3521, "lng": 103.8198 },
            "end": { "lat": 1.3535, "lng": 103.8265 },
            "waypoints": [{ "lat": 1.3530, "lng": 103.8230 }],
            "distance": 1
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["actualDist"], json!(1000.0));
    assert_eq!(body["type"], json!("direct-with-loop"));
    assert_eq!(directions.route_calls.load(Ordering::SeqCst), 2);
    assert_eq!(directions.snap_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn slow_provider_hits_deadline() {
    let directions = Arc::new(StraightDirections {
        delay: Some(Duration::from_secs(120)),
        ..StraightDirections::default()
    });
    let app = setup_app(directions, |config| config.request_deadline_s = 5);

    let response = app
        .oneshot(post_route(json!({
            "routeType": "direct",
            "start": { "lat": 1.3521, "lng": 103.8198 },
            "end": { "lat": 1.3535, "lng": 103.8265 },
            "distance": 1
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let body = read_json(response).await;
    assert_eq!(body["error"], json!("RouteGenerationTimeout"));
}

#[tokio::test]
async fn provider_outage_is_server_error() {
    let directions = Arc::new(StraightDirections {
        fail_routes: true,
        ..StraightDirections::default()
    });
    let app = setup_app(directions, |_| {});

    let response = app
        .oneshot(post_route(json!({
            "routeType": "direct",
            "start": { "lat": 1.3521, "lng": 103.8198 },
            "end": { "lat": 1.3535, "lng": 103.8265 },
            "distance": 1
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json(response).await;
    assert_eq!(body["error"], json!("ProviderUnavailable"));
}

#[tokio::test]
async fn unknown_place_is_bad_request() {
    let app = setup_app(Arc::new(StraightDirections::default()), |_| {});

    let response = app
        .oneshot(post_route(json!({
            "routeType": "loop",
            "start": "Nowhere In Particular",
            "distance": 3
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error"], json!("InvalidStartLocation"));
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let app = setup_app(Arc::new(StraightDirections::default()), |_| {});

    let response = app
        .oneshot(post_route(json!({
            "routeType": "zigzag",
            "start": { "lat": 1.3521, "lng": 103.8198 },
            "distance": 3
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("InvalidInput"));
}

#[tokio::test]
async fn request_id_is_echoed_and_health_responds() {
    let app = setup_app(Arc::new(StraightDirections::default()), |_| {});

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "trace-me-123")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "trace-me-123"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}
