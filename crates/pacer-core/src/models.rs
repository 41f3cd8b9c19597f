//! Core data models for route synthesis.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A WGS84 coordinate. Internal geometry is always `{lat, lng}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    #[serde(alias = "lon")]
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build from a GeoJSON-ordered `[lng, lat]` pair.
    pub fn from_lng_lat(coord: [f64; 2]) -> Self {
        Self {
            lat: coord[1],
            lng: coord[0],
        }
    }

    pub fn to_lng_lat(self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Within global latitude/longitude bounds.
    pub fn is_valid(&self) -> bool {
        self.is_finite() && (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Serviceable region. Points and routes outside it are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Mainland Singapore plus the southern islands.
    pub const SINGAPORE: BoundingBox = BoundingBox {
        min_lat: 1.130,
        max_lat: 1.470,
        min_lng: 103.600,
        max_lng: 104.100,
    };

    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lng >= self.min_lng
            && point.lng <= self.max_lng
    }

    pub fn contains_lng_lat(&self, coord: [f64; 2]) -> bool {
        self.contains(GeoPoint::from_lng_lat(coord))
    }

    /// Closed `[lng, lat]` ring tracing the box.
    pub fn to_ring(&self) -> Vec<[f64; 2]> {
        vec![
            [self.min_lng, self.min_lat],
            [self.max_lng, self.min_lat],
            [self.max_lng, self.max_lat],
            [self.min_lng, self.max_lat],
            [self.min_lng, self.min_lat],
        ]
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::SINGAPORE
    }
}

/// Result of one walking-directions query: `[lng, lat]` polyline plus the
/// provider's cumulative distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkingSegment {
    pub coords: Vec<[f64; 2]>,
    pub distance_m: f64,
}

/// GeoJSON LineString geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineString {
    #[serde(rename = "type")]
    pub geometry_type: String,
    pub coordinates: Vec<[f64; 2]>,
}

impl LineString {
    pub fn new(coordinates: Vec<[f64; 2]>) -> Self {
        Self {
            geometry_type: "LineString".to_string(),
            coordinates,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteKind {
    RectLoop,
    Shortest,
    CustomDirect,
    DirectWithLoop,
    LoopWithWaypoints,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteType {
    #[default]
    Loop,
    Direct,
}

/// What to do when a waypoint chain is already longer than the target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OvershootPolicy {
    /// Keep every waypoint leg even if the route overshoots.
    #[default]
    KeepFullChain,
    /// Cut the chained path once the target distance is reached.
    TruncateAtBudget,
}

/// Labeled corner set attached to a result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Corners {
    Loop {
        #[serde(rename = "A")]
        a: GeoPoint,
        #[serde(rename = "B")]
        b: GeoPoint,
        #[serde(rename = "C")]
        c: GeoPoint,
        #[serde(rename = "D")]
        d: GeoPoint,
    },
    Direct {
        #[serde(rename = "A")]
        a: GeoPoint,
        #[serde(rename = "B")]
        b: GeoPoint,
        #[serde(rename = "C")]
        c: GeoPoint,
        end: GeoPoint,
    },
}

impl Corners {
    pub fn from_loop(corners: [GeoPoint; 4]) -> Self {
        let [a, b, c, d] = corners;
        Corners::Loop { a, b, c, d }
    }
}

/// A generated route before request-level packaging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    #[serde(rename = "type")]
    pub kind: RouteKind,
    pub geojson: LineString,
    #[serde(rename = "actualDist")]
    pub actual_dist_m: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corners: Option<Corners>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// A request location: coordinates, or a place name for the geocoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationInput {
    Point(GeoPoint),
    Place(String),
}

/// Route generation request as accepted from clients.
///
/// `distance` and `waypoints` stay loosely typed so malformed values are
/// reported as validation errors instead of decode failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    #[serde(default)]
    pub start: Option<LocationInput>,
    #[serde(default)]
    pub end: Option<LocationInput>,
    /// Target distance in kilometers.
    #[serde(default)]
    pub distance: Option<Value>,
    #[serde(default)]
    pub route_type: RouteType,
    #[serde(default)]
    pub waypoints: Vec<Value>,
    #[serde(default)]
    pub include_corners: bool,
    #[serde(default)]
    pub overshoot_policy: OvershootPolicy,
}

/// Advisory weather annotation for one sampled route point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherWarning {
    pub lat: f64,
    pub lng: f64,
    pub bad_hours: Vec<String>,
}

/// Successful route generation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResponse {
    pub success: bool,
    #[serde(rename = "type")]
    pub kind: RouteKind,
    pub geojson: LineString,
    pub actual_dist: f64,
    pub route_coords: Vec<GeoPoint>,
    #[serde(rename = "samplesEvery2km")]
    pub samples_every_2km: Vec<GeoPoint>,
    pub weather_warnings: Vec<WeatherWarning>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corners: Option<Corners>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}
