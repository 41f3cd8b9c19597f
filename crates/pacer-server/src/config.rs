//! Server configuration from environment.

use pacer_core::{BoundingBox, EngineConfig, GeoPoint};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    /// Emit logs as JSON lines instead of human-readable text.
    pub log_json: bool,

    pub directions_url: String,
    pub directions_profile: String,
    pub geocoder_url: String,
    pub weather_url: String,
    pub weather_enabled: bool,
    /// Precipitation probability (percent) at which an hour is flagged.
    pub weather_rain_threshold_pct: f64,
    pub weather_forecast_hours: u32,

    pub provider_timeout_s: u64,
    pub provider_max_retries: u32,
    pub retry_base_ms: u64,
    pub retry_max_ms: u64,

    pub snap_cache_max_entries: usize,
    pub snap_cache_ttl_s: u64,

    /// Deadline for a whole route generation request.
    pub request_deadline_s: u64,
    pub land_geojson_path: Option<String>,
    pub restricted_geojson_path: Option<String>,
    /// Fixed RNG seed for reproducible rectangle sizes.
    pub rng_seed: Option<u64>,

    pub engine: EngineConfig,
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = EngineConfig::default();
        let engine = EngineConfig {
            bounds: env::var("PACER_BOUNDS")
                .ok()
                .and_then(|s| parse_bounds(&s))
                .unwrap_or(defaults.bounds),
            max_snap_displacement_m: env_or("PACER_MAX_SNAP_DISPLACEMENT_M", defaults.max_snap_displacement_m),
            min_height_fraction: env_or("PACER_MIN_HEIGHT_FRACTION", defaults.min_height_fraction),
            max_height_fraction: env_or("PACER_MAX_HEIGHT_FRACTION", defaults.max_height_fraction),
            unresolvable_fallback: match env::var("PACER_GEOCODER_FALLBACK") {
                Ok(value) if value.trim().eq_ignore_ascii_case("none") => None,
                Ok(value) => parse_point(&value).or(defaults.unresolvable_fallback),
                Err(_) => defaults.unresolvable_fallback,
            },
            sample_interval_m: env_or("PACER_SAMPLE_INTERVAL_M", defaults.sample_interval_m),
        };

        Self {
            server_port: env_or("PACER_PORT", 3000),
            log_json: env_flag("PACER_LOG_JSON"),
            directions_url: env::var("PACER_DIRECTIONS_URL")
                .unwrap_or_else(|_| "https://router.project-osrm.org".to_string()),
            directions_profile: env::var("PACER_DIRECTIONS_PROFILE")
                .unwrap_or_else(|_| "foot".to_string()),
            geocoder_url: env::var("PACER_GEOCODER_URL")
                .unwrap_or_else(|_| "https://www.onemap.gov.sg".to_string()),
            weather_url: env::var("PACER_WEATHER_URL")
                .unwrap_or_else(|_| "https://api.open-meteo.com".to_string()),
            weather_enabled: env::var("PACER_WEATHER_ENABLED")
                .map(|s| parse_flag(&s))
                .unwrap_or(true),
            weather_rain_threshold_pct: env_or("PACER_WEATHER_RAIN_THRESHOLD_PCT", 60.0),
            weather_forecast_hours: env_or("PACER_WEATHER_FORECAST_HOURS", 6),
            provider_timeout_s: env_or("PACER_PROVIDER_TIMEOUT_S", 10),
            provider_max_retries: env_or("PACER_PROVIDER_MAX_RETRIES", 2),
            retry_base_ms: env_or("PACER_RETRY_BASE_MS", 200),
            retry_max_ms: env_or("PACER_RETRY_MAX_MS", 2_000),
            snap_cache_max_entries: env_or("PACER_SNAP_CACHE_MAX_ENTRIES", 5_000),
            snap_cache_ttl_s: env_or("PACER_SNAP_CACHE_TTL_S", 3_600),
            request_deadline_s: env_or("PACER_REQUEST_DEADLINE_S", 30),
            land_geojson_path: env::var("PACER_LAND_GEOJSON")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            restricted_geojson_path: env::var("PACER_RESTRICTED_GEOJSON")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            rng_seed: env::var("PACER_RNG_SEED").ok().and_then(|s| s.parse().ok()),
            engine,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|s| parse_flag(&s)).unwrap_or(false)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// `"lat,lng"`
fn parse_point(value: &str) -> Option<GeoPoint> {
    let mut parts = value.split(',').map(|p| p.trim().parse::<f64>());
    let (Some(Ok(lat)), Some(Ok(lng)), None) = (parts.next(), parts.next(), parts.next()) else {
        return None;
    };
    let point = GeoPoint::new(lat, lng);
    point.is_valid().then_some(point)
}

/// `"min_lat,min_lng,max_lat,max_lng"`
fn parse_bounds(value: &str) -> Option<BoundingBox> {
    let parts: Vec<f64> = value
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;
    let [min_lat, min_lng, max_lat, max_lng] = parts.as_slice() else {
        return None;
    };
    if !(min_lat < max_lat && min_lng < max_lng) {
        return None;
    }
    Some(BoundingBox {
        min_lat: *min_lat,
        max_lat: *max_lat,
        min_lng: *min_lng,
        max_lng: *max_lng,
    })
}
