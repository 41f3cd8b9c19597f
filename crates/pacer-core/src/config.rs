//! Engine configuration injected into the generators and assembler.

use crate::models::{BoundingBox, GeoPoint};
use crate::sampling::DEFAULT_SAMPLE_INTERVAL_M;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Serviceable region.
    pub bounds: BoundingBox,
    /// Maximum distance a snapped corner may move from its raw position.
    pub max_snap_displacement_m: f64,
    /// Rectangle height as a fraction of a quarter of the target distance.
    pub min_height_fraction: f64,
    pub max_height_fraction: f64,
    /// Coordinate the geocoder falls back to when it cannot resolve a place.
    pub unresolvable_fallback: Option<GeoPoint>,
    pub sample_interval_m: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bounds: BoundingBox::SINGAPORE,
            max_snap_displacement_m: 200.0,
            min_height_fraction: 0.5,
            max_height_fraction: 1.0,
            unresolvable_fallback: Some(GeoPoint::new(1.2903, 103.8520)),
            sample_interval_m: DEFAULT_SAMPLE_INTERVAL_M,
        }
    }
}

impl EngineConfig {
    pub fn is_unresolvable_fallback(&self, point: GeoPoint) -> bool {
        const EPS_DEG: f64 = 1e-6;
        self.unresolvable_fallback.is_some_and(|fallback| {
            (fallback.lat - point.lat).abs() < EPS_DEG && (fallback.lng - point.lng).abs() < EPS_DEG
        })
    }
}
