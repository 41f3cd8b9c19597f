//! Land mask and restricted-zone validation backed by static polygon data.
//!
//! Polygons are loaded once (GeoJSON `FeatureCollection`, `Polygon` or
//! `MultiPolygon` outer rings) and are read-only afterwards.

use crate::models::{BoundingBox, GeoPoint};
use crate::providers::RegionValidator;
use crate::spatial::{project_local, segments_intersect_2d};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegionDataError {
    #[error("invalid GeoJSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported GeoJSON structure: {0}")]
    Structure(String),
}

/// Closed polygon ring in `[lng, lat]` order with a cached bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    ring: Vec<[f64; 2]>,
    bounds: BoundingBox,
}

impl Polygon {
    /// Returns `None` for rings with fewer than three distinct vertices.
    pub fn new(ring: Vec<[f64; 2]>) -> Option<Self> {
        if ring.len() < 3 {
            return None;
        }
        let mut bounds = BoundingBox {
            min_lat: f64::INFINITY,
            max_lat: f64::NEG_INFINITY,
            min_lng: f64::INFINITY,
            max_lng: f64::NEG_INFINITY,
        };
        for [lng, lat] in &ring {
            if !lng.is_finite() || !lat.is_finite() {
                return None;
            }
            bounds.min_lat = bounds.min_lat.min(*lat);
            bounds.max_lat = bounds.max_lat.max(*lat);
            bounds.min_lng = bounds.min_lng.min(*lng);
            bounds.max_lng = bounds.max_lng.max(*lng);
        }
        Some(Self { ring, bounds })
    }

    pub fn from_bounds(bounds: &BoundingBox) -> Self {
        Self {
            ring: bounds.to_ring(),
            bounds: *bounds,
        }
    }

    /// Ray casting: count intersections with polygon edges.
    pub fn contains(&self, point: GeoPoint) -> bool {
        if !self.bounds.contains(point) {
            return false;
        }

        let mut inside = false;
        let n = self.ring.len();
        let mut j = n - 1;
        for i in 0..n {
            let [xi, yi] = self.ring[i];
            let [xj, yj] = self.ring[j];

            if ((yi > point.lat) != (yj > point.lat))
                && (point.lng < (xj - xi) * (point.lat - yi) / (yj - yi) + xi)
            {
                inside = !inside;
            }
            j = i;
        }

        inside
    }

    /// True when the segment `a -> b` crosses or touches any polygon edge.
    fn crosses_segment(&self, a: GeoPoint, b: GeoPoint) -> bool {
        let seg_min_lat = a.lat.min(b.lat);
        let seg_max_lat = a.lat.max(b.lat);
        let seg_min_lng = a.lng.min(b.lng);
        let seg_max_lng = a.lng.max(b.lng);
        if seg_max_lat < self.bounds.min_lat
            || seg_min_lat > self.bounds.max_lat
            || seg_max_lng < self.bounds.min_lng
            || seg_min_lng > self.bounds.max_lng
        {
            return false;
        }

        let origin = a;
        let a_xy = project_local(a, origin);
        let b_xy = project_local(b, origin);
        self.ring.windows(2).any(|edge| {
            let e1 = project_local(GeoPoint::from_lng_lat(edge[0]), origin);
            let e2 = project_local(GeoPoint::from_lng_lat(edge[1]), origin);
            segments_intersect_2d(a_xy, b_xy, e1, e2)
        })
    }
}

/// Process-wide land and restricted-zone data.
#[derive(Debug, Clone)]
pub struct RegionMask {
    land: Vec<Polygon>,
    restricted: Vec<Polygon>,
}

impl RegionMask {
    /// Treat the whole service box as land, with no restricted zones.
    pub fn from_bounds(bounds: &BoundingBox) -> Self {
        Self {
            land: vec![Polygon::from_bounds(bounds)],
            restricted: Vec::new(),
        }
    }

    pub fn new(land: Vec<Polygon>, restricted: Vec<Polygon>) -> Self {
        Self { land, restricted }
    }

    pub fn with_restricted(mut self, restricted: Vec<Polygon>) -> Self {
        self.restricted = restricted;
        self
    }

    pub fn land_polygons(&self) -> usize {
        self.land.len()
    }

    pub fn restricted_polygons(&self) -> usize {
        self.restricted.len()
    }
}

impl RegionValidator for RegionMask {
    fn is_on_land(&self, point: GeoPoint) -> bool {
        self.land.iter().any(|polygon| polygon.contains(point))
    }

    fn is_route_in_restricted_area(&self, coords: &[[f64; 2]]) -> bool {
        if self.restricted.is_empty() {
            return false;
        }
        let points: Vec<GeoPoint> = coords.iter().map(|c| GeoPoint::from_lng_lat(*c)).collect();
        if points
            .iter()
            .any(|p| self.restricted.iter().any(|zone| zone.contains(*p)))
        {
            return true;
        }
        points.windows(2).any(|pair| {
            self.restricted
                .iter()
                .any(|zone| zone.crosses_segment(pair[0], pair[1]))
        })
    }
}

/// Parse the outer rings of every Polygon/MultiPolygon in a GeoJSON document.
pub fn polygons_from_geojson(text: &str) -> Result<Vec<Polygon>, RegionDataError> {
    let document: Value = serde_json::from_str(text)?;
    let mut polygons = Vec::new();
    collect_polygons(&document, &mut polygons)?;
    Ok(polygons)
}

fn collect_polygons(value: &Value, out: &mut Vec<Polygon>) -> Result<(), RegionDataError> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| RegionDataError::Structure("missing \"type\"".to_string()))?;

    match kind {
        "FeatureCollection" => {
            let features = value
                .get("features")
                .and_then(Value::as_array)
                .ok_or_else(|| RegionDataError::Structure("missing \"features\"".to_string()))?;
            for feature in features {
                collect_polygons(feature, out)?;
            }
        }
        "Feature" => {
            if let Some(geometry) = value.get("geometry").filter(|g| !g.is_null()) {
                collect_polygons(geometry, out)?;
            }
        }
        "Polygon" => {
            let rings = coordinates(value)?;
            if let Some(outer) = rings.first() {
                out.extend(parse_ring(outer)?);
            }
        }
        "MultiPolygon" => {
            let polygons = coordinates(value)?;
            for polygon in polygons {
                if let Some(outer) = polygon.as_array().and_then(|rings| rings.first()) {
                    out.extend(parse_ring(outer)?);
                }
            }
        }
        other => {
            tracing::debug!("Skipping unsupported geometry type {}", other);
        }
    }
    Ok(())
}

fn coordinates(value: &Value) -> Result<&Vec<Value>, RegionDataError> {
    value
        .get("coordinates")
        .and_then(Value::as_array)
        .ok_or_else(|| RegionDataError::Structure("missing \"coordinates\"".to_string()))
}

fn parse_ring(ring: &Value) -> Result<Option<Polygon>, RegionDataError> {
    let vertices = ring
        .as_array()
        .ok_or_else(|| RegionDataError::Structure("ring is not an array".to_string()))?;
    let mut parsed = Vec::with_capacity(vertices.len());
    for vertex in vertices {
        let pair = vertex.as_array().filter(|v| v.len() >= 2);
        let (Some(lng), Some(lat)) = (
            pair.and_then(|v| v[0].as_f64()),
            pair.and_then(|v| v[1].as_f64()),
        ) else {
            return Err(RegionDataError::Structure(format!(
                "invalid vertex {}",
                vertex
            )));
        };
        parsed.push([lng, lat]);
    }
    Ok(Polygon::new(parsed))
}
