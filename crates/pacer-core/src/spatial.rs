//! Spatial math for route synthesis and distance calculations.

use crate::models::GeoPoint;

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculate distance between two points in meters using Haversine formula.
///
/// Symmetric, and zero for identical points.
pub fn haversine_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let dphi = (b.lat - a.lat).to_radians();
    let dlambda = (b.lng - a.lng).to_radians();
    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Meters per degree of latitude at a given latitude (two-term WGS84 approximation).
pub fn meters_per_deg_lat(lat_deg: f64) -> f64 {
    111_132.92 - 559.82 * (2.0 * lat_deg.to_radians()).cos()
}

const LNG_LEN_EQUATOR: f64 = 111_412.84;

/// Meters per degree of longitude at a given latitude.
pub fn meters_per_deg_lng(lat_deg: f64) -> f64 {
    LNG_LEN_EQUATOR * lat_deg.to_radians().cos()
}

/// Degree offsets `(d_lat, d_lng)` for a metric offset at `latitude`.
///
/// `d_lng` scales with the parallel length relative to the equator, so it
/// shrinks toward the poles and reaches ~0 at |lat| = 90. Total for finite
/// input.
pub fn meters_to_degrees(meters: f64, latitude: f64) -> (f64, f64) {
    let d_lat = meters / meters_per_deg_lat(latitude);
    let d_lng = meters * meters_per_deg_lng(latitude).max(0.0) / LNG_LEN_EQUATOR.powi(2);
    (d_lat, d_lng)
}

/// Rectangle anchored at `origin`: A = origin, B north/south of A, C across
/// from A, D east/west of A.
pub fn rectangle_corners(
    origin: GeoPoint,
    dh: f64,
    dw: f64,
    sign_h: f64,
    sign_w: f64,
) -> [GeoPoint; 4] {
    let a = origin;
    let b = GeoPoint::new(origin.lat + dh * sign_h, origin.lng);
    let c = GeoPoint::new(b.lat, b.lng + dw * sign_w);
    let d = GeoPoint::new(origin.lat, origin.lng + dw * sign_w);
    [a, b, c, d]
}

/// Summed great-circle length of a `[lng, lat]` polyline.
pub fn path_length_m(coords: &[[f64; 2]]) -> f64 {
    coords
        .windows(2)
        .map(|pair| haversine_distance(GeoPoint::from_lng_lat(pair[0]), GeoPoint::from_lng_lat(pair[1])))
        .sum()
}

/// Append a consecutive leg to `path`, dropping the leg's first vertex
/// (the seam shared with the previous leg's last vertex).
pub fn append_leg(path: &mut Vec<[f64; 2]>, leg: &[[f64; 2]]) {
    if path.is_empty() {
        path.extend_from_slice(leg);
    } else {
        path.extend(leg.iter().skip(1));
    }
}

/// Cut a `[lng, lat]` polyline after `budget_m` meters of great-circle
/// length, interpolating the final vertex.
pub fn truncate_path(coords: &[[f64; 2]], budget_m: f64) -> Vec<[f64; 2]> {
    let Some(first) = coords.first() else {
        return Vec::new();
    };
    let mut kept = vec![*first];
    if budget_m <= 0.0 {
        return kept;
    }

    let mut travelled = 0.0;
    for pair in coords.windows(2) {
        let step = haversine_distance(GeoPoint::from_lng_lat(pair[0]), GeoPoint::from_lng_lat(pair[1]));
        if travelled + step >= budget_m {
            let ratio = if step > 0.0 {
                ((budget_m - travelled) / step).clamp(0.0, 1.0)
            } else {
                1.0
            };
            kept.push([
                pair[0][0] + (pair[1][0] - pair[0][0]) * ratio,
                pair[0][1] + (pair[1][1] - pair[0][1]) * ratio,
            ]);
            return kept;
        }
        travelled += step;
        kept.push(pair[1]);
    }
    kept
}

// ==== Local planar projection ====
// Used for edge-crossing tests where a flat approximation around a reference
// latitude is accurate enough.

/// Convert degrees latitude to meters using local scaling.
pub fn lat_to_meters(deg: f64, ref_lat_deg: f64) -> f64 {
    deg * meters_per_deg_lat(ref_lat_deg)
}

/// Convert degrees longitude to meters at a given latitude.
pub fn lng_to_meters(deg: f64, ref_lat_deg: f64) -> f64 {
    deg * meters_per_deg_lng(ref_lat_deg)
}

/// Project a point to local meters around `origin` as `(east, north)`.
pub fn project_local(point: GeoPoint, origin: GeoPoint) -> (f64, f64) {
    (
        lng_to_meters(point.lng - origin.lng, origin.lat),
        lat_to_meters(point.lat - origin.lat, origin.lat),
    )
}

pub fn segments_intersect_2d(
    a1: (f64, f64),
    a2: (f64, f64),
    b1: (f64, f64),
    b2: (f64, f64),
) -> bool {
    // Epsilon in meters, absorbs projection and arithmetic error.
    const EPS_M: f64 = 1e-6;

    fn orient(p: (f64, f64), q: (f64, f64), r: (f64, f64)) -> f64 {
        (q.0 - p.0) * (r.1 - p.1) - (q.1 - p.1) * (r.0 - p.0)
    }

    fn within(a: f64, b: f64, value: f64) -> bool {
        let min = a.min(b) - EPS_M;
        let max = a.max(b) + EPS_M;
        value >= min && value <= max
    }

    fn on_segment(p: (f64, f64), q: (f64, f64), r: (f64, f64)) -> bool {
        within(p.0, q.0, r.0) && within(p.1, q.1, r.1)
    }

    let o1 = orient(a1, a2, b1);
    let o2 = orient(a1, a2, b2);
    let o3 = orient(b1, b2, a1);
    let o4 = orient(b1, b2, a2);

    if o1.abs() <= EPS_M && on_segment(a1, a2, b1) {
        return true;
    }
    if o2.abs() <= EPS_M && on_segment(a1, a2, b2) {
        return true;
    }
    if o3.abs() <= EPS_M && on_segment(b1, b2, a1) {
        return true;
    }
    if o4.abs() <= EPS_M && on_segment(b1, b2, a2) {
        return true;
    }

    let a_crosses = (o1 > EPS_M && o2 < -EPS_M) || (o1 < -EPS_M && o2 > EPS_M);
    let b_crosses = (o3 > EPS_M && o4 < -EPS_M) || (o3 < -EPS_M && o4 > EPS_M);
    a_crosses && b_crosses
}
