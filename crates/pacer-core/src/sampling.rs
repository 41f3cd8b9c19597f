//! Distance-based route sampling for weather lookups.

use crate::models::GeoPoint;
use crate::spatial::haversine_distance;

pub const DEFAULT_SAMPLE_INTERVAL_M: f64 = 2_000.0;

/// Route vertices at roughly every 2 km of cumulative distance.
pub fn sample_every_2km(coords: &[[f64; 2]]) -> Vec<GeoPoint> {
    sample_every(coords, DEFAULT_SAMPLE_INTERVAL_M)
}

/// First vertex plus the first vertex at or past each further multiple of
/// `interval_m` of cumulative great-circle distance.
pub fn sample_every(coords: &[[f64; 2]], interval_m: f64) -> Vec<GeoPoint> {
    let mut points = coords.iter().map(|c| GeoPoint::from_lng_lat(*c));
    let Some(first) = points.next() else {
        return Vec::new();
    };
    let interval_m = if interval_m.is_finite() && interval_m > 0.0 {
        interval_m
    } else {
        DEFAULT_SAMPLE_INTERVAL_M
    };

    let mut samples = vec![first];
    let mut previous = first;
    let mut travelled = 0.0;
    let mut next_mark = interval_m;
    for point in points {
        travelled += haversine_distance(previous, point);
        previous = point;
        if travelled >= next_mark {
            samples.push(point);
            while next_mark <= travelled {
                next_mark += interval_m;
            }
        }
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::meters_to_degrees;

    #[test]
    fn empty_route_has_no_samples() {
        assert!(sample_every_2km(&[]).is_empty());
    }

    #[test]
    fn short_route_only_samples_start() {
        let coords = [[103.8198, 1.3521], [103.8200, 1.3530]];
        let samples = sample_every_2km(&coords);
        assert_eq!(samples, vec![GeoPoint::new(1.3521, 103.8198)]);
    }

    #[test]
    fn samples_every_two_kilometers_along_a_straight_line() {
        // 11 vertices, 500 m apart: marks at 2000 m, 4000 m.
        let (d_lat, _) = meters_to_degrees(500.0, 1.3);
        let coords: Vec<[f64; 2]> = (0..=10)
            .map(|i| [103.8, 1.3 + d_lat * i as f64])
            .collect();
        let samples = sample_every_2km(&coords);
        assert_eq!(samples.len(), 3);
        assert!((samples[1].lat - coords[4][1]).abs() < 1e-9 || (samples[1].lat - coords[5][1]).abs() < 1e-9);
    }

    #[test]
    fn long_jump_emits_one_sample() {
        let coords = [[103.70, 1.30], [103.80, 1.30]];
        // ~11 km in one hop crosses five marks but yields one sample.
        assert_eq!(sample_every_2km(&coords).len(), 2);
    }
}
