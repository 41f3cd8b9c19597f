//! Argument parsing helpers and human-readable route summaries.

use anyhow::{anyhow, Result};
use pacer_core::{Corners, GeoPoint, LocationInput, RouteResponse};
use serde_json::{json, Value};
use std::fmt::Write as _;

/// `"lat,lng"` becomes a coordinate; anything else is a place name.
pub fn parse_location(value: &str) -> LocationInput {
    match parse_lat_lng(value) {
        Some(point) => LocationInput::Point(point),
        None => LocationInput::Place(value.trim().to_string()),
    }
}

/// Waypoints must be `"lat,lng"`.
pub fn parse_waypoint(value: &str) -> Result<Value> {
    let point = parse_lat_lng(value).ok_or_else(|| anyhow!("waypoint {:?} is not \"lat,lng\"", value))?;
    Ok(json!({ "lat": point.lat, "lng": point.lng }))
}

fn parse_lat_lng(value: &str) -> Option<GeoPoint> {
    let (lat, lng) = value.split_once(',')?;
    let lat = lat.trim().parse::<f64>().ok()?;
    let lng = lng.trim().parse::<f64>().ok()?;
    Some(GeoPoint::new(lat, lng))
}

pub fn format_summary(response: &RouteResponse) -> String {
    let kind = serde_json::to_value(response.kind)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();

    let mut out = String::new();
    let _ = writeln!(out, "Route type:   {}", kind);
    let _ = writeln!(out, "Distance:     {:.2} km", response.actual_dist / 1000.0);
    let _ = writeln!(out, "Points:       {}", response.route_coords.len());
    if let (Some(first), Some(last)) = (response.route_coords.first(), response.route_coords.last()) {
        let _ = writeln!(out, "Start:        {:.5}, {:.5}", first.lat, first.lng);
        let _ = writeln!(out, "Finish:       {:.5}, {:.5}", last.lat, last.lng);
    }

    match response.corners {
        Some(Corners::Loop { a, b, c, d }) => {
            for (label, p) in [("A", a), ("B", b), ("C", c), ("D", d)] {
                let _ = writeln!(out, "Corner {}:     {:.5}, {:.5}", label, p.lat, p.lng);
            }
        }
        Some(Corners::Direct { a, b, c, end }) => {
            for (label, p) in [("A", a), ("B", b), ("C", c)] {
                let _ = writeln!(out, "Corner {}:     {:.5}, {:.5}", label, p.lat, p.lng);
            }
            let _ = writeln!(out, "End:          {:.5}, {:.5}", end.lat, end.lng);
        }
        None => {}
    }

    if let Some(warning) = &response.warning {
        let _ = writeln!(out, "Warning:      {}", warning);
    }
    if response.weather_warnings.is_empty() {
        let _ = writeln!(out, "Weather:      no advisories");
    } else {
        for warning in &response.weather_warnings {
            let _ = writeln!(
                out,
                "Weather:      {:.4}, {:.4} bad at {}",
                warning.lat,
                warning.lng,
                warning.bad_hours.join(", ")
            );
        }
    }
    out
}
