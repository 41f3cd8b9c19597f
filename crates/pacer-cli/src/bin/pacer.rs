//! Request a running route from a Pacer server.

use clap::Parser;
use pacer_cli::{format_summary, parse_location, parse_waypoint, PacerClient};
use pacer_core::{OvershootPolicy, RouteRequest, RouteType};
use serde_json::json;

/// Generate a loop or point-to-point running route
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Pacer server URL
    #[arg(long, default_value = "http://localhost:3000")]
    url: String,

    /// Start as "lat,lng" or a place name
    #[arg(long)]
    start: String,

    /// End as "lat,lng" or a place name (makes the route point-to-point)
    #[arg(long)]
    end: Option<String>,

    /// Target distance in kilometers
    #[arg(long, default_value_t = 5.0)]
    distance: f64,

    /// Waypoint "lat,lng" (repeatable, visited in order)
    #[arg(long = "waypoint")]
    waypoints: Vec<String>,

    /// Include the rectangle corners in the output
    #[arg(long)]
    corners: bool,

    /// Cut waypoint routes that overshoot the target distance
    #[arg(long)]
    truncate: bool,

    /// Print the route GeoJSON instead of a summary
    #[arg(long)]
    geojson: bool,

    /// Request id forwarded as x-request-id
    #[arg(long)]
    request_id: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let waypoints = args
        .waypoints
        .iter()
        .map(|w| parse_waypoint(w))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let request = RouteRequest {
        start: Some(parse_location(&args.start)),
        end: args.end.as_deref().map(parse_location),
        distance: Some(json!(args.distance)),
        route_type: if args.end.is_some() {
            RouteType::Direct
        } else {
            RouteType::Loop
        },
        waypoints,
        include_corners: args.corners,
        overshoot_policy: if args.truncate {
            OvershootPolicy::TruncateAtBudget
        } else {
            OvershootPolicy::KeepFullChain
        },
    };

    let mut client = PacerClient::new(&args.url);
    client.set_request_id(args.request_id);

    let response = match client.generate(&request).await {
        Ok(response) => response,
        Err(e) => {
            eprintln!("Route generation failed: {}", e);
            return Err(e);
        }
    };

    if args.geojson {
        println!("{}", serde_json::to_string_pretty(&response.geojson)?);
    } else {
        print!("{}", format_summary(&response));
    }
    Ok(())
}
