//! Pacer CLI - command line client for the route service.
//!
//! - `pacer`: request a loop or point-to-point route and print a summary
//!   or the raw GeoJSON.

pub mod client;
pub mod summary;

pub use client::PacerClient;
pub use summary::{format_summary, parse_location, parse_waypoint};
