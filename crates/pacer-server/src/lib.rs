//! Pacer HTTP service: configuration, provider adapters and the route API.

pub mod adapters;
pub mod api;
pub mod backoff;
pub mod cache;
pub mod config;
pub mod state;
