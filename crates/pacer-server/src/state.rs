//! Shared application state.

use crate::adapters::{DisabledWeather, OneMapGeocoder, OpenMeteoWeather, OsrmDirections};
use crate::config::Config;
use anyhow::{Context, Result};
use pacer_core::{
    polygons_from_geojson, Collaborators, EngineConfig, Polygon, RegionMask,
    RouteAssembler, WeatherAdvisor,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// Read-only state shared by every request.
pub struct AppState {
    config: Config,
    engine: Arc<EngineConfig>,
    collaborators: Collaborators,
}

impl AppState {
    pub fn new(config: Config, collaborators: Collaborators) -> Self {
        Self {
            engine: Arc::new(config.engine.clone()),
            config,
            collaborators,
        }
    }

    /// Wire the HTTP adapters and load region data described by `config`.
    pub fn from_config(config: Config) -> Result<Self> {
        let region = load_region(&config)?;
        tracing::info!(
            land_polygons = region.land_polygons(),
            restricted_polygons = region.restricted_polygons(),
            "Region data loaded"
        );

        let weather: Arc<dyn WeatherAdvisor> = if config.weather_enabled {
            Arc::new(OpenMeteoWeather::new(&config).context("weather client")?)
        } else {
            tracing::info!("Weather advisories disabled");
            Arc::new(DisabledWeather)
        };

        let collaborators = Collaborators {
            directions: Arc::new(OsrmDirections::new(&config).context("directions client")?),
            region: Arc::new(region),
            geocoder: Arc::new(OneMapGeocoder::new(&config).context("geocoder client")?),
            weather,
        };
        Ok(Self::new(config, collaborators))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A fresh assembler per request. Seeded when `PACER_RNG_SEED` is set.
    pub fn assembler(&self) -> RouteAssembler {
        let rng = match self.config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        RouteAssembler::new(self.collaborators.clone(), self.engine.clone(), rng)
    }
}

fn load_region(config: &Config) -> Result<RegionMask> {
    let land = match &config.land_geojson_path {
        Some(path) => load_polygons(path)?,
        None => Vec::new(),
    };
    let land = if land.is_empty() {
        tracing::warn!("No land polygons configured, treating the service box as land");
        vec![Polygon::from_bounds(&config.engine.bounds)]
    } else {
        land
    };

    let restricted = match &config.restricted_geojson_path {
        Some(path) => load_polygons(path)?,
        None => Vec::new(),
    };
    Ok(RegionMask::new(land, restricted))
}

fn load_polygons(path: &str) -> Result<Vec<Polygon>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading region data from {}", path))?;
    polygons_from_geojson(&text).with_context(|| format!("parsing region data in {}", path))
}
