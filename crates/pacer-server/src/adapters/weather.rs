//! Hourly rain and thunderstorm advisories from Open-Meteo.

use super::{build_client, fetch_json, trim_base_url};
use crate::backoff::{retry, RetryPolicy};
use crate::config::Config;
use chrono::{Duration as TimeDelta, NaiveDateTime, Utc};
use futures::future::{try_join_all, BoxFuture};
use futures::FutureExt;
use pacer_core::{GeoPoint, ProviderResult, WeatherAdvisor, WeatherWarning};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// WMO weather codes from 95 up are thunderstorms.
const THUNDERSTORM_CODE: i64 = 95;

/// Forecast hours are requested in Asia/Singapore local time (UTC+8).
const SINGAPORE_UTC_OFFSET_H: i64 = 8;

const HOUR_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastResponse {
    hourly: HourlyForecast,
}

#[derive(Debug, Deserialize)]
struct HourlyForecast {
    time: Vec<String>,
    #[serde(default)]
    precipitation_probability: Vec<Option<f64>>,
    #[serde(default)]
    weather_code: Vec<Option<i64>>,
}

pub struct OpenMeteoWeather {
    client: Client,
    base_url: String,
    rain_threshold_pct: f64,
    forecast_hours: u32,
    retry: RetryPolicy,
}

impl OpenMeteoWeather {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_client(Duration::from_secs(config.provider_timeout_s.max(1)))?,
            base_url: trim_base_url(&config.weather_url),
            rain_threshold_pct: config.weather_rain_threshold_pct,
            forecast_hours: config.weather_forecast_hours.max(1),
            // Advisory only: one retry at most.
            retry: RetryPolicy {
                max_retries: config.provider_max_retries.min(1),
                base: Duration::from_millis(config.retry_base_ms),
                max: Duration::from_millis(config.retry_max_ms),
            },
        })
    }

    async fn forecast(&self, point: GeoPoint) -> ProviderResult<Option<WeatherWarning>> {
        let url = format!("{}/v1/forecast", self.base_url);
        let latitude = format!("{:.5}", point.lat);
        let longitude = format!("{:.5}", point.lng);
        let hours = self.forecast_hours.to_string();

        let response: ForecastResponse = retry(&self.retry, "weather forecast", || {
            let request = self.client.get(&url).query(&[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("hourly", "precipitation_probability,weather_code"),
                ("forecast_hours", hours.as_str()),
                ("timezone", "Asia/Singapore"),
            ]);
            fetch_json(request, |_: &ForecastResponse| false)
        })
        .await?;

        let bad_hours = bad_hours(&response, self.rain_threshold_pct, singapore_now());
        Ok((!bad_hours.is_empty()).then(|| WeatherWarning {
            lat: point.lat,
            lng: point.lng,
            bad_hours,
        }))
    }

    async fn warnings(&self, points: &[GeoPoint]) -> ProviderResult<Vec<WeatherWarning>> {
        let forecasts = try_join_all(points.iter().map(|p| self.forecast(*p))).await?;
        Ok(forecasts.into_iter().flatten().collect())
    }
}

impl WeatherAdvisor for OpenMeteoWeather {
    fn weather_warnings<'a>(
        &'a self,
        points: &'a [GeoPoint],
    ) -> BoxFuture<'a, ProviderResult<Vec<WeatherWarning>>> {
        self.warnings(points).boxed()
    }
}

/// Used when weather lookups are switched off.
pub struct DisabledWeather;

impl WeatherAdvisor for DisabledWeather {
    fn weather_warnings<'a>(
        &'a self,
        _points: &'a [GeoPoint],
    ) -> BoxFuture<'a, ProviderResult<Vec<WeatherWarning>>> {
        async { Ok(Vec::new()) }.boxed()
    }
}

fn singapore_now() -> NaiveDateTime {
    Utc::now().naive_utc() + TimeDelta::hours(SINGAPORE_UTC_OFFSET_H)
}

/// Forecast hours (`YYYY-MM-DDTHH:MM`, local time) with likely rain or a
/// thunderstorm that have not finished by `now`.
pub(crate) fn bad_hours(
    response: &ForecastResponse,
    rain_threshold_pct: f64,
    now: NaiveDateTime,
) -> Vec<String> {
    let hourly = &response.hourly;
    hourly
        .time
        .iter()
        .enumerate()
        .filter(|(idx, _)| {
            let rainy = hourly
                .precipitation_probability
                .get(*idx)
                .copied()
                .flatten()
                .is_some_and(|p| p >= rain_threshold_pct);
            let stormy = hourly
                .weather_code
                .get(*idx)
                .copied()
                .flatten()
                .is_some_and(|code| code >= THUNDERSTORM_CODE);
            rainy || stormy
        })
        .filter_map(|(_, time)| match NaiveDateTime::parse_from_str(time, HOUR_FORMAT) {
            Ok(hour) => Some(hour),
            Err(err) => {
                tracing::debug!("Skipping unparseable forecast hour {:?}: {}", time, err);
                None
            }
        })
        .filter(|hour| *hour + TimeDelta::hours(1) > now)
        .map(|hour| hour.format(HOUR_FORMAT).to_string())
        .collect()
}
