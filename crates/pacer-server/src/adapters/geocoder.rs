//! Place-name search against the OneMap API.

use super::{build_client, fetch_json, trim_base_url};
use crate::backoff::{retry, RetryPolicy};
use crate::config::Config;
use futures::future::BoxFuture;
use futures::FutureExt;
use pacer_core::{GeoPoint, Geocoder, ProviderError, ProviderResult};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(rename = "LATITUDE")]
    latitude: String,
    #[serde(rename = "LONGITUDE")]
    longitude: String,
}

pub struct OneMapGeocoder {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl OneMapGeocoder {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_client(Duration::from_secs(config.provider_timeout_s.max(1)))?,
            base_url: trim_base_url(&config.geocoder_url),
            retry: RetryPolicy {
                max_retries: config.provider_max_retries,
                base: Duration::from_millis(config.retry_base_ms),
                max: Duration::from_millis(config.retry_max_ms),
            },
        })
    }

    async fn search(&self, name: &str) -> ProviderResult<Option<GeoPoint>> {
        let url = format!("{}/api/common/elastic/search", self.base_url);
        let response: SearchResponse = retry(&self.retry, "geocode", || {
            let request = self.client.get(&url).query(&[
                ("searchVal", name),
                ("returnGeom", "Y"),
                ("getAddrDetails", "N"),
                ("pageNum", "1"),
            ]);
            fetch_json(request, |_: &SearchResponse| false)
        })
        .await?;
        first_match(response)
    }
}

impl Geocoder for OneMapGeocoder {
    fn geocode_place<'a>(&'a self, name: &'a str) -> BoxFuture<'a, ProviderResult<Option<GeoPoint>>> {
        self.search(name).boxed()
    }
}

pub(crate) fn first_match(response: SearchResponse) -> ProviderResult<Option<GeoPoint>> {
    let Some(result) = response.results.into_iter().next() else {
        return Ok(None);
    };
    let lat = result.latitude.trim().parse::<f64>();
    let lng = result.longitude.trim().parse::<f64>();
    match (lat, lng) {
        (Ok(lat), Ok(lng)) => Ok(Some(GeoPoint::new(lat, lng))),
        _ => Err(ProviderError::Decode(format!(
            "unparseable coordinates {:?}, {:?}",
            result.latitude, result.longitude
        ))),
    }
}
