//! HTTP adapters for the route engine's external collaborators.

pub mod directions;
pub mod geocoder;
pub mod weather;

pub use directions::OsrmDirections;
pub use geocoder::OneMapGeocoder;
pub use weather::{DisabledWeather, OpenMeteoWeather};

use pacer_core::{ProviderError, ProviderResult};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

const MAX_ERROR_BODY_CHARS: usize = 300;

pub(crate) fn build_client(timeout: Duration) -> anyhow::Result<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(concat!("pacer-server/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

pub(crate) fn transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Transport(err.to_string())
    }
}

/// Send a request and decode a JSON body.
///
/// Non-2xx responses are returned as `Status` unless `accept_error` finds a
/// decodable body it wants to handle itself (e.g. OSRM's `NoRoute`).
pub(crate) async fn fetch_json<T, A>(request: RequestBuilder, accept_error: A) -> ProviderResult<T>
where
    T: DeserializeOwned,
    A: Fn(&T) -> bool,
{
    let response = request.send().await.map_err(transport_error)?;
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;

    if !status.is_success() {
        if let Ok(parsed) = serde_json::from_str::<T>(&body) {
            if accept_error(&parsed) {
                return Ok(parsed);
            }
        }
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        });
    }

    serde_json::from_str(&body).map_err(|err| ProviderError::Decode(err.to_string()))
}

pub(crate) fn trim_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
