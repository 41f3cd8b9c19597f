//! HTTP client for the route API.

use anyhow::{bail, Context, Result};
use pacer_core::{RouteRequest, RouteResponse};
use serde::Deserialize;

/// Client for a running Pacer server.
pub struct PacerClient {
    base_url: String,
    request_id: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl PacerClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_id: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn set_request_id(&mut self, request_id: Option<String>) {
        self.request_id = request_id
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
    }

    /// POST /v1/routes/generate
    pub async fn generate(&self, request: &RouteRequest) -> Result<RouteResponse> {
        let url = format!("{}/v1/routes/generate", self.base_url);
        let mut builder = self.client.post(&url).json(request);
        if let Some(id) = self.request_id.as_deref() {
            builder = builder.header("x-request-id", id);
        }

        let response = builder
            .send()
            .await
            .with_context(|| format!("connecting to {}", url))?;
        let status = response.status();
        let text = response.text().await.context("reading response body")?;

        if !status.is_success() {
            match serde_json::from_str::<ErrorBody>(&text) {
                Ok(body) => bail!("{} ({}): {}", body.error, status.as_u16(), body.message),
                Err(_) => bail!("server returned HTTP {}: {}", status.as_u16(), text),
            }
        }

        serde_json::from_str(&text).context("decoding route response")
    }
}
