//! REST API routes.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Extension, Json, Router,
};
use pacer_core::{RouteError, RouteRequest, RouteResponse};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::api::request_id::RequestId;
use crate::state::AppState;

/// Create the API router.
pub fn create_router() -> Router<Arc<AppState>> {
    Router::new().route("/v1/routes/generate", post(generate_route))
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("{0}")]
    MalformedBody(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Route(RouteError::RouteGenerationTimeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Route(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Route(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Route(err) => err.kind(),
            ApiError::MalformedBody(_) => "InvalidInput",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.kind();
        let message = self.to_string();
        if status.is_server_error() {
            tracing::warn!(error, status = status.as_u16(), "Route generation failed: {}", message);
        } else {
            tracing::debug!(error, "Rejected route request: {}", message);
        }

        (
            status,
            Json(json!({
                "success": false,
                "error": error,
                "message": message
            })),
        )
            .into_response()
    }
}

async fn generate_route(
    State(state): State<Arc<AppState>>,
    request_id: Option<Extension<RequestId>>,
    payload: Result<Json<RouteRequest>, JsonRejection>,
) -> Result<Json<RouteResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::MalformedBody(rejection.body_text()))?;

    let deadline_s = state.config().request_deadline_s.max(1);
    let mut assembler = state.assembler();
    let started = std::time::Instant::now();

    let response = tokio::time::timeout(Duration::from_secs(deadline_s), assembler.generate(&request))
        .await
        .map_err(|_| RouteError::RouteGenerationTimeout(deadline_s))??;

    let request_id = request_id.map(|Extension(id)| id.0).unwrap_or_default();
    tracing::info!(
        request_id = %request_id,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Route generated"
    );
    Ok(Json(response))
}
