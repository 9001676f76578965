//! Axum route handlers for the chat and model endpoints

use std::sync::Arc;

use axum::extract::{FromRequest, Request, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use futures_util::StreamExt;
use http::{HeaderName, HeaderValue, header};
use serde::Serialize;

use crate::error::LlmError;
use crate::proxy::UpstreamClient;
use crate::types::CompletionRequest;

/// Name the configured upstream is presented under
const DEFAULT_SOURCE_NAME: &str = "Default Source";

/// Create the endpoint router for chat completions and model discovery
pub fn endpoint_router() -> Router<Arc<UpstreamClient>> {
    Router::new()
        .route("/v1/chat", routing::post(chat))
        .route("/v1/chat/stream", routing::post(chat_stream))
        .route("/v1/models", routing::get(list_models))
        .route("/v1/default-source", routing::get(default_source))
}

/// JSON completion request that has passed bounds validation
struct ValidRequest(CompletionRequest);

impl<S> FromRequest<S> for ValidRequest
where
    S: Send + Sync,
{
    type Rejection = LlmError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(request) = Json::<CompletionRequest>::from_request(request, state)
            .await
            .map_err(|rejection| LlmError::Validation(rejection.body_text()))?;

        request.validate()?;

        Ok(Self(request))
    }
}

/// Handle `POST /v1/chat`
async fn chat(
    State(upstream): State<Arc<UpstreamClient>>,
    ValidRequest(mut request): ValidRequest,
) -> Result<Response, LlmError> {
    request.stream = false;
    let payload = upstream.prepare(request);

    tracing::debug!(model = %payload.model, messages = payload.messages.len(), "chat completion");

    let body = upstream.complete(&payload).await?;

    Ok(([(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))], body).into_response())
}

/// Handle `POST /v1/chat/stream`
async fn chat_stream(State(upstream): State<Arc<UpstreamClient>>, ValidRequest(mut request): ValidRequest) -> Response {
    request.stream = true;
    let payload = upstream.prepare(request);

    tracing::debug!(model = %payload.model, messages = payload.messages.len(), "streaming chat completion");

    let events = upstream
        .complete_stream(&payload)
        .map(|event| Event::default().json_data(event));

    let headers = [
        (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
        (HeaderName::from_static("x-accel-buffering"), HeaderValue::from_static("no")),
    ];

    (headers, Sse::new(events).keep_alive(KeepAlive::default())).into_response()
}

/// Handle `GET /v1/models`
async fn list_models(State(upstream): State<Arc<UpstreamClient>>) -> Json<serde_json::Value> {
    Json(upstream.list_models().await)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DefaultSource {
    configured: bool,
    name: &'static str,
    base_url: String,
}

/// Handle `GET /v1/default-source`
async fn default_source(State(upstream): State<Arc<UpstreamClient>>) -> Json<DefaultSource> {
    Json(DefaultSource {
        configured: upstream.is_configured(),
        name: DEFAULT_SOURCE_NAME,
        base_url: upstream.base_url().to_string(),
    })
}
