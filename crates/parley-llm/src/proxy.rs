//! The upstream side of the proxy
//!
//! One pooled [`reqwest::Client`] is shared by every request. Streaming calls
//! run a producer task per request that feeds a bounded channel; dropping the
//! consumer (the client went away) stops the producer and releases the
//! upstream connection.

use std::fmt::Display;

use axum::body::Bytes;
use futures_util::{Stream, StreamExt};
use parley_config::UpstreamConfig;
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use url::Url;

use crate::error::LlmError;
use crate::payload::UpstreamPayload;
use crate::stream::{LineDecoder, Normalizer, StreamState};
use crate::types::{CompletionRequest, NormalizedEvent};

/// Events buffered between the producer task and the client response
const EVENT_BUFFER: usize = 32;

/// Client for the configured OpenAI-compatible API
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    base_url: Url,
    api_key: Option<SecretString>,
    default_model: String,
}

impl UpstreamClient {
    pub fn new(client: Client, config: &UpstreamConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            default_model: config.default_model.clone(),
        }
    }

    /// Build the shared HTTP client with the configured overall request timeout
    pub fn http_client(config: &UpstreamConfig) -> anyhow::Result<Client> {
        let client = Client::builder().timeout(config.timeout()?).build()?;
        Ok(client)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Whether an API key is configured
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Resolve the model and build the upstream payload
    pub fn prepare(&self, mut request: CompletionRequest) -> UpstreamPayload {
        request.apply_default_model(&self.default_model);
        UpstreamPayload::build(&request)
    }

    fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/{path}")
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key.expose_secret()),
            None => builder,
        }
    }

    fn chat_request(&self, payload: &UpstreamPayload) -> RequestBuilder {
        self.authorized(self.client.post(self.endpoint("chat/completions")).json(payload))
    }

    /// Buffered completion; returns the upstream JSON body untouched
    pub async fn complete(&self, payload: &UpstreamPayload) -> Result<Bytes, LlmError> {
        let response = self.chat_request(payload).send().await.map_err(|e| {
            tracing::error!(error = %e, model = %payload.model, "upstream request failed");
            LlmError::UpstreamTransport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, model = %payload.model, "upstream returned error");
            return Err(LlmError::UpstreamHttp { status, body });
        }

        response
            .bytes()
            .await
            .map_err(|e| LlmError::UpstreamTransport(e.to_string()))
    }

    /// Streaming completion as a sequence of normalized events
    ///
    /// Failures are delivered in-band as a single [`NormalizedEvent::Error`].
    /// The stream ends after the first terminal state is reached.
    pub fn complete_stream(&self, payload: &UpstreamPayload) -> impl Stream<Item = NormalizedEvent> + Send + 'static {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let request = self.chat_request(payload);
        let model = payload.model.clone();

        tokio::spawn(async move {
            let state = produce(request, &tx).await;
            tracing::debug!(model = %model, state = ?state, "upstream stream finished");
        });

        futures_util::stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|event| (event, rx)) })
    }

    /// Upstream model list, or an empty list on any failure
    pub async fn list_models(&self) -> Value {
        let request = self.authorized(self.client.get(self.endpoint("models")));

        let response = match request.send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::warn!(status = %response.status(), "model listing failed");
                return empty_model_list();
            }
            Err(e) => {
                tracing::warn!(error = %e, "model listing failed");
                return empty_model_list();
            }
        };

        match response.json::<Value>().await {
            Ok(models) => models,
            Err(e) => {
                tracing::warn!(error = %e, "model listing returned invalid JSON");
                empty_model_list()
            }
        }
    }
}

fn empty_model_list() -> Value {
    json!({ "data": [] })
}

/// Drive one streaming request from `Connecting` to a terminal state
async fn produce(request: RequestBuilder, tx: &mpsc::Sender<NormalizedEvent>) -> StreamState {
    let sent = tokio::select! {
        biased;
        () = tx.closed() => return StreamState::Failed,
        sent = request.send() => sent,
    };

    let response = match sent {
        Ok(response) if response.status().is_success() => response,
        Ok(response) => {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "upstream rejected streaming request");

            let error = LlmError::UpstreamHttp { status, body };
            let _ = tx.send(NormalizedEvent::error(error.to_string())).await;
            return StreamState::Failed;
        }
        Err(e) => {
            tracing::error!(error = %e, "upstream stream request failed");

            let error = LlmError::UpstreamTransport(e.to_string());
            let _ = tx.send(NormalizedEvent::error(error.to_string())).await;
            return StreamState::Failed;
        }
    };

    pump(response.bytes_stream(), tx).await
}

/// Normalize an upstream body into `tx` until a terminal state or client disconnect
pub(crate) async fn pump<S, B, E>(body: S, tx: &mpsc::Sender<NormalizedEvent>) -> StreamState
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let mut body = std::pin::pin!(body);
    let mut decoder = LineDecoder::default();
    let mut normalizer = Normalizer::default();
    normalizer.connected();

    loop {
        let next = tokio::select! {
            biased;
            () = tx.closed() => {
                tracing::debug!("client disconnected, abandoning upstream stream");
                return StreamState::Failed;
            }
            next = body.next() => next,
        };

        let events: Vec<NormalizedEvent> = match next {
            Some(Ok(chunk)) => decoder
                .push(chunk.as_ref())
                .iter()
                .flat_map(|line| normalizer.line(line))
                .collect(),
            Some(Err(e)) => {
                tracing::warn!(error = %e, "upstream stream broke");
                normalizer
                    .fail(LlmError::UpstreamTransport(e.to_string()).to_string())
                    .into_iter()
                    .collect()
            }
            None => {
                let mut events: Vec<_> = decoder.finish().iter().flat_map(|line| normalizer.line(line)).collect();
                events.extend(normalizer.finish());
                events
            }
        };

        for event in events {
            if tx.send(event).await.is_err() {
                return StreamState::Failed;
            }
        }

        if normalizer.state().is_terminal() {
            return normalizer.state();
        }
    }
}
