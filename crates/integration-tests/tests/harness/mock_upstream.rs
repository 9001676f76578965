//! Mock OpenAI-compatible upstream for integration tests
//!
//! Serves canned completions and records every chat request it receives

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// Reply used for chat completions unless overridden
pub const DEFAULT_REPLY: &str = "Hello from mock upstream";

/// How the mock answers chat completion requests
#[derive(Clone)]
enum Behavior {
    /// Well-formed completion of the given text
    Reply(String),
    /// Non-success status with a raw body for every route
    Fail(StatusCode, String),
    /// Raw SSE body for streaming requests
    RawStream(String),
}

/// A chat request as seen by the upstream
#[derive(Debug, Clone)]
pub struct Recorded {
    pub authorization: Option<String>,
    pub body: Value,
}

struct MockState {
    behavior: Behavior,
    recorded: Mutex<Vec<Recorded>>,
}

/// Mock upstream that returns predictable responses
pub struct MockUpstream {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

impl MockUpstream {
    /// Start the mock server, returning immediately
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner(Behavior::Reply(DEFAULT_REPLY.to_owned())).await
    }

    /// Start a mock server that replies with `content`
    pub async fn start_with_reply(content: &str) -> anyhow::Result<Self> {
        Self::start_inner(Behavior::Reply(content.to_owned())).await
    }

    /// Start a mock server that rejects every request with `status` and `body`
    pub async fn start_failing(status: StatusCode, body: &str) -> anyhow::Result<Self> {
        Self::start_inner(Behavior::Fail(status, body.to_owned())).await
    }

    /// Start a mock server that streams `body` verbatim
    pub async fn start_with_stream(body: &str) -> anyhow::Result<Self> {
        Self::start_inner(Behavior::RawStream(body.to_owned())).await
    }

    async fn start_inner(behavior: Behavior) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            behavior,
            recorded: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/chat/completions", routing::post(handle_chat_completions))
            .route("/v1/models", routing::get(handle_models))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for configuring the mock as the upstream
    ///
    /// Includes `/v1` since the proxy appends `/chat/completions` and `/models`
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Every chat request received so far
    pub fn requests(&self) -> Vec<Recorded> {
        self.state.recorded.lock().expect("lock").clone()
    }

    /// The most recent chat request
    pub fn last_request(&self) -> Recorded {
        self.requests().pop().expect("upstream received no chat request")
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn chunk(delta: &Value, finish_reason: Option<&str>) -> String {
    let chunk = json!({
        "id": "chatcmpl-test-stream",
        "object": "chat.completion.chunk",
        "created": 1_700_000_000,
        "model": "mock-model-1",
        "choices": [{"index": 0, "delta": delta, "finish_reason": finish_reason}],
    });
    format!("data: {chunk}\n\n")
}

/// Role chunk, one content chunk per word, a `stop` chunk and the sentinel
fn streamed_reply(content: &str) -> String {
    let mut body = chunk(&json!({"role": "assistant", "content": ""}), None);

    let words: Vec<&str> = content.split(' ').collect();
    for (i, word) in words.iter().enumerate() {
        let text = if i + 1 < words.len() { format!("{word} ") } else { (*word).to_owned() };
        body.push_str(&chunk(&json!({"content": text}), None));
    }

    body.push_str(&chunk(&json!({}), Some("stop")));
    body.push_str("data: [DONE]\n\n");
    body
}

async fn handle_chat_completions(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let stream = body["stream"].as_bool().unwrap_or(false);
    let model = body["model"].clone();

    state
        .recorded
        .lock()
        .expect("lock")
        .push(Recorded { authorization, body });

    match (&state.behavior, stream) {
        (Behavior::Fail(status, body), _) => (*status, body.clone()).into_response(),
        (Behavior::RawStream(raw), true) => event_stream(raw.clone()),
        (Behavior::Reply(content), true) => event_stream(streamed_reply(content)),
        (Behavior::Reply(content) | Behavior::RawStream(content), false) => Json(json!({
            "id": "chatcmpl-test-123",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": model,
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop",
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15},
        }))
        .into_response(),
    }
}

fn event_stream(body: String) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/event-stream")], body).into_response()
}

async fn handle_models(State(state): State<Arc<MockState>>) -> Response {
    if let Behavior::Fail(status, body) = &state.behavior {
        return (*status, body.clone()).into_response();
    }

    Json(json!({
        "object": "list",
        "data": [{
            "id": "mock-model-1",
            "object": "model",
            "created": 1_700_000_000,
            "owned_by": "mock",
        }],
    }))
    .into_response()
}
