use axum::{Json, Router, routing::get};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
struct HealthResponse {
    ok: bool,
    version: &'static str,
    base_url: String,
}

/// Liveness route reporting the build version and the upstream it proxies to
pub fn health_router(path: &str, base_url: String) -> Router {
    let response = HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION"),
        base_url,
    };

    Router::new().route(
        path,
        get(move || {
            let response = response.clone();
            async move { Json(response) }
        }),
    )
}
