#![allow(clippy::must_use_candidate)]

pub mod cors;
mod env;
pub mod health;
mod loader;
mod overrides;
pub mod server;
pub mod telemetry;
pub mod upstream;
pub mod uploads;

use serde::Deserialize;

pub use cors::*;
pub use health::*;
pub use server::*;
pub use telemetry::*;
pub use upstream::*;
pub use uploads::*;

/// Top-level Parley configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Listener, CORS and health endpoint settings
    #[serde(default)]
    pub server: ServerConfig,
    /// The OpenAI-compatible completion API being proxied
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Attachment storage and extraction limits
    #[serde(default)]
    pub uploads: UploadsConfig,
    /// Log output settings
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
