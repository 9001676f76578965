//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use parley_config::{Config, CorsConfig, HealthConfig, ServerConfig, UpstreamConfig};
use secrecy::SecretString;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults and no API key
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig {
                        enabled: true,
                        ..HealthConfig::default()
                    },
                    ..ServerConfig::default()
                },
                upstream: UpstreamConfig {
                    timeout: "10s".to_owned(),
                    ..UpstreamConfig::default()
                },
                ..Config::default()
            },
        }
    }

    /// Point the proxy at a mock upstream with a test API key
    pub fn with_upstream(mut self, base_url: &str) -> Self {
        self.config.upstream.base_url = base_url.parse().expect("valid URL");
        self.config.upstream.api_key = Some(SecretString::from("test-key"));
        self
    }

    /// Point the proxy at a mock upstream without an API key
    pub fn with_anonymous_upstream(mut self, base_url: &str) -> Self {
        self.config.upstream.base_url = base_url.parse().expect("valid URL");
        self.config.upstream.api_key = None;
        self
    }

    /// Set the model used when a request names none
    pub fn with_default_model(mut self, model: &str) -> Self {
        model.clone_into(&mut self.config.upstream.default_model);
        self
    }

    /// Bound extracted text to `chars` characters
    pub fn with_max_text_length(mut self, chars: usize) -> Self {
        self.config.uploads.max_text_length = chars;
        self
    }

    /// Bound a single upload to `bytes`
    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.config.uploads.max_upload_bytes = bytes;
        self
    }

    /// Set CORS configuration
    pub fn with_cors(mut self, config: CorsConfig) -> Self {
        self.config.server.cors = Some(config);
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
