use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Default `OpenAI` API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// The single OpenAI-compatible completion API requests are proxied to
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamConfig {
    /// Bearer token sent with every upstream request
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL; `/chat/completions` and `/models` are appended to it
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    /// Overall timeout for one upstream request, including the whole stream
    #[serde(default = "default_timeout")]
    pub timeout: String,
    /// Model used when a chat request does not name one
    #[serde(default = "default_model")]
    pub default_model: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            timeout: default_timeout(),
            default_model: default_model(),
        }
    }
}

impl UpstreamConfig {
    /// Parse the configured timeout (e.g. `"120s"`, `"2m"`)
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a valid duration
    pub fn timeout(&self) -> anyhow::Result<Duration> {
        duration_str::parse(&self.timeout)
            .map_err(|e| anyhow::anyhow!("invalid upstream timeout '{}': {e}", self.timeout))
    }
}

#[allow(clippy::expect_used)]
fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("valid default URL")
}

fn default_timeout() -> String {
    "120s".to_owned()
}

fn default_model() -> String {
    "gpt-5.2".to_owned()
}
