use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;

use crate::{AnyOrArray, Config, CorsConfig};

impl Config {
    /// Apply the environment variables the chat box has always honoured
    ///
    /// `OPENAI_API_KEY`, `OPENAI_BASE_URL`, `CORS_ORIGINS` (comma separated),
    /// `HOST` and `PORT` take precedence over the file.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an unparseable value
    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    pub(crate) fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.upstream.api_key = Some(SecretString::from(key));
        }

        if let Some(base_url) = lookup("OPENAI_BASE_URL") {
            self.upstream.base_url = base_url
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid OPENAI_BASE_URL '{base_url}': {e}"))?;
        }

        if let Some(origins) = lookup("CORS_ORIGINS") {
            let origins = AnyOrArray::from_values(origins.split(',').map(str::trim).filter(|o| !o.is_empty()));
            self.server.cors.get_or_insert_with(CorsConfig::default).origins = origins;
        }

        let host = lookup("HOST");
        let port = lookup("PORT");
        if host.is_some() || port.is_some() {
            let current = self.server.listen_address();

            let ip = match host {
                Some(host) => host
                    .parse::<IpAddr>()
                    .map_err(|e| anyhow::anyhow!("invalid HOST '{host}': {e}"))?,
                None => current.ip(),
            };
            let port = match port {
                Some(port) => port
                    .parse::<u16>()
                    .map_err(|e| anyhow::anyhow!("invalid PORT '{port}': {e}"))?,
                None => current.port(),
            };

            self.server.listen_address = Some(SocketAddr::new(ip, port));
        }

        Ok(())
    }
}
