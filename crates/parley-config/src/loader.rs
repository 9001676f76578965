use std::path::Path;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, deserializes,
    /// applies the legacy environment overrides and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Like [`Config::load`], but a missing file yields the defaults
    ///
    /// # Errors
    ///
    /// Returns an error for anything other than a missing file, and for
    /// invalid environment overrides
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            return Self::load(path);
        }

        tracing::info!(config_path = %path.display(), "config file not found, using defaults");

        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, overrides or validation fail
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let mut config: Self =
            toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream timeout or upload limits are invalid
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_upstream()?;
        self.validate_uploads()?;
        Ok(())
    }

    fn validate_upstream(&self) -> anyhow::Result<()> {
        if self.upstream.timeout()?.is_zero() {
            anyhow::bail!("upstream.timeout must be greater than zero");
        }

        if self.upstream.default_model.trim().is_empty() {
            anyhow::bail!("upstream.default_model must not be empty");
        }

        if self.upstream.api_key.is_none() {
            tracing::warn!("upstream.api_key is not set; upstream requests will be sent without authorization");
        }

        Ok(())
    }

    fn validate_uploads(&self) -> anyhow::Result<()> {
        if self.uploads.max_text_length == 0 {
            anyhow::bail!("uploads.max_text_length must be greater than 0");
        }

        if self.uploads.max_upload_bytes == 0 {
            anyhow::bail!("uploads.max_upload_bytes must be greater than 0");
        }

        Ok(())
    }
}
