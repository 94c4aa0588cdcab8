//! Configuration loader for Parley.
//!
//! Reads `config.toml` from the data directory (`~/.parley/` by default) and
//! deserializes it into [`ParleyConfig`]. Falls back to defaults when the file
//! is missing or malformed, so every command works without any setup.

use std::path::Path;

use parley_types::config::ParleyConfig;
use parley_types::error::ConfigError;

use crate::filesystem::config_path;

/// Parse a `config.toml` document.
pub fn parse_config(content: &str) -> Result<ParleyConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: defaults.
/// - Unreadable or unparsable file: a warning, then defaults.
pub async fn load_config(data_dir: &Path) -> ParleyConfig {
    let path = config_path(data_dir);

    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config.toml found, using defaults");
            return ParleyConfig::default();
        }
        Err(err) => {
            let err = ConfigError::Read(err.to_string());
            tracing::warn!(path = %path.display(), error = %err, "using default config");
            return ParleyConfig::default();
        }
    };

    match parse_config(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "using default config");
            ParleyConfig::default()
        }
    }
}
