//! Configuration loading for Scholar.
//!
//! Reads `config.toml` from the data directory (`~/.scholar/` in production)
//! and deserializes it into [`ScholarConfig`]. Falls back to defaults when
//! the file is missing or malformed.

use std::path::{Path, PathBuf};

use scholar_types::config::{ProviderConfig, ScholarConfig};
use secrecy::SecretString;

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "SCHOLAR_DATA_DIR";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("API key not found: set the {var} environment variable")]
    MissingApiKey { var: String },
}

/// Resolve the data directory.
///
/// Priority:
/// 1. `SCHOLAR_DATA_DIR` environment variable
/// 2. `~/.scholar`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".scholar");
    }

    PathBuf::from(".scholar")
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: [`ScholarConfig::default()`].
/// - Unreadable or malformed file: logs a warning and returns the default.
pub async fn load_config(data_dir: &Path) -> ScholarConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ScholarConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ScholarConfig::default();
        }
    };

    match toml::from_str::<ScholarConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ScholarConfig::default()
        }
    }
}

/// Read the provider API key from the environment variable named in the config.
pub fn resolve_api_key(provider: &ProviderConfig) -> Result<SecretString, ConfigError> {
    match std::env::var(&provider.api_key_env) {
        Ok(value) if !value.trim().is_empty() => Ok(SecretString::from(value)),
        _ => Err(ConfigError::MissingApiKey {
            var: provider.api_key_env.clone(),
        }),
    }
}
