//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources:
//! 1. Built-in defaults (Serialized)
//! 2. Config file (ticketd.toml, or an explicit path)
//! 3. Environment variables (TICKETD_* prefix, `__` as section separator)
//! 4. Bare `LLM_API_KEY` / `LLM_PROVIDER` overrides

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::Config;
use crate::types::{Result, TicketError};

/// Default config file path relative to the working directory
const DEFAULT_CONFIG_FILE: &str = "ticketd.toml";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with the full resolution chain:
    /// defaults → file → env vars
    pub fn load() -> Result<Config> {
        Self::load_with_file(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Load configuration, reading the given file if it exists.
    pub fn load_with_file(path: &Path) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if path.exists() {
            debug!("Loading config from: {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        // TICKETD_SERVER__BIND -> server.bind, TICKETD_LLM__API_KEY -> llm.api_key
        figment = figment.merge(Env::prefixed("TICKETD_").split("__").lowercase(true));

        let mut config: Config = figment
            .extract()
            .map_err(|e| TicketError::Config(format!("Configuration error: {}", e)))?;

        Self::apply_env_overrides(&mut config);

        config.validate()?;

        Ok(config)
    }

    /// Bare environment names consumed by the adapter, read once at startup.
    fn apply_env_overrides(config: &mut Config) {
        if let Ok(key) = env::var("LLM_API_KEY")
            && !key.is_empty()
        {
            config.llm.api_key = Some(key);
        }
        if let Ok(provider) = env::var("LLM_PROVIDER")
            && !provider.is_empty()
        {
            config.llm.provider = provider;
        }
    }

    /// Default config file path
    pub fn default_config_path() -> PathBuf {
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = ConfigLoader::load_with_file(Path::new("/nonexistent/ticketd.toml")).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.llm.provider, "openai");
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            r#"
[server]
bind = "0.0.0.0:9090"

[llm]
provider = "anthropic"
timeout_secs = 5
"#
        )
        .unwrap();

        let config = ConfigLoader::load_with_file(file.path()).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:9090");
        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.llm.timeout_secs, 5);
        // Unset sections keep their defaults
        assert_eq!(config.database.path, PathBuf::from("ticketd.db"));
    }

    #[test]
    fn test_invalid_toml_value_is_config_error() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "[llm]\ntimeout_secs = \"soon\"").unwrap();

        let err = ConfigLoader::load_with_file(file.path()).unwrap_err();
        assert!(matches!(err, TicketError::Config(_)));
    }
}
