//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Project config file (shelfwise.toml, if present)
//! 3. Environment variables (unprefixed, fixed allowlist)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::Path;

use tracing::debug;

use super::types::Config;
use crate::types::{Result, ShelfError};

/// Environment variables recognized by the loader
const ENV_KEYS: [&str; 10] = [
    "GOOGLE_API_KEY",
    "GOOGLE_SEARCH_CX",
    "OPENAI_API_KEY",
    "GEMINI_API_KEY",
    "DEEPSEEK_API_KEY",
    "DIGITEYES_APP_KEY",
    "DIGITEYES_SIGNATURE",
    "API_REQUEST_DELAY",
    "MAX_RETRIES",
    "OPENFOODFACTS_URL",
];

/// Default project config file name
const PROJECT_CONFIG_FILE: &str = "shelfwise.toml";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with the full resolution chain:
    /// defaults → project file → env vars
    pub fn load() -> Result<Config> {
        Self::load_from(Path::new(PROJECT_CONFIG_FILE))
    }

    /// Load configuration resolving against a specific config file path
    pub fn load_from(path: &Path) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if path.exists() {
            debug!("Loading config from: {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(Env::raw().only(&ENV_KEYS).lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| ShelfError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = ConfigLoader::load_from(Path::new("/nonexistent/shelfwise.toml")).unwrap();
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.api_request_delay, 1.0);
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            "api_request_delay = 0.25\nmax_retries = 2\nopenfoodfacts_url = \"http://localhost:9999/product/\""
        )
        .unwrap();

        let config = ConfigLoader::load_from(file.path()).unwrap();
        assert_eq!(config.api_request_delay, 0.25);
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.openfoodfacts_url, "http://localhost:9999/product/");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "max_retries = 0").unwrap();

        assert!(ConfigLoader::load_from(file.path()).is_err());
    }
}
