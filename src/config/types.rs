//! Configuration Types
//!
//! All knobs are optional with defaults. Credentials are plain `Option`s
//! here; service clients wrap them in `SecretString` at construction. A
//! missing credential disables the dependent source or service, it is never
//! a fatal error.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{endpoints, limits};

/// Root configuration structure
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Google Custom Search credentials (web-search provider)
    #[serde(skip_serializing)]
    pub google_api_key: Option<String>,
    #[serde(skip_serializing)]
    pub google_search_cx: Option<String>,

    /// DigitEyes credentials (barcode lookup provider)
    #[serde(skip_serializing)]
    pub digiteyes_app_key: Option<String>,
    #[serde(skip_serializing)]
    pub digiteyes_signature: Option<String>,

    /// AI service credentials, in dispatch priority order
    #[serde(skip_serializing)]
    pub gemini_api_key: Option<String>,
    #[serde(skip_serializing)]
    pub openai_api_key: Option<String>,
    #[serde(skip_serializing)]
    pub deepseek_api_key: Option<String>,

    /// Pacing delay between external requests (seconds)
    pub api_request_delay: f64,

    /// Maximum retries for rate-limited lookup calls
    pub max_retries: u32,

    /// Nutrition database base URL override
    pub openfoodfacts_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            google_api_key: None,
            google_search_cx: None,
            digiteyes_app_key: None,
            digiteyes_signature: None,
            gemini_api_key: None,
            openai_api_key: None,
            deepseek_api_key: None,
            api_request_delay: limits::DEFAULT_REQUEST_DELAY_SECS,
            max_retries: limits::DEFAULT_MAX_RETRIES,
            openfoodfacts_url: endpoints::OPENFOODFACTS_BASE_URL.to_string(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn redact(value: &Option<String>) -> &'static str {
            if value.is_some() { "[REDACTED]" } else { "unset" }
        }

        f.debug_struct("Config")
            .field("google_api_key", &redact(&self.google_api_key))
            .field("google_search_cx", &redact(&self.google_search_cx))
            .field("digiteyes_app_key", &redact(&self.digiteyes_app_key))
            .field("digiteyes_signature", &redact(&self.digiteyes_signature))
            .field("gemini_api_key", &redact(&self.gemini_api_key))
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("deepseek_api_key", &redact(&self.deepseek_api_key))
            .field("api_request_delay", &self.api_request_delay)
            .field("max_retries", &self.max_retries)
            .field("openfoodfacts_url", &self.openfoodfacts_url)
            .finish()
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `ShelfError::Config` on validation failure.
    pub fn validate(&self) -> crate::types::Result<()> {
        if !self.api_request_delay.is_finite() || self.api_request_delay < 0.0 {
            return Err(crate::types::ShelfError::Config(format!(
                "api_request_delay must be a non-negative number, got {}",
                self.api_request_delay
            )));
        }

        if self.max_retries == 0 {
            return Err(crate::types::ShelfError::Config(
                "max_retries must be greater than 0".to_string(),
            ));
        }

        if self.openfoodfacts_url.is_empty() {
            return Err(crate::types::ShelfError::Config(
                "openfoodfacts_url must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Pacing delay as a `Duration`
    pub fn request_delay(&self) -> Duration {
        Duration::from_secs_f64(self.api_request_delay)
    }

    /// Environment variable names for credentials that are not set
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        let checks: [(&Option<String>, &'static str); 7] = [
            (&self.google_api_key, "GOOGLE_API_KEY"),
            (&self.google_search_cx, "GOOGLE_SEARCH_CX"),
            (&self.openai_api_key, "OPENAI_API_KEY"),
            (&self.gemini_api_key, "GEMINI_API_KEY"),
            (&self.deepseek_api_key, "DEEPSEEK_API_KEY"),
            (&self.digiteyes_app_key, "DIGITEYES_APP_KEY"),
            (&self.digiteyes_signature, "DIGITEYES_SIGNATURE"),
        ];
        for (value, name) in checks {
            if value.as_deref().is_none_or(|v| v.is_empty()) {
                missing.push(name);
            }
        }
        missing
    }

    pub fn has_web_search(&self) -> bool {
        self.google_api_key.is_some() && self.google_search_cx.is_some()
    }

    pub fn has_digiteyes(&self) -> bool {
        self.digiteyes_app_key.is_some() && self.digiteyes_signature.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_request_delay, 1.0);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.openfoodfacts_url, endpoints::OPENFOODFACTS_BASE_URL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config {
            api_request_delay: -1.0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        config.api_request_delay = 1.0;
        config.max_retries = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_credentials_lists_all_when_unset() {
        let missing = Config::default().missing_credentials();
        assert_eq!(missing.len(), 7);
        assert!(missing.contains(&"GOOGLE_API_KEY"));
        assert!(missing.contains(&"DIGITEYES_SIGNATURE"));
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let config = Config {
            openai_api_key: Some("sk-secret".into()),
            ..Config::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
