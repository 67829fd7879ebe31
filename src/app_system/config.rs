//! Runtime configuration read from the environment.

use std::time::Duration;

use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CHANNEL_BUFFER: usize = 32;

/// Where the composer finds its collaborators and how its actors are sized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerConfig {
    /// Base URL of the order service. `None` keeps orders in memory.
    pub order_api_url: Option<String>,
    /// Catalog endpoint. `None` uses the built-in demo catalog.
    pub catalog_url: Option<String>,
    pub http_timeout: Duration,
    /// Mailbox size of every actor.
    pub channel_buffer: usize,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            order_api_url: None,
            catalog_url: None,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            channel_buffer: DEFAULT_CHANNEL_BUFFER,
        }
    }
}

impl ComposerConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a numeric variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ComposerConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let optional = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let http_timeout_secs = match optional("HTTP_TIMEOUT_SECS") {
            Some(raw) => parse_number::<u64>("HTTP_TIMEOUT_SECS", &raw)?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };
        let channel_buffer = match optional("COMPOSER_CHANNEL_BUFFER") {
            Some(raw) => parse_number::<usize>("COMPOSER_CHANNEL_BUFFER", &raw)?,
            None => DEFAULT_CHANNEL_BUFFER,
        };
        if channel_buffer == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "COMPOSER_CHANNEL_BUFFER".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            order_api_url: optional("ORDER_API_URL"),
            catalog_url: optional("CATALOG_URL"),
            http_timeout: Duration::from_secs(http_timeout_secs),
            channel_buffer,
        })
    }
}

fn parse_number<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ComposerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ComposerConfig::default());
        assert_eq!(config.http_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_reads_every_variable() {
        let config = ComposerConfig::from_lookup(lookup(&[
            ("ORDER_API_URL", "http://localhost:8000/api"),
            ("CATALOG_URL", " https://catalog.example/products "),
            ("HTTP_TIMEOUT_SECS", "5"),
            ("COMPOSER_CHANNEL_BUFFER", "8"),
        ]))
        .unwrap();

        assert_eq!(config.order_api_url.as_deref(), Some("http://localhost:8000/api"));
        assert_eq!(config.catalog_url.as_deref(), Some("https://catalog.example/products"));
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.channel_buffer, 8);
    }

    #[test]
    fn test_blank_url_counts_as_unset() {
        let config = ComposerConfig::from_lookup(lookup(&[("ORDER_API_URL", "  ")])).unwrap();
        assert_eq!(config.order_api_url, None);
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        let err = ComposerConfig::from_lookup(lookup(&[("HTTP_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "HTTP_TIMEOUT_SECS"));

        let err = ComposerConfig::from_lookup(lookup(&[("COMPOSER_CHANNEL_BUFFER", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "COMPOSER_CHANNEL_BUFFER"));
    }
}
