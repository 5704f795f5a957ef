//! Configuration management for trendscope
//!
//! This module handles loading and validating configuration from environment variables
//! and TOML files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Trends service client configuration
    pub trends: TrendsConfig,

    /// Dashboard server configuration
    pub server: ServerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Trends service client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendsConfig {
    /// Service root URL
    pub base_url: String,

    /// Host language sent as `hl` (e.g., en-US)
    pub locale: String,

    /// Timezone offset in minutes sent as `tz`
    pub timezone_offset: i32,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// User agent string
    pub user_agent: String,

    /// Lifetime of a cached client handle in seconds
    pub handle_ttl_secs: u64,
}

/// Dashboard server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_address: SocketAddr,

    /// Enable CORS
    pub enable_cors: bool,

    /// Enable request logging
    pub enable_request_logging: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let base_url = std::env::var("TRENDSCOPE_BASE_URL")
            .unwrap_or_else(|_| defaults.trends.base_url.clone());

        let locale =
            std::env::var("TRENDSCOPE_LOCALE").unwrap_or_else(|_| defaults.trends.locale.clone());

        let timezone_offset = std::env::var("TRENDSCOPE_TZ")
            .ok()
            .and_then(|v| v.parse::<i32>().ok())
            .unwrap_or(defaults.trends.timezone_offset);

        let request_timeout_secs = std::env::var("TRENDSCOPE_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.trends.request_timeout_secs);

        let user_agent = std::env::var("TRENDSCOPE_USER_AGENT")
            .unwrap_or_else(|_| defaults.trends.user_agent.clone());

        let handle_ttl_secs = std::env::var("TRENDSCOPE_HANDLE_TTL")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.trends.handle_ttl_secs);

        let bind_address = match std::env::var("TRENDSCOPE_BIND") {
            Ok(addr) => addr
                .parse()
                .with_context(|| format!("Invalid TRENDSCOPE_BIND address: {addr}"))?,
            Err(_) => defaults.server.bind_address,
        };

        let log_level =
            std::env::var("TRENDSCOPE_LOG_LEVEL").unwrap_or_else(|_| String::from("info"));

        let log_format =
            std::env::var("TRENDSCOPE_LOG_FORMAT").unwrap_or_else(|_| String::from("text"));

        Ok(Self {
            trends: TrendsConfig {
                base_url,
                locale,
                timezone_offset,
                request_timeout_secs,
                user_agent,
                handle_ttl_secs,
            },
            server: ServerConfig {
                bind_address,
                ..defaults.server
            },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.trends.base_url.trim().is_empty() {
            anyhow::bail!("base_url must not be empty");
        }

        if self.trends.locale.chars().count() < 2 {
            anyhow::bail!("locale must be at least two characters (e.g., en-US)");
        }

        if self.trends.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if self.trends.handle_ttl_secs == 0 {
            anyhow::bail!("handle_ttl_secs must be greater than 0");
        }

        Ok(())
    }
}

impl TrendsConfig {
    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Get handle lifetime as Duration
    #[must_use]
    pub fn handle_ttl(&self) -> Duration {
        Duration::from_secs(self.handle_ttl_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trends: TrendsConfig {
                base_url: String::from("https://trends.google.com"),
                locale: String::from("en-US"),
                timezone_offset: 360,
                request_timeout_secs: 30,
                user_agent: format!("trendscope/{}", env!("CARGO_PKG_VERSION")),
                handle_ttl_secs: 3600,
            },
            server: ServerConfig {
                bind_address: SocketAddr::from(([127, 0, 0, 1], 8501)),
                enable_cors: false,
                enable_request_logging: true,
            },
            logging: LoggingConfig {
                level: String::from("info"),
                format: String::from("text"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_timeout() {
        let mut config = Config::default();
        config.trends.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_locale() {
        let mut config = Config::default();
        config.trends.locale = "e".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duration_conversion() {
        let config = Config::default();
        assert_eq!(config.trends.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.trends.handle_ttl(), Duration::from_secs(3600));
    }
}
