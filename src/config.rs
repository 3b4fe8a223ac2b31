//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::time::Duration;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Upper bound on a single validator token generation, in milliseconds
    pub generation_timeout_ms: u64,
    /// Whether to allow cross-origin requests from any origin
    pub cors_permissive: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `GENERATION_TIMEOUT_MS` - Token generation timeout (default: 2000)
    /// - `CORS_PERMISSIVE` - Allow any origin (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            generation_timeout_ms: env::var("GENERATION_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(defaults.generation_timeout_ms),
            cors_permissive: env::var("CORS_PERMISSIVE")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.cors_permissive),
        }
    }

    /// Returns the generation timeout as a Duration.
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_millis(self.generation_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            generation_timeout_ms: 2000,
            cors_permissive: true,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.generation_timeout_ms, 2000);
        assert!(config.cors_permissive);
        assert_eq!(config.generation_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("SERVER_PORT");
        env::remove_var("GENERATION_TIMEOUT_MS");
        env::remove_var("CORS_PERMISSIVE");

        let config = Config::from_env();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.generation_timeout_ms, 2000);
        assert!(config.cors_permissive);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" off "), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }
}
