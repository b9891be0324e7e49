//! Gateway configuration types.
//!
//! This module defines configuration structures for the HTTP gateway.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the gateway service.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Listen address (e.g., "0.0.0.0:8787").
    #[serde(default = "GatewayConfig::default_listen_addr")]
    pub listen_addr: String,

    /// The single origin allowed to make credentialed cross-origin calls.
    #[serde(default = "GatewayConfig::default_cors_origin")]
    pub cors_origin: String,

    /// Maximum request body size in bytes.
    #[serde(default = "GatewayConfig::default_max_body")]
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    #[serde(default = "GatewayConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Include internal error detail in 500 responses.
    #[serde(default)]
    pub expose_error_details: bool,

    /// Answer every unmatched route with the endpoint listing instead of 404.
    #[serde(default)]
    pub legacy_fallback: bool,
}

impl GatewayConfig {
    fn default_listen_addr() -> String {
        "0.0.0.0:8787".to_string()
    }

    fn default_cors_origin() -> String {
        "http://localhost:5173".to_string()
    }

    const fn default_max_body() -> usize {
        1024 * 1024 // 1 MB
    }

    const fn default_request_timeout() -> u64 {
        30
    }

    /// Build a configuration from environment-style lookups.
    ///
    /// Unset or unparsable values keep their defaults. Boolean flags accept
    /// `1`, `true`, `yes` and `on` in any case.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(addr) = lookup("LISTEN_ADDR") {
            config.listen_addr = addr;
        }
        if let Some(origin) = lookup("MISUB_CORS_ORIGIN") {
            config.cors_origin = origin;
        }
        if let Some(flag) = lookup("MISUB_EXPOSE_ERRORS") {
            config.expose_error_details = parse_flag(&flag);
        }
        if let Some(flag) = lookup("MISUB_LEGACY_FALLBACK") {
            config.legacy_fallback = parse_flag(&flag);
        }

        config
    }

    /// Build a configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: Self::default_listen_addr(),
            cors_origin: Self::default_cors_origin(),
            max_body_bytes: Self::default_max_body(),
            request_timeout_seconds: Self::default_request_timeout(),
            expose_error_details: false,
            legacy_fallback: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.listen_addr, "0.0.0.0:8787");
        assert_eq!(config.cors_origin, "http://localhost:5173");
        assert_eq!(config.max_body_bytes, 1024 * 1024);
        assert!(!config.expose_error_details);
        assert!(!config.legacy_fallback);
    }

    #[test]
    fn timeout_duration() {
        let config = GatewayConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn deserialize_fills_defaults() {
        let config: GatewayConfig =
            serde_json::from_str(r#"{ "cors_origin": "https://misub.example" }"#).unwrap();
        assert_eq!(config.cors_origin, "https://misub.example");
        assert_eq!(config.listen_addr, "0.0.0.0:8787");
        assert_eq!(config.request_timeout_seconds, 30);
    }

    #[test]
    fn from_lookup_reads_overrides() {
        let env: HashMap<&str, &str> = [
            ("LISTEN_ADDR", "127.0.0.1:9000"),
            ("MISUB_CORS_ORIGIN", "https://misub.example"),
            ("MISUB_EXPOSE_ERRORS", "TRUE"),
            ("MISUB_LEGACY_FALLBACK", "0"),
        ]
        .into_iter()
        .collect();

        let config = GatewayConfig::from_lookup(|key| env.get(key).map(ToString::to_string));
        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.cors_origin, "https://misub.example");
        assert!(config.expose_error_details);
        assert!(!config.legacy_fallback);
    }

    #[test]
    fn flag_parsing() {
        for on in ["1", "true", "Yes", " on "] {
            assert!(parse_flag(on), "{on}");
        }
        for off in ["", "0", "false", "nope"] {
            assert!(!parse_flag(off), "{off}");
        }
    }
}
