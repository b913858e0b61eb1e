//! Configuration management for the JENNIE backend.
//!
//! # Configuration Priority
//!
//! 1. Environment variables (including a `.env` file in the working directory)
//! 2. JSON config file named by `JENNIE_CONFIG`
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `PORT` → network.port
//! - `JENNIE_BIND_ADDRESS` → network.bind
//! - `GEMINI_API_KEY` → gemini.api_key
//! - `GEMINI_MODEL` → gemini.model
//! - `GEMINI_BASE_URL` → gemini.base_url
//! - `JENNIE_LOG_LEVEL` → observability.log_level
//! - `JENNIE_LOG_FORMAT` → observability.log_format
//! - `NODE_ENV=development` or `JENNIE_DEV_MODE=true` → dev_mode

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an optional JSON config file.
pub const CONFIG_PATH_ENV: &str = "JENNIE_CONFIG";

// ============================================================================
// Network Configuration
// ============================================================================

/// Listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Bind address. Default: "0.0.0.0"
    #[serde(default = "default_bind_address")]
    pub bind: String,

    /// Listen port. Default: 5000
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind: default_bind_address(),
            port: default_port(),
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    5000
}

// ============================================================================
// Gemini Configuration
// ============================================================================

/// Gemini generation service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key. Chat is disabled when absent or empty.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_gemini_model")]
    pub model: String,

    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            base_url: default_gemini_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".into()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".into()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_connect_timeout_secs() -> u64 {
    10
}

// ============================================================================
// Observability Configuration
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration for the JENNIE backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Echo raw upstream error text to clients.
    #[serde(default)]
    pub dev_mode: bool,

    /// Problems found while loading, reported once logging is up.
    #[serde(skip)]
    pub load_warnings: Vec<String>,

    /// `.env` file that was loaded, if any.
    #[serde(skip)]
    pub env_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Load configuration with environment variable overrides.
    ///
    /// A `.env` file in the working directory is loaded first; its absence is not an error.
    pub fn load_with_env() -> Result<Self> {
        let env_file = dotenvy::dotenv().ok();

        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load_from(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.env_file = env_file;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a key lookup (the process environment in production).
    ///
    /// Rejected values are recorded in `load_warnings`; callers log them once a
    /// subscriber is installed.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            match port.trim().parse() {
                Ok(p) => self.network.port = p,
                Err(_) => self.load_warnings.push(format!(
                    "Ignoring unparseable PORT '{port}', using {}",
                    self.network.port
                )),
            }
        }
        if let Some(bind) = lookup("JENNIE_BIND_ADDRESS") {
            self.network.bind = bind;
        }

        if let Some(key) = lookup("GEMINI_API_KEY") {
            self.gemini.api_key = Some(key);
        }
        if let Some(model) = lookup("GEMINI_MODEL") {
            self.gemini.model = model;
        }
        if let Some(url) = lookup("GEMINI_BASE_URL") {
            self.gemini.base_url = url;
        }

        if let Some(level) = lookup("JENNIE_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Some(format) = lookup("JENNIE_LOG_FORMAT") {
            self.observability.log_format = format;
        }

        if lookup("NODE_ENV").as_deref() == Some("development") {
            self.dev_mode = true;
        }
        if let Some(flag) = lookup("JENNIE_DEV_MODE") {
            self.dev_mode = matches!(flag.to_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    /// The Gemini credential, if one is configured and non-empty.
    pub fn gemini_api_key(&self) -> Option<&str> {
        self.gemini
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
    }

    /// Socket address string for the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.network.bind, self.network.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.network.port, 5000);
        assert_eq!(config.network.bind, "0.0.0.0");
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert!(config.gemini_api_key().is_none());
        assert!(!config.dev_mode);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[
            ("PORT", "8080"),
            ("GEMINI_API_KEY", "test-key"),
            ("GEMINI_MODEL", "gemini-2.0-flash"),
            ("JENNIE_LOG_FORMAT", "json"),
        ]));

        assert_eq!(config.network.port, 8080);
        assert_eq!(config.gemini_api_key(), Some("test-key"));
        assert_eq!(config.gemini.model, "gemini-2.0-flash");
        assert_eq!(config.observability.log_format, "json");
        assert_eq!(config.listen_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_unparseable_port_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[("PORT", "50OO")]));
        assert_eq!(config.network.port, 5000);
        assert_eq!(config.load_warnings.len(), 1);
        assert!(config.load_warnings[0].contains("'50OO'"));
        assert!(config.load_warnings[0].contains("5000"));
    }

    #[test]
    fn test_valid_overrides_leave_no_warnings() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[("PORT", " 8080 ")]));
        assert_eq!(config.network.port, 8080);
        assert!(config.load_warnings.is_empty());
    }

    #[test]
    fn test_load_warnings_are_not_serialized() {
        let mut config = Config::default();
        config.load_warnings.push("bad".into());
        let json = serde_json::to_value(&config).unwrap();
        assert!(json.get("load_warnings").is_none());
        assert!(json.get("env_file").is_none());
    }

    #[test]
    fn test_empty_api_key_counts_as_missing() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[("GEMINI_API_KEY", "")]));
        assert!(config.gemini_api_key().is_none());
    }

    #[test]
    fn test_dev_mode_from_node_env() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[("NODE_ENV", "development")]));
        assert!(config.dev_mode);

        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[("NODE_ENV", "production")]));
        assert!(!config.dev_mode);
    }

    #[test]
    fn test_dev_mode_flag_wins() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[
            ("NODE_ENV", "development"),
            ("JENNIE_DEV_MODE", "false"),
        ]));
        assert!(!config.dev_mode);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"network": {{"port": 7000}}, "gemini": {{"model": "gemini-1.5-pro"}}, "dev_mode": true}}"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.network.port, 7000);
        assert_eq!(config.network.bind, "0.0.0.0");
        assert_eq!(config.gemini.model, "gemini-1.5-pro");
        assert_eq!(config.gemini.timeout_secs, 120);
        assert!(config.dev_mode);
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let result = Config::load_from(Path::new("/nonexistent/jennie.json"));
        assert!(result.is_err());
    }
}
