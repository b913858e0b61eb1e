//! Configuration validation for the JENNIE backend.
//!
//! A missing Gemini credential passes validation; the server starts and
//! answers chat requests with a configuration error instead.

use thiserror::Error;

use crate::config::{Config, GeminiConfig, NetworkConfig, ObservabilityConfig};

/// Configuration validation error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid port {port}: must be between 1 and 65535")]
    InvalidPort { port: u16, field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validatable configuration sections.
pub trait Validate {
    /// Validate this configuration section.
    fn validate(&self) -> ValidationResult<()>;
}

impl Config {
    /// Validate the entire configuration.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors: Vec<ValidationError> = [
            self.network.validate(),
            self.gemini.validate(),
            self.observability.validate(),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect();

        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ValidationError::Multiple(errors)),
        }
    }
}

impl Validate for NetworkConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort {
                port: self.port,
                field: "network.port".into(),
            });
        }
        if self.bind.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "network.bind".into(),
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}

impl Validate for GeminiConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.model.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "gemini.model".into(),
                reason: "must not be empty".into(),
            });
        }
        if !self.base_url.starts_with("http") {
            return Err(ValidationError::InvalidValue {
                field: "gemini.base_url".into(),
                reason: format!("must be an http(s) URL, got '{}'", self.base_url),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidValue {
                field: "gemini.timeout_secs".into(),
                reason: "must be greater than 0".into(),
            });
        }
        Ok(())
    }
}

impl Validate for ObservabilityConfig {
    fn validate(&self) -> ValidationResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_level".into(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            });
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.log_format.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_format".into(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_api_key_is_valid() {
        let mut config = Config::default();
        config.gemini.api_key = None;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_port() {
        let mut config = Config::default();
        config.network.port = 0;
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidPort { port: 0, .. })
        ));
    }

    #[test_case("verbose" ; "unknown level")]
    #[test_case("" ; "empty level")]
    fn test_invalid_log_level(level: &str) {
        let mut config = Config::default();
        config.observability.log_level = level.into();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidValue { ref field, .. }) if field == "observability.log_level"
        ));
    }

    #[test]
    fn test_multiple_errors_collected() {
        let mut config = Config::default();
        config.network.port = 0;
        config.gemini.base_url = "ftp://example.com".into();
        config.observability.log_format = "xml".into();

        match config.validate() {
            Err(ValidationError::Multiple(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("expected multiple errors, got {other:?}"),
        }
    }
}
