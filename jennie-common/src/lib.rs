//! JENNIE Common - Shared configuration, logging, and utilities for the JENNIE chat backend.
//!
//! This crate provides:
//! - Configuration types and loading (JSON file + environment overrides)
//! - Configuration validation
//! - Logging setup and request tracing helpers
//! - Log-safety utility functions

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod logging;
pub mod util;
pub mod validation;

pub use config::{Config, GeminiConfig, NetworkConfig, ObservabilityConfig};
pub use validation::{Validate, ValidationError, ValidationResult};
