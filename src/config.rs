//! Tool configuration using Figment.
//!
//! This module provides strongly-typed configuration loading for the modkit
//! CLI. Configuration is loaded from:
//! 1. modkit.toml file (base configuration)
//! 2. Environment variables (prefixed with MODKIT_)
//!
//! # Environment Variable Overrides
//!
//! Environment variables with the `MODKIT_` prefix can override
//! configuration values:
//!
//! ```text
//! MODKIT_LOG_LEVEL=debug
//! MODKIT_OUTPUT_DIR=/tmp/dist
//! ```
//!
//! The configuration object is constructed once at startup and never mutated
//! afterwards; everything downstream borrows it.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ModkitError;

/// Default configuration file name.
pub const CONFIG_FILE: &str = "modkit.toml";

/// Top-level tool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Directory packaged artifacts are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Directories scanned for installed module artifacts.
    #[serde(default = "default_search_paths")]
    pub search_paths: Vec<PathBuf>,
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            search_paths: default_search_paths(),
            log_level: default_log_level(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_search_paths() -> Vec<PathBuf> {
    vec![PathBuf::from("modules")]
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ToolConfig {
    /// Load configuration from modkit.toml and environment variables.
    ///
    /// Values are merged in this order of precedence (highest to lowest):
    /// 1. Environment variables (MODKIT_ prefix)
    /// 2. modkit.toml file
    /// 3. Built-in defaults
    ///
    /// A missing file is not an error; defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or validation fails.
    pub fn load() -> Result<Self, ModkitError> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or validation fails.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ModkitError> {
        let config: Self = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("MODKIT_"))
            .extract()
            .map_err(ModkitError::Config)?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error with a descriptive message for any
    /// validation failure.
    pub fn validate(&self) -> Result<(), ModkitError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(ModkitError::Configuration(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            )));
        }

        if self.search_paths.is_empty() {
            return Err(ModkitError::Configuration(
                "search_paths must name at least one directory".to_string(),
            ));
        }

        Ok(())
    }
}
