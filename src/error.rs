//! Custom error types for the toolkit.
//!
//! This module defines the primary error type, `ModkitError`, for the entire
//! crate. Using the `thiserror` crate, it provides a centralized and
//! consistent way to handle different kinds of errors, from I/O and
//! configuration issues to manifest and loader problems.
//!
//! ## Error Hierarchy
//!
//! `ModkitError` is an enum that consolidates various error sources:
//!
//! - **`Config`**: Wraps errors from `figment`, typically related to file
//!   parsing or format issues in the tool configuration.
//! - **`Configuration`**: Represents semantic errors in the configuration,
//!   such as values that parse but are logically incorrect (e.g., an unknown
//!   log level). These are caught during the validation step.
//! - **`Io`**: Wraps standard `std::io::Error`, covering all file I/O.
//! - **`Manifest`**: Wraps manifest parse/emit failures.
//! - **`Validation`**: Carries a full [`ValidationReport`]; every violated
//!   rule is surfaced together rather than just the first.
//! - **Loader errors** (`ChecksumMismatch`, `MissingManifest`,
//!   `UnknownModule`, `HookNotRegistered`, `HookFailed`): raised while
//!   opening packaged artifacts or instantiating their hooks.
//!
//! By using `#[from]`, `ModkitError` can be seamlessly created from
//! underlying error types, simplifying error handling throughout the crate
//! with the `?` operator.

use std::path::PathBuf;

use thiserror::Error;

use crate::capability::Capability;
use crate::hook::HookError;
use crate::manifest::ManifestError;
use crate::validate::ValidationReport;

/// Convenience alias for results using the toolkit error type.
pub type AppResult<T> = std::result::Result<T, ModkitError>;

/// Central error type for manifest, packaging, and loading operations.
#[derive(Error, Debug)]
pub enum ModkitError {
    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("Configuration validation error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Validation(#[from] ValidationReport),

    #[error("Checksum mismatch for {path}: manifest hashes to {actual}, artifact declares {declared}")]
    ChecksumMismatch {
        path: PathBuf,
        declared: String,
        actual: String,
    },

    #[error("Artifact {0} has no module manifest")]
    MissingManifest(PathBuf),

    #[error("Unknown module id: '{0}'")]
    UnknownModule(String),

    #[error("No hook factory registered for entry point '{0}'")]
    HookNotRegistered(String),

    #[error("Entry point '{0}' is already registered")]
    HookAlreadyRegistered(String),

    #[error("Hook for capability {capability} failed during {phase}: {source}")]
    HookFailed {
        capability: Capability,
        phase: &'static str,
        source: HookError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModkitError::UnknownModule("com.example.missing".to_string());
        assert_eq!(err.to_string(), "Unknown module id: 'com.example.missing'");
    }

    #[test]
    fn test_hook_not_registered_display() {
        let err = ModkitError::HookNotRegistered("com.example.GatewayHook".to_string());
        assert!(err.to_string().contains("com.example.GatewayHook"));
    }
}
