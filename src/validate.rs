//! The module descriptor validator.
//!
//! Given a draft [`ModuleManifest`], [`validate`] verifies internal
//! consistency and finalizes it into an immutable
//! [`ModuleDescriptor`](crate::ModuleDescriptor). It is a pure function: no
//! I/O, no side effects.
//!
//! ## Rules
//!
//! - required identity fields (`group`, `module-id`, `name`, `version`) are
//!   non-empty,
//! - `module-id` matches a reverse-DNS naming pattern,
//! - `version` parses as `MAJOR.MINOR.PATCH`,
//! - every scope's capability-code set is non-empty and drawn from the
//!   host's alphabet, and scope names are unique,
//! - every hook key is a single known capability code and every entry-point
//!   name is a well-formed dotted path,
//! - every capability referenced by any scope has a matching hook binding,
//! - no two bindings share a capability.
//!
//! Fail-fast is deliberately rejected: the validator walks every rule and
//! returns *all* violations in one [`ValidationReport`], each tagged with
//! the offending field, scope, or code, so an author fixes the manifest in
//! one pass. Validation is idempotent: re-validating the manifest lowered
//! from a finalized descriptor succeeds and yields an equal descriptor.
//!
//! A binding whose capability no scope references is not an error (the
//! module still loads); it is surfaced as a warning.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::capability::{Capability, CapabilitySet};
use crate::descriptor::{EntryPoint, HookBinding, ModuleDescriptor, Scope};
use crate::manifest::ModuleManifest;
use crate::version::{ModuleVersion, VersionParseError};

/// Reverse-DNS module/group identifier: at least two lowercase segments.
#[allow(clippy::unwrap_used)]
static MODULE_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9]*(\.[a-z][a-z0-9-]*)+$").unwrap());

/// Dotted entry-point path: at least two identifier segments.
#[allow(clippy::unwrap_used)]
static ENTRY_POINT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)+$").unwrap());

/// A single violated validation rule, tagged with its offender.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("required field '{field}' is empty")]
    MissingField { field: &'static str },

    #[error("module id '{module_id}' does not match the reverse-DNS naming pattern")]
    InvalidModuleId { module_id: String },

    #[error("version '{value}' is not a valid module version: {source}")]
    InvalidVersion {
        value: String,
        source: VersionParseError,
    },

    #[error("scope '{scope}' is declared more than once")]
    DuplicateScope { scope: String },

    #[error("scope '{scope}' references no capability codes")]
    EmptyScope { scope: String },

    #[error("scope '{scope}' references unknown capability code '{code}'")]
    UnknownCapability { scope: String, code: char },

    #[error("hook key '{code}' is not a single known capability code")]
    UnknownHookCode { code: String },

    #[error("hook for '{code}' names malformed entry point '{entry_point}'")]
    InvalidEntryPoint { code: String, entry_point: String },

    #[error("scope '{scope}' references capability '{capability}' but no hook is bound to it")]
    MissingHook { scope: String, capability: Capability },

    #[error("capability '{capability}' is bound twice: '{first}' and '{second}'")]
    DuplicateHook {
        capability: Capability,
        first: String,
        second: String,
    },
}

/// Every rule violated by a manifest, plus non-fatal warnings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Violations, in rule-walk order.
    pub issues: Vec<ValidationIssue>,
    /// Non-fatal findings (e.g. a binding no scope references).
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// True when no rule was violated (warnings do not fail validation).
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }

    fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "module manifest validation failed with {} error(s):",
            self.issues.len()
        )?;
        for issue in &self.issues {
            writeln!(f, "  - {issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}

/// Validate a draft manifest and finalize it into a descriptor.
///
/// On failure the report carries every violated rule, not just the first.
/// Warnings accompany a *successful* result through
/// [`validate_with_warnings`]; this entry point discards them.
///
/// # Errors
///
/// Returns the full [`ValidationReport`] when any rule is violated.
pub fn validate(manifest: &ModuleManifest) -> Result<ModuleDescriptor, ValidationReport> {
    validate_with_warnings(manifest).map(|(descriptor, _)| descriptor)
}

/// Validate a draft manifest, returning the finalized descriptor together
/// with any non-fatal warnings.
///
/// # Errors
///
/// Returns the full [`ValidationReport`] when any rule is violated.
pub fn validate_with_warnings(
    manifest: &ModuleManifest,
) -> Result<(ModuleDescriptor, Vec<String>), ValidationReport> {
    let mut report = ValidationReport::default();

    check_identity(manifest, &mut report);
    let version = check_version(manifest, &mut report);
    let scopes = check_scopes(manifest, &mut report);
    let hooks = check_hooks(manifest, &mut report);
    check_coverage(&scopes, &hooks, &mut report);

    // Bindings no scope references still load; flag them so the author can
    // trim the manifest.
    for hook in &hooks {
        let referenced = scopes.iter().any(|s| s.capabilities().contains(hook.capability()));
        if !referenced {
            report.warnings.push(format!(
                "hook '{}' is bound to capability '{}' which no scope references",
                hook.entry_point(),
                hook.capability()
            ));
        }
    }

    if !report.is_ok() {
        return Err(report);
    }

    // All rules passed; version parse is guaranteed to have succeeded.
    let Some(version) = version else {
        return Err(report);
    };

    debug!(
        module_id = %manifest.module_id,
        scopes = scopes.len(),
        hooks = hooks.len(),
        "manifest validated"
    );

    let descriptor = ModuleDescriptor::new(
        manifest.group.clone(),
        manifest.module_id.clone(),
        manifest.name.clone(),
        version,
        manifest.description.clone(),
        manifest.project_url.clone(),
        manifest.license.clone(),
        scopes,
        hooks,
    );
    Ok((descriptor, report.warnings))
}

fn check_identity(manifest: &ModuleManifest, report: &mut ValidationReport) {
    if manifest.group.is_empty() {
        report.push(ValidationIssue::MissingField { field: "group" });
    }
    if manifest.name.is_empty() {
        report.push(ValidationIssue::MissingField { field: "name" });
    }
    if manifest.module_id.is_empty() {
        report.push(ValidationIssue::MissingField { field: "module-id" });
    } else if !MODULE_ID_PATTERN.is_match(&manifest.module_id) {
        report.push(ValidationIssue::InvalidModuleId {
            module_id: manifest.module_id.clone(),
        });
    }
}

fn check_version(manifest: &ModuleManifest, report: &mut ValidationReport) -> Option<ModuleVersion> {
    if manifest.version.is_empty() {
        report.push(ValidationIssue::MissingField { field: "version" });
        return None;
    }
    match manifest.version.parse::<ModuleVersion>() {
        Ok(version) => Some(version),
        Err(source) => {
            report.push(ValidationIssue::InvalidVersion {
                value: manifest.version.clone(),
                source,
            });
            None
        }
    }
}

fn check_scopes(manifest: &ModuleManifest, report: &mut ValidationReport) -> Vec<Scope> {
    let mut seen = HashSet::new();
    let mut scopes = Vec::new();

    for entry in &manifest.scopes {
        if !seen.insert(entry.name.as_str()) {
            report.push(ValidationIssue::DuplicateScope {
                scope: entry.name.clone(),
            });
            continue;
        }

        let capabilities = match CapabilitySet::parse(&entry.codes) {
            Ok(set) => set,
            Err(err) => {
                for code in err.unknown {
                    report.push(ValidationIssue::UnknownCapability {
                        scope: entry.name.clone(),
                        code,
                    });
                }
                // Keep the recognized letters so coverage checking still runs.
                entry
                    .codes
                    .chars()
                    .filter_map(Capability::from_code)
                    .collect()
            }
        };

        if capabilities.is_empty() && entry.codes.is_empty() {
            report.push(ValidationIssue::EmptyScope {
                scope: entry.name.clone(),
            });
            continue;
        }

        scopes.push(Scope::new(entry.name.clone(), capabilities));
    }

    scopes
}

fn check_hooks(manifest: &ModuleManifest, report: &mut ValidationReport) -> Vec<HookBinding> {
    let mut bindings: Vec<HookBinding> = Vec::new();

    for entry in &manifest.hooks {
        let mut chars = entry.code.chars();
        let capability = match (chars.next(), chars.next()) {
            (Some(ch), None) => Capability::from_code(ch),
            _ => None,
        };
        let Some(capability) = capability else {
            report.push(ValidationIssue::UnknownHookCode {
                code: entry.code.clone(),
            });
            continue;
        };

        if !ENTRY_POINT_PATTERN.is_match(&entry.entry_point) {
            report.push(ValidationIssue::InvalidEntryPoint {
                code: entry.code.clone(),
                entry_point: entry.entry_point.clone(),
            });
            continue;
        }

        if let Some(existing) = bindings.iter().find(|b| b.capability() == capability) {
            report.push(ValidationIssue::DuplicateHook {
                capability,
                first: existing.entry_point().to_string(),
                second: entry.entry_point.clone(),
            });
            continue;
        }

        bindings.push(HookBinding::new(
            capability,
            EntryPoint::new(entry.entry_point.clone()),
        ));
    }

    bindings
}

fn check_coverage(scopes: &[Scope], hooks: &[HookBinding], report: &mut ValidationReport) {
    for scope in scopes {
        for capability in scope.capabilities().iter() {
            let bound = hooks.iter().any(|h| h.capability() == capability);
            if !bound {
                report.push(ValidationIssue::MissingHook {
                    scope: scope.name().to_string(),
                    capability,
                });
            }
        }
    }
}
