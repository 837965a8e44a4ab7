//! The module manifest: the authored key/value declaration of a module.
//!
//! A manifest is the build-time wire format. It declares module identity
//! (group, id, name, version, description, project URL, license), a `hooks`
//! table mapping capability codes to entry-point names, and a `scopes` table
//! mapping scope names to capability-code strings:
//!
//! ```toml
//! group = "com.example.hellomodule"
//! module-id = "com.example.hellomodule"
//! name = "Hello Module"
//! version = "1.0.0"
//! description = "A minimal example module."
//! project-url = "https://example.com/hellomodule"
//! license = "LICENSE.txt"
//!
//! [hooks]
//! G = "com.example.hellomodule.gateway.HelloGatewayHook"
//!
//! [scopes]
//! common = "GC"
//! gateway = "G"
//! ```
//!
//! The manifest is a *draft*: its `version` is an uninterpreted string and
//! its tables may be inconsistent. The validator (see [`crate::validate`])
//! is what turns a draft into a finalized [`crate::ModuleDescriptor`].
//!
//! Hook and scope entries are stored as ordered lists internally. The TOML
//! tables cannot express two bindings for the same code, but the builder
//! methods can, and the validator must be able to diagnose exactly that.
//! Emission goes through `BTreeMap`, so equal manifests always serialize to
//! identical bytes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while reading, parsing, or emitting a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("manifest parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("manifest emit error: {0}")]
    Emit(#[from] toml::ser::Error),
}

/// One `code = "entry.point.Name"` row of the hooks table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookEntry {
    /// Capability code the hook is bound to (e.g. `"G"`).
    pub code: String,
    /// Fully qualified entry-point name the host instantiates.
    pub entry_point: String,
}

/// One `name = "GC"` row of the scopes table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeEntry {
    /// Scope (subproject) name, e.g. `"gateway"`.
    pub name: String,
    /// Capability-code string referenced by this scope, e.g. `"GC"`.
    pub codes: String,
}

/// A module declaration as authored, prior to validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ModuleManifest {
    /// Publisher group, reverse-DNS style.
    pub group: String,
    /// Globally unique module identifier.
    pub module_id: String,
    /// Human-readable module name.
    pub name: String,
    /// Version string; parsed and checked during validation.
    pub version: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Project homepage.
    #[serde(default)]
    pub project_url: String,
    /// License identifier or file reference.
    #[serde(default)]
    pub license: String,
    /// Capability code -> entry-point bindings.
    #[serde(default, with = "hook_table", skip_serializing_if = "Vec::is_empty")]
    pub hooks: Vec<HookEntry>,
    /// Scope name -> capability-code string declarations.
    #[serde(default, with = "scope_table", skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<ScopeEntry>,
}

impl ModuleManifest {
    /// Create a manifest with the required identity fields.
    pub fn new(group: &str, module_id: &str, name: &str, version: &str) -> Self {
        Self {
            group: group.to_string(),
            module_id: module_id.to_string(),
            name: name.to_string(),
            version: version.to_string(),
            description: String::new(),
            project_url: String::new(),
            license: String::new(),
            hooks: Vec::new(),
            scopes: Vec::new(),
        }
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Builder method to set the project URL.
    pub fn with_project_url(mut self, url: &str) -> Self {
        self.project_url = url.to_string();
        self
    }

    /// Builder method to set the license.
    pub fn with_license(mut self, license: &str) -> Self {
        self.license = license.to_string();
        self
    }

    /// Builder method to bind a capability code to an entry point.
    pub fn with_hook(mut self, code: &str, entry_point: &str) -> Self {
        self.hooks.push(HookEntry {
            code: code.to_string(),
            entry_point: entry_point.to_string(),
        });
        self
    }

    /// Builder method to declare a scope.
    pub fn with_scope(mut self, name: &str, codes: &str) -> Self {
        self.scopes.push(ScopeEntry {
            name: name.to_string(),
            codes: codes.to_string(),
        });
        self
    }

    /// Parse a manifest from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ManifestError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a manifest file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Emit the canonical TOML form.
    ///
    /// Tables are emitted in key order, so equal manifests produce
    /// byte-identical output.
    pub fn to_toml_string(&self) -> Result<String, ManifestError> {
        Ok(toml::to_string(self)?)
    }

    /// Write the canonical TOML form to a file.
    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ManifestError> {
        let path = path.as_ref();
        let text = self.to_toml_string()?;
        std::fs::write(path, text).map_err(|source| ManifestError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// A JSON view of the manifest, used by the CLI `inspect --json` output.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

mod hook_table {
    use super::*;

    pub fn serialize<S: serde::Serializer>(
        entries: &[HookEntry],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let map: BTreeMap<&str, &str> = entries
            .iter()
            .map(|e| (e.code.as_str(), e.entry_point.as_str()))
            .collect();
        map.serialize(serializer)
    }

    pub fn deserialize<'de, D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<HookEntry>, D::Error> {
        let map = BTreeMap::<String, String>::deserialize(deserializer)?;
        Ok(map
            .into_iter()
            .map(|(code, entry_point)| HookEntry { code, entry_point })
            .collect())
    }
}

mod scope_table {
    use super::*;

    pub fn serialize<S: serde::Serializer>(
        entries: &[ScopeEntry],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let map: BTreeMap<&str, &str> = entries
            .iter()
            .map(|e| (e.name.as_str(), e.codes.as_str()))
            .collect();
        map.serialize(serializer)
    }

    pub fn deserialize<'de, D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<ScopeEntry>, D::Error> {
        let map = BTreeMap::<String, String>::deserialize(deserializer)?;
        Ok(map
            .into_iter()
            .map(|(name, codes)| ScopeEntry { name, codes })
            .collect())
    }
}
