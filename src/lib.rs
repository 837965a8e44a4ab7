//! Core library for the modkit toolkit.
//!
//! modkit packages and loads plugin modules for a host platform. A module is
//! declared by a manifest (identity, scopes, hook bindings), finalized by a
//! validator that reports every violated rule in one pass, packaged as an
//! artifact with an integrity checksum, and loaded by resolving its entry
//! points through an explicit factory registry.
//!
//! # Architecture
//!
//! ```text
//! ModuleManifest (draft, authored TOML)
//!   └── validate() ──> ModuleDescriptor (finalized, immutable)
//!         └── package() ──> <id>-<version>.modl/ (manifest + sha256)
//!               └── ModuleLoader::discover()/load()
//!                     └── HookRegistry ──> Box<dyn ModuleHook>
//!                           setup() -> startup() -> ... -> shutdown()
//! ```

pub mod capability;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod hook;
pub mod loader;
pub mod manifest;
pub mod package;
pub mod registry;
pub mod validate;
pub mod version;

pub use capability::{Capability, CapabilitySet};
pub use config::ToolConfig;
pub use descriptor::{EntryPoint, HookBinding, ModuleDescriptor, Scope};
pub use error::{AppResult, ModkitError};
pub use hook::{HookError, HostContext, ModuleHook};
pub use loader::{DiscoveredModule, LoadedModule, ModuleLoader};
pub use manifest::{HookEntry, ManifestError, ModuleManifest, ScopeEntry};
pub use package::{package, PackagedArtifact};
pub use registry::{HookFactory, HookRegistry};
pub use validate::{validate, validate_with_warnings, ValidationIssue, ValidationReport};
pub use version::{ModuleVersion, VersionParseError};
