//! Module loader: artifact discovery and hook instantiation.
//!
//! The loader scans configured directories for `*.modl` artifact
//! directories, verifies and indexes them by module id, and creates
//! [`LoadedModule`]s by resolving each hook binding against a
//! [`HookRegistry`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use modkit::{HookRegistry, HostContext, ModuleLoader};
//!
//! let mut registry = HookRegistry::new();
//! registry.register("com.example.hellomodule.gateway.HelloGatewayHook", || {
//!     Box::new(HelloGatewayHook::default())
//! })?;
//!
//! let mut loader = ModuleLoader::new();
//! loader.add_search_path("./modules");
//! loader.discover()?;
//!
//! let mut module = loader.load("com.example.hellomodule", &registry)?;
//! module.start(&ctx)?;
//! // ...
//! module.shutdown();
//! ```
//!
//! Everything here is synchronous: artifacts are static configuration read
//! once at install/start time.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::capability::Capability;
use crate::descriptor::ModuleDescriptor;
use crate::error::{AppResult, ModkitError};
use crate::hook::{HostContext, ModuleHook};
use crate::package::PackagedArtifact;
use crate::registry::HookRegistry;

/// Artifact directory extension the loader recognizes.
const ARTIFACT_EXTENSION: &str = "modl";

/// A verified artifact found during discovery.
#[derive(Debug, Clone)]
pub struct DiscoveredModule {
    descriptor: ModuleDescriptor,
    artifact_dir: PathBuf,
}

impl DiscoveredModule {
    /// The verified descriptor.
    pub fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    /// Where the artifact lives.
    pub fn artifact_dir(&self) -> &Path {
        &self.artifact_dir
    }
}

/// Discovers packaged modules and instantiates their hooks.
#[derive(Debug, Default)]
pub struct ModuleLoader {
    /// Directories to scan for artifacts
    search_paths: Vec<PathBuf>,
    /// Discovered modules: module id -> artifact
    modules: BTreeMap<String, DiscoveredModule>,
}

impl ModuleLoader {
    /// Create a loader with no search paths.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory to scan for `*.modl` artifacts.
    pub fn add_search_path<P: AsRef<Path>>(&mut self, path: P) {
        let path = path.as_ref().to_path_buf();
        if !self.search_paths.contains(&path) {
            self.search_paths.push(path);
        }
    }

    /// Get all configured search paths.
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Scan all search paths for artifacts.
    ///
    /// Each artifact is checksum-verified and its manifest re-validated.
    /// Artifacts that fail are logged and skipped so one broken module
    /// cannot block the rest. Returns the ids of the modules discovered in
    /// this pass.
    ///
    /// # Errors
    ///
    /// Fails only if a search path exists but cannot be read.
    pub fn discover(&mut self) -> AppResult<Vec<String>> {
        let mut discovered = Vec::new();

        for search_path in self.search_paths.clone() {
            if !search_path.exists() {
                debug!(path = %search_path.display(), "module search path does not exist");
                continue;
            }

            for entry in std::fs::read_dir(&search_path)?.flatten() {
                let path = entry.path();
                let is_artifact = path.is_dir()
                    && path.extension().and_then(|e| e.to_str()) == Some(ARTIFACT_EXTENSION);
                if !is_artifact {
                    continue;
                }

                match PackagedArtifact::open(&path) {
                    Ok(artifact) => {
                        let module_id = artifact.descriptor().module_id().to_string();
                        info!(
                            module_id = %module_id,
                            artifact = %path.display(),
                            "discovered module"
                        );
                        discovered.push(module_id.clone());
                        let previous = self.modules.insert(
                            module_id,
                            DiscoveredModule {
                                descriptor: artifact.descriptor().clone(),
                                artifact_dir: path,
                            },
                        );
                        if let Some(previous) = previous {
                            warn!(
                                module_id = previous.descriptor.module_id(),
                                replaced = %previous.artifact_dir.display(),
                                "module id claimed by more than one artifact"
                            );
                        }
                    }
                    Err(e) => {
                        warn!(artifact = %path.display(), error = %e, "skipping unreadable artifact");
                    }
                }
            }
        }

        Ok(discovered)
    }

    /// All discovered modules, ordered by module id.
    pub fn list_modules(&self) -> Vec<&DiscoveredModule> {
        self.modules.values().collect()
    }

    /// Get a discovered module by id.
    pub fn get_module(&self, module_id: &str) -> Option<&DiscoveredModule> {
        self.modules.get(module_id)
    }

    /// Check if a module id is available.
    pub fn has_module(&self, module_id: &str) -> bool {
        self.modules.contains_key(module_id)
    }

    /// Load a discovered module: re-verify its artifact and instantiate a
    /// hook for every binding through `registry`.
    ///
    /// The artifact is re-opened rather than served from the discovery
    /// index, so a file changed on disk since discovery is caught here.
    ///
    /// # Errors
    ///
    /// - `UnknownModule` if the id was not discovered
    /// - any [`PackagedArtifact::open`] error
    /// - `HookNotRegistered` if a binding's entry point has no factory
    pub fn load(&self, module_id: &str, registry: &HookRegistry) -> AppResult<LoadedModule> {
        let module = self
            .modules
            .get(module_id)
            .ok_or_else(|| ModkitError::UnknownModule(module_id.to_string()))?;

        let artifact = PackagedArtifact::open(&module.artifact_dir)?;
        let descriptor = artifact.into_descriptor();

        let mut hooks = Vec::new();
        for binding in descriptor.hooks() {
            let hook = registry.instantiate(binding.entry_point().as_str())?;
            debug!(
                module_id,
                capability = %binding.capability(),
                entry_point = %binding.entry_point(),
                "instantiated hook"
            );
            hooks.push((binding.capability(), hook));
        }

        info!(module_id, hooks = hooks.len(), "loaded module");
        Ok(LoadedModule {
            descriptor,
            hooks,
            started: false,
        })
    }
}

/// A module with instantiated hooks, ready to start.
pub struct LoadedModule {
    descriptor: ModuleDescriptor,
    /// Hooks in canonical capability order
    hooks: Vec<(Capability, Box<dyn ModuleHook>)>,
    started: bool,
}

impl LoadedModule {
    /// The module's descriptor.
    pub fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    /// Capabilities with instantiated hooks, in start order.
    pub fn capabilities(&self) -> Vec<Capability> {
        self.hooks.iter().map(|(cap, _)| *cap).collect()
    }

    /// True once `start` has completed.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Run the lifecycle: `setup` for every hook, then `startup` for every
    /// hook, in canonical capability order.
    ///
    /// On failure the error names the capability and phase; hooks that were
    /// already set up are not unwound, so callers should follow a failed
    /// start with [`shutdown`](Self::shutdown).
    ///
    /// # Errors
    ///
    /// Returns `HookFailed` for the first failing lifecycle call.
    pub fn start(&mut self, ctx: &HostContext) -> AppResult<()> {
        for (capability, hook) in &mut self.hooks {
            hook.setup(ctx).map_err(|source| ModkitError::HookFailed {
                capability: *capability,
                phase: "setup",
                source,
            })?;
        }
        for (capability, hook) in &mut self.hooks {
            hook.startup(ctx).map_err(|source| ModkitError::HookFailed {
                capability: *capability,
                phase: "startup",
                source,
            })?;
        }
        self.started = true;
        info!(module_id = self.descriptor.module_id(), "module started");
        Ok(())
    }

    /// Shut down every hook, in reverse start order.
    pub fn shutdown(&mut self) {
        for (capability, hook) in self.hooks.iter_mut().rev() {
            debug!(
                module_id = self.descriptor.module_id(),
                capability = %capability,
                "shutting down hook"
            );
            hook.shutdown();
        }
        self.started = false;
    }
}

impl std::fmt::Debug for LoadedModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModule")
            .field("module_id", &self.descriptor.module_id())
            .field("capabilities", &self.capabilities())
            .field("started", &self.started)
            .finish()
    }
}
