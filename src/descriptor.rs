//! Finalized module descriptors.
//!
//! A [`ModuleDescriptor`] is the immutable result of validating a
//! [`ModuleManifest`](crate::ModuleManifest). Its fields are private and it
//! has no public constructor; the only way to obtain one is through
//! [`crate::validate`], which is what makes "holding a descriptor" mean
//! "this declaration is internally consistent".
//!
//! Lifecycle: a descriptor is constructed once at build time, serialized
//! into the packaged artifact, and read back by the host loader at module
//! install/start time. No mutation occurs after finalization.

use serde::Serialize;

use crate::capability::{Capability, CapabilitySet};
use crate::manifest::ModuleManifest;
use crate::version::ModuleVersion;

/// A validated, fully qualified entry-point name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EntryPoint(String);

impl EntryPoint {
    pub(crate) fn new(name: String) -> Self {
        Self(name)
    }

    /// The dotted entry-point path.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named build scope and the capabilities it participates in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scope {
    name: String,
    capabilities: CapabilitySet,
}

impl Scope {
    pub(crate) fn new(name: String, capabilities: CapabilitySet) -> Self {
        Self { name, capabilities }
    }

    /// The scope (subproject) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The capabilities this scope references.
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }
}

/// A validated binding from one capability to one entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookBinding {
    capability: Capability,
    entry_point: EntryPoint,
}

impl HookBinding {
    pub(crate) fn new(capability: Capability, entry_point: EntryPoint) -> Self {
        Self {
            capability,
            entry_point,
        }
    }

    /// The capability this hook serves.
    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// The entry point the host instantiates for this capability.
    pub fn entry_point(&self) -> &EntryPoint {
        &self.entry_point
    }
}

/// The finalized, immutable description of a module.
///
/// Scopes are held sorted by name and hook bindings in canonical capability
/// order, so equal descriptors always lower to byte-identical manifests.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleDescriptor {
    group: String,
    module_id: String,
    name: String,
    version: ModuleVersion,
    description: String,
    project_url: String,
    license: String,
    scopes: Vec<Scope>,
    hooks: Vec<HookBinding>,
}

impl ModuleDescriptor {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        group: String,
        module_id: String,
        name: String,
        version: ModuleVersion,
        description: String,
        project_url: String,
        license: String,
        mut scopes: Vec<Scope>,
        mut hooks: Vec<HookBinding>,
    ) -> Self {
        scopes.sort_by(|a, b| a.name.cmp(&b.name));
        hooks.sort_by_key(|h| h.capability);
        Self {
            group,
            module_id,
            name,
            version,
            description,
            project_url,
            license,
            scopes,
            hooks,
        }
    }

    /// Publisher group.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Globally unique module identifier.
    pub fn module_id(&self) -> &str {
        &self.module_id
    }

    /// Human-readable module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Module version.
    pub fn version(&self) -> ModuleVersion {
        self.version
    }

    /// Free-text description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Project homepage.
    pub fn project_url(&self) -> &str {
        &self.project_url
    }

    /// License identifier or file reference.
    pub fn license(&self) -> &str {
        &self.license
    }

    /// Declared scopes, sorted by name.
    pub fn scopes(&self) -> &[Scope] {
        &self.scopes
    }

    /// Hook bindings in canonical capability order.
    pub fn hooks(&self) -> &[HookBinding] {
        &self.hooks
    }

    /// Look up the binding for a capability, if any.
    pub fn hook_for(&self, capability: Capability) -> Option<&HookBinding> {
        self.hooks.iter().find(|h| h.capability == capability)
    }

    /// The artifact directory name for this module, e.g.
    /// `com.example.hellomodule-1.0.0.modl`.
    pub fn artifact_name(&self) -> String {
        format!("{}-{}.modl", self.module_id, self.version)
    }

    /// Lower the descriptor back to its manifest (draft) form.
    ///
    /// Validating the result yields an equal descriptor; packaging uses this
    /// to emit the canonical manifest into the artifact.
    pub fn to_manifest(&self) -> ModuleManifest {
        let mut manifest = ModuleManifest::new(
            &self.group,
            &self.module_id,
            &self.name,
            &self.version.to_string(),
        )
        .with_description(&self.description)
        .with_project_url(&self.project_url)
        .with_license(&self.license);
        for hook in &self.hooks {
            manifest = manifest.with_hook(
                &hook.capability.code().to_string(),
                hook.entry_point.as_str(),
            );
        }
        for scope in &self.scopes {
            manifest = manifest.with_scope(&scope.name, &scope.capabilities.code_string());
        }
        manifest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_ordering() {
        let descriptor = ModuleDescriptor::new(
            "com.example".to_string(),
            "com.example.demo".to_string(),
            "Demo".to_string(),
            ModuleVersion::new(1, 0, 0),
            String::new(),
            String::new(),
            String::new(),
            vec![
                Scope::new("gateway".to_string(), CapabilitySet::parse("G").unwrap()),
                Scope::new("common".to_string(), CapabilitySet::parse("GC").unwrap()),
            ],
            vec![
                HookBinding::new(
                    Capability::Client,
                    EntryPoint::new("com.example.demo.ClientHook".to_string()),
                ),
                HookBinding::new(
                    Capability::Gateway,
                    EntryPoint::new("com.example.demo.GatewayHook".to_string()),
                ),
            ],
        );

        assert_eq!(descriptor.scopes()[0].name(), "common");
        assert_eq!(descriptor.hooks()[0].capability(), Capability::Gateway);
        assert_eq!(
            descriptor.artifact_name(),
            "com.example.demo-1.0.0.modl"
        );
    }

    #[test]
    fn test_hook_for() {
        let descriptor = ModuleDescriptor::new(
            "com.example".to_string(),
            "com.example.demo".to_string(),
            "Demo".to_string(),
            ModuleVersion::new(1, 0, 0),
            String::new(),
            String::new(),
            String::new(),
            vec![],
            vec![HookBinding::new(
                Capability::Gateway,
                EntryPoint::new("com.example.demo.GatewayHook".to_string()),
            )],
        );
        assert!(descriptor.hook_for(Capability::Gateway).is_some());
        assert!(descriptor.hook_for(Capability::Designer).is_none());
    }
}
