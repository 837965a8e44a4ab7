//! The hook factory registry.
//!
//! The host cannot instantiate an entry point from its name alone; there is
//! no reflection. Instead, the embedding process registers a factory closure
//! for every entry-point name it ships, once, at startup. Loading a module
//! then resolves each of its hook bindings against this registry.

use std::collections::HashMap;

use tracing::debug;

use crate::error::ModkitError;
use crate::hook::ModuleHook;

/// Factory producing a fresh hook instance.
pub type HookFactory = Box<dyn Fn() -> Box<dyn ModuleHook> + Send + Sync>;

/// Maps entry-point names to hook factories.
///
/// Populated at process start; lookups only afterwards.
#[derive(Default)]
pub struct HookRegistry {
    factories: HashMap<String, HookFactory>,
}

impl HookRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for an entry-point name.
    ///
    /// # Errors
    ///
    /// Returns `HookAlreadyRegistered` if the name is taken; overwriting a
    /// registration silently would let one module capture another's hooks.
    pub fn register<F>(&mut self, entry_point: &str, factory: F) -> Result<(), ModkitError>
    where
        F: Fn() -> Box<dyn ModuleHook> + Send + Sync + 'static,
    {
        if self.factories.contains_key(entry_point) {
            return Err(ModkitError::HookAlreadyRegistered(entry_point.to_string()));
        }
        debug!(entry_point, "registered hook factory");
        self.factories
            .insert(entry_point.to_string(), Box::new(factory));
        Ok(())
    }

    /// True if a factory is registered for the name.
    pub fn contains(&self, entry_point: &str) -> bool {
        self.factories.contains_key(entry_point)
    }

    /// Instantiate a hook by entry-point name.
    ///
    /// # Errors
    ///
    /// Returns `HookNotRegistered` if no factory is registered.
    pub fn instantiate(&self, entry_point: &str) -> Result<Box<dyn ModuleHook>, ModkitError> {
        let factory = self
            .factories
            .get(entry_point)
            .ok_or_else(|| ModkitError::HookNotRegistered(entry_point.to_string()))?;
        Ok(factory())
    }

    /// All registered entry-point names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered factories.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("entry_points", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::{HookError, HostContext};

    struct NoopHook;

    impl ModuleHook for NoopHook {
        fn setup(&mut self, _ctx: &HostContext) -> Result<(), HookError> {
            Ok(())
        }
        fn startup(&mut self, _ctx: &HostContext) -> Result<(), HookError> {
            Ok(())
        }
        fn shutdown(&mut self) {}
    }

    #[test]
    fn test_register_and_instantiate() {
        let mut registry = HookRegistry::new();
        registry
            .register("com.example.demo.GatewayHook", || Box::new(NoopHook))
            .unwrap();

        assert!(registry.contains("com.example.demo.GatewayHook"));
        assert!(registry.instantiate("com.example.demo.GatewayHook").is_ok());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_entry_point() {
        let registry = HookRegistry::new();
        // `Box<dyn ModuleHook>` is not `Debug`, so `unwrap_err()` won't type-check;
        // extract the error by hand without changing what is asserted.
        let err = match registry.instantiate("com.example.Missing") {
            Ok(_) => panic!("expected instantiate to fail for unknown entry point"),
            Err(e) => e,
        };
        assert!(matches!(err, ModkitError::HookNotRegistered(name) if name == "com.example.Missing"));
    }

    #[test]
    fn test_reregistration_rejected() {
        let mut registry = HookRegistry::new();
        registry
            .register("com.example.demo.GatewayHook", || Box::new(NoopHook))
            .unwrap();
        let err = registry
            .register("com.example.demo.GatewayHook", || Box::new(NoopHook))
            .unwrap_err();
        assert!(matches!(err, ModkitError::HookAlreadyRegistered(_)));
    }

    #[test]
    fn test_names_sorted() {
        let mut registry = HookRegistry::new();
        registry.register("b.B", || Box::new(NoopHook)).unwrap();
        registry.register("a.A", || Box::new(NoopHook)).unwrap();
        assert_eq!(registry.names(), vec!["a.A", "b.B"]);
    }
}
