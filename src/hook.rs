//! The module hook lifecycle contract.
//!
//! A hook is the entry point the host instantiates for one capability of a
//! loaded module. Lifecycle: `setup` is called for every hook of a module,
//! then `startup` for every hook, and `shutdown` (in reverse order) when the
//! module is unloaded. `shutdown` is infallible; unloading must always be
//! able to complete.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error returned by a failing hook lifecycle call.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct HookError(pub String);

impl HookError {
    /// Build a hook error from any message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Host-provided context handed to hook lifecycle calls.
#[derive(Debug, Clone)]
pub struct HostContext {
    module_id: String,
    data_dir: PathBuf,
}

impl HostContext {
    /// Create a context for a module.
    pub fn new(module_id: &str, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            module_id: module_id.to_string(),
            data_dir: data_dir.into(),
        }
    }

    /// The id of the module the hook belongs to.
    pub fn module_id(&self) -> &str {
        &self.module_id
    }

    /// Directory the module may persist data under.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// A module entry point.
///
/// Implementations log through the host's `tracing` subscriber.
pub trait ModuleHook: Send {
    /// Prepare resources. Called before any hook of the module starts.
    fn setup(&mut self, ctx: &HostContext) -> Result<(), HookError>;

    /// Begin execution. Called after every hook of the module is set up.
    fn startup(&mut self, ctx: &HostContext) -> Result<(), HookError>;

    /// Release resources. Must not fail.
    fn shutdown(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_context_accessors() {
        let ctx = HostContext::new("com.example.demo", "/var/lib/host/modules");
        assert_eq!(ctx.module_id(), "com.example.demo");
        assert_eq!(ctx.data_dir(), Path::new("/var/lib/host/modules"));
    }
}
