//! Loader integration tests: discovery over a modules directory, hook
//! instantiation through the registry, and lifecycle ordering.

use std::sync::{Arc, Mutex};

use modkit::{
    package, validate, HookError, HookRegistry, HostContext, ModkitError, ModuleHook,
    ModuleLoader, ModuleManifest,
};

/// Hook that records its lifecycle calls into a shared event log.
struct RecordingHook {
    label: &'static str,
    events: Arc<Mutex<Vec<String>>>,
    fail_on_startup: bool,
}

impl RecordingHook {
    fn record(&self, phase: &str) {
        self.events
            .lock()
            .unwrap()
            .push(format!("{}:{}", self.label, phase));
    }
}

impl ModuleHook for RecordingHook {
    fn setup(&mut self, ctx: &HostContext) -> Result<(), HookError> {
        assert_eq!(ctx.module_id(), "com.example.hellomodule");
        self.record("setup");
        Ok(())
    }

    fn startup(&mut self, _ctx: &HostContext) -> Result<(), HookError> {
        if self.fail_on_startup {
            return Err(HookError::msg("startup refused"));
        }
        self.record("startup");
        Ok(())
    }

    fn shutdown(&mut self) {
        self.record("shutdown");
    }
}

fn hello_manifest() -> ModuleManifest {
    ModuleManifest::new(
        "com.example.hellomodule",
        "com.example.hellomodule",
        "Hello Module",
        "1.0.0",
    )
    .with_hook("G", "com.example.hellomodule.gateway.HelloGatewayHook")
    .with_hook("C", "com.example.hellomodule.client.HelloClientHook")
    .with_scope("gateway", "G")
    .with_scope("common", "GC")
}

fn registry_with(
    events: &Arc<Mutex<Vec<String>>>,
    fail_on_startup: bool,
) -> HookRegistry {
    let mut registry = HookRegistry::new();
    let gateway_events = Arc::clone(events);
    registry
        .register("com.example.hellomodule.gateway.HelloGatewayHook", move || {
            Box::new(RecordingHook {
                label: "G",
                events: Arc::clone(&gateway_events),
                fail_on_startup: false,
            })
        })
        .unwrap();
    let client_events = Arc::clone(events);
    registry
        .register("com.example.hellomodule.client.HelloClientHook", move || {
            Box::new(RecordingHook {
                label: "C",
                events: Arc::clone(&client_events),
                fail_on_startup,
            })
        })
        .unwrap();
    registry
}

#[test]
fn discover_load_and_run_lifecycle() {
    let modules_dir = tempfile::tempdir().unwrap();
    let descriptor = validate(&hello_manifest()).unwrap();
    package(&descriptor, modules_dir.path()).unwrap();

    let mut loader = ModuleLoader::new();
    loader.add_search_path(modules_dir.path());
    let discovered = loader.discover().unwrap();
    assert_eq!(discovered, vec!["com.example.hellomodule"]);
    assert!(loader.has_module("com.example.hellomodule"));
    assert!(!loader.has_module("com.example.other"));

    let events = Arc::new(Mutex::new(Vec::new()));
    let registry = registry_with(&events, false);

    let mut module = loader.load("com.example.hellomodule", &registry).unwrap();
    let ctx = HostContext::new("com.example.hellomodule", modules_dir.path());
    module.start(&ctx).unwrap();
    assert!(module.is_started());
    module.shutdown();

    // Every hook is set up before any hook starts; shutdown runs in reverse.
    let log = events.lock().unwrap().clone();
    assert_eq!(
        log,
        vec![
            "G:setup",
            "C:setup",
            "G:startup",
            "C:startup",
            "C:shutdown",
            "G:shutdown",
        ]
    );
}

#[test]
fn unregistered_entry_point_fails_load() {
    let modules_dir = tempfile::tempdir().unwrap();
    let descriptor = validate(&hello_manifest()).unwrap();
    package(&descriptor, modules_dir.path()).unwrap();

    let mut loader = ModuleLoader::new();
    loader.add_search_path(modules_dir.path());
    loader.discover().unwrap();

    // Only the gateway hook is registered; the client one is missing.
    let events = Arc::new(Mutex::new(Vec::new()));
    let mut registry = HookRegistry::new();
    let gateway_events = Arc::clone(&events);
    registry
        .register("com.example.hellomodule.gateway.HelloGatewayHook", move || {
            Box::new(RecordingHook {
                label: "G",
                events: Arc::clone(&gateway_events),
                fail_on_startup: false,
            })
        })
        .unwrap();

    let err = loader
        .load("com.example.hellomodule", &registry)
        .unwrap_err();
    assert!(matches!(
        err,
        ModkitError::HookNotRegistered(name)
            if name == "com.example.hellomodule.client.HelloClientHook"
    ));
}

#[test]
fn failed_startup_names_capability_and_phase() {
    let modules_dir = tempfile::tempdir().unwrap();
    let descriptor = validate(&hello_manifest()).unwrap();
    package(&descriptor, modules_dir.path()).unwrap();

    let mut loader = ModuleLoader::new();
    loader.add_search_path(modules_dir.path());
    loader.discover().unwrap();

    let events = Arc::new(Mutex::new(Vec::new()));
    let registry = registry_with(&events, true);

    let mut module = loader.load("com.example.hellomodule", &registry).unwrap();
    let ctx = HostContext::new("com.example.hellomodule", modules_dir.path());
    let err = module.start(&ctx).unwrap_err();
    assert!(err.to_string().contains("capability C"));
    assert!(err.to_string().contains("startup"));
    assert!(!module.is_started());

    // The failed start left both hooks set up and the gateway started;
    // shutdown still unwinds everything.
    module.shutdown();
    let log = events.lock().unwrap().clone();
    assert_eq!(
        log,
        vec![
            "G:setup",
            "C:setup",
            "G:startup",
            "C:shutdown",
            "G:shutdown",
        ]
    );
}

#[test]
fn unknown_module_id_fails_load() {
    let loader = ModuleLoader::new();
    let registry = HookRegistry::new();
    let err = loader.load("com.example.missing", &registry).unwrap_err();
    assert!(matches!(err, ModkitError::UnknownModule(_)));
}

#[test]
fn broken_artifact_is_skipped_during_discovery() {
    let modules_dir = tempfile::tempdir().unwrap();
    let descriptor = validate(&hello_manifest()).unwrap();
    package(&descriptor, modules_dir.path()).unwrap();

    // A directory with the right extension but no manifest.
    std::fs::create_dir(modules_dir.path().join("broken-0.0.1.modl")).unwrap();

    let mut loader = ModuleLoader::new();
    loader.add_search_path(modules_dir.path());
    let discovered = loader.discover().unwrap();
    assert_eq!(discovered, vec!["com.example.hellomodule"]);
    assert_eq!(loader.list_modules().len(), 1);
}
