//! End-to-end packaging tests: author a manifest, validate it, package it,
//! and read it back through the artifact layer.

use modkit::{package, validate, ModuleManifest, ModuleVersion, PackagedArtifact};

fn hello_manifest() -> ModuleManifest {
    ModuleManifest::new(
        "com.example.hellomodule",
        "com.example.hellomodule",
        "Hello Module",
        "1.0.0",
    )
    .with_description("A minimal example module.")
    .with_project_url("https://example.com/hellomodule")
    .with_license("LICENSE.txt")
    .with_hook("G", "com.example.hellomodule.gateway.HelloGatewayHook")
    .with_hook("C", "com.example.hellomodule.client.HelloClientHook")
    .with_scope("gateway", "G")
    .with_scope("common", "GC")
}

#[test]
fn packaged_descriptor_round_trips() {
    let out = tempfile::tempdir().unwrap();
    let descriptor = validate(&hello_manifest()).unwrap();

    let artifact_dir = package(&descriptor, out.path()).unwrap();
    let reread = PackagedArtifact::open(&artifact_dir).unwrap();

    assert_eq!(reread.descriptor(), &descriptor);
    assert_eq!(reread.descriptor().version(), ModuleVersion::new(1, 0, 0));
}

#[test]
fn artifact_manifest_is_canonical() {
    let out = tempfile::tempdir().unwrap();
    let descriptor = validate(&hello_manifest()).unwrap();
    let artifact_dir = package(&descriptor, out.path()).unwrap();

    // Packaging the same descriptor again produces byte-identical files.
    let first = std::fs::read(artifact_dir.join("module.toml")).unwrap();
    let again = tempfile::tempdir().unwrap();
    let second_dir = package(&descriptor, again.path()).unwrap();
    let second = std::fs::read(second_dir.join("module.toml")).unwrap();
    assert_eq!(first, second);

    // And the emitted manifest re-validates to an equal descriptor.
    let manifest = ModuleManifest::from_path(artifact_dir.join("module.toml")).unwrap();
    let revalidated = validate(&manifest).unwrap();
    assert_eq!(revalidated, descriptor);
}

#[test]
fn builder_order_does_not_affect_artifact_bytes() {
    let shuffled = ModuleManifest::new(
        "com.example.hellomodule",
        "com.example.hellomodule",
        "Hello Module",
        "1.0.0",
    )
    .with_description("A minimal example module.")
    .with_project_url("https://example.com/hellomodule")
    .with_license("LICENSE.txt")
    .with_scope("common", "CG") // unordered codes, different declaration order
    .with_scope("gateway", "G")
    .with_hook("C", "com.example.hellomodule.client.HelloClientHook")
    .with_hook("G", "com.example.hellomodule.gateway.HelloGatewayHook");

    let a = validate(&hello_manifest()).unwrap();
    let b = validate(&shuffled).unwrap();
    assert_eq!(a, b);

    let out_a = tempfile::tempdir().unwrap();
    let out_b = tempfile::tempdir().unwrap();
    let bytes_a =
        std::fs::read(package(&a, out_a.path()).unwrap().join("module.toml")).unwrap();
    let bytes_b =
        std::fs::read(package(&b, out_b.path()).unwrap().join("module.toml")).unwrap();
    assert_eq!(bytes_a, bytes_b);
}

#[test]
fn tampered_artifact_is_rejected() {
    let out = tempfile::tempdir().unwrap();
    let descriptor = validate(&hello_manifest()).unwrap();
    let artifact_dir = package(&descriptor, out.path()).unwrap();

    let manifest_path = artifact_dir.join("module.toml");
    let text = std::fs::read_to_string(&manifest_path)
        .unwrap()
        .replace("1.0.0", "9.9.9");
    std::fs::write(&manifest_path, text).unwrap();

    assert!(PackagedArtifact::open(&artifact_dir).is_err());
}
