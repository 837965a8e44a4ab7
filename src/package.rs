//! Packaging validated descriptors into artifacts.
//!
//! An artifact is a directory named `<module-id>-<version>.modl` holding the
//! canonical manifest (`module.toml`) and a SHA-256 checksum of its bytes
//! (`module.sha256`). Packaging takes a finalized
//! [`ModuleDescriptor`](crate::ModuleDescriptor), so an artifact can only
//! ever contain a declaration that passed validation; opening an artifact
//! verifies the checksum and re-validates the manifest before handing the
//! descriptor to the host.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::info;

use crate::descriptor::ModuleDescriptor;
use crate::error::{AppResult, ModkitError};
use crate::manifest::{ManifestError, ModuleManifest};
use crate::validate;

/// Manifest file name inside an artifact.
pub const MANIFEST_FILE: &str = "module.toml";

/// Checksum file name inside an artifact.
pub const CHECKSUM_FILE: &str = "module.sha256";

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Package a validated descriptor into `out_dir`.
///
/// Creates `<out_dir>/<module-id>-<version>.modl/` and writes the canonical
/// manifest plus its checksum. Returns the artifact directory.
///
/// # Errors
///
/// Fails on I/O errors or if the manifest cannot be emitted.
pub fn package(descriptor: &ModuleDescriptor, out_dir: &Path) -> AppResult<PathBuf> {
    let artifact_dir = out_dir.join(descriptor.artifact_name());
    std::fs::create_dir_all(&artifact_dir)?;

    let manifest_text = descriptor.to_manifest().to_toml_string()?;
    let manifest_path = artifact_dir.join(MANIFEST_FILE);
    std::fs::write(&manifest_path, &manifest_text).map_err(|source| ManifestError::Write {
        path: manifest_path,
        source,
    })?;

    let checksum = sha256_hex(manifest_text.as_bytes());
    std::fs::write(artifact_dir.join(CHECKSUM_FILE), format!("{checksum}\n"))?;

    info!(
        module_id = descriptor.module_id(),
        artifact = %artifact_dir.display(),
        "packaged module"
    );
    Ok(artifact_dir)
}

/// A packaged artifact that has been re-read and verified.
#[derive(Debug, Clone)]
pub struct PackagedArtifact {
    dir: PathBuf,
    descriptor: ModuleDescriptor,
}

impl PackagedArtifact {
    /// Open an artifact directory: verify the manifest checksum, then parse
    /// and re-validate the manifest.
    ///
    /// # Errors
    ///
    /// - `MissingManifest` if `module.toml` is absent
    /// - `ChecksumMismatch` if the manifest does not hash to the declared value
    /// - `Validation` if the manifest no longer passes validation
    pub fn open<P: AsRef<Path>>(dir: P) -> AppResult<Self> {
        let dir = dir.as_ref();
        let manifest_path = dir.join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            return Err(ModkitError::MissingManifest(dir.to_path_buf()));
        }

        let manifest_text = std::fs::read_to_string(&manifest_path)?;
        let declared = std::fs::read_to_string(dir.join(CHECKSUM_FILE))?
            .trim()
            .to_string();
        let actual = sha256_hex(manifest_text.as_bytes());
        if declared != actual {
            return Err(ModkitError::ChecksumMismatch {
                path: dir.to_path_buf(),
                declared,
                actual,
            });
        }

        let manifest = ModuleManifest::from_toml_str(&manifest_text)?;
        let descriptor = validate::validate(&manifest)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            descriptor,
        })
    }

    /// The artifact directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The verified descriptor.
    pub fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }

    /// Consume the artifact, yielding its descriptor.
    pub fn into_descriptor(self) -> ModuleDescriptor {
        self.descriptor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ModuleManifest;

    fn demo_descriptor() -> ModuleDescriptor {
        let manifest = ModuleManifest::new("com.example", "com.example.demo", "Demo", "1.0.0")
            .with_license("MIT")
            .with_hook("G", "com.example.demo.GatewayHook")
            .with_scope("gateway", "G");
        validate::validate(&manifest).unwrap()
    }

    #[test]
    fn test_package_and_open() {
        let out = tempfile::tempdir().unwrap();
        let descriptor = demo_descriptor();

        let artifact_dir = package(&descriptor, out.path()).unwrap();
        assert_eq!(
            artifact_dir.file_name().and_then(|n| n.to_str()),
            Some("com.example.demo-1.0.0.modl")
        );

        let artifact = PackagedArtifact::open(&artifact_dir).unwrap();
        assert_eq!(artifact.descriptor(), &descriptor);
    }

    #[test]
    fn test_tampered_manifest_detected() {
        let out = tempfile::tempdir().unwrap();
        let artifact_dir = package(&demo_descriptor(), out.path()).unwrap();

        let manifest_path = artifact_dir.join(MANIFEST_FILE);
        let mut text = std::fs::read_to_string(&manifest_path).unwrap();
        text.push_str("\n# tampered\n");
        std::fs::write(&manifest_path, text).unwrap();

        let err = PackagedArtifact::open(&artifact_dir).unwrap_err();
        assert!(matches!(err, ModkitError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_missing_manifest() {
        let out = tempfile::tempdir().unwrap();
        let err = PackagedArtifact::open(out.path()).unwrap_err();
        assert!(matches!(err, ModkitError::MissingManifest(_)));
    }
}
