//! Capability manifest — the TOML document naming a scan's capability set.
//!
//! ```toml
//! paths = ["~/plugins"]
//!
//! [[capability]]
//! name = "shape"
//! requires = ["area", "perimeter"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::capability::CapabilityDescriptor;

/// Parsed capability manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct CapabilityManifest {
    /// Capabilities to scan for.
    #[serde(rename = "capability", default)]
    pub capabilities: Vec<CapabilityDescriptor>,
    /// Extra scan roots, tilde-expanded by the consumer.
    #[serde(default)]
    pub paths: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("manifest {path} requires a non-empty capability name")]
    EmptyName { path: PathBuf },
}

/// Loads and validates a capability manifest.
pub fn load_manifest(path: &Path) -> Result<CapabilityManifest, ManifestError> {
    let raw = fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let manifest: CapabilityManifest =
        toml::from_str(&raw).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    if manifest.capabilities.iter().any(|c| c.name.trim().is_empty()) {
        return Err(ManifestError::EmptyName {
            path: path.to_path_buf(),
        });
    }
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn load_valid_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("caps.toml");
        fs::write(
            &path,
            r#"
paths = ["~/plugins"]

[[capability]]
name = "shape"
requires = ["area", "perimeter"]

[[capability]]
name = "storage"
requires = ["store_open"]
"#,
        )
        .unwrap();

        let manifest = load_manifest(&path).unwrap();
        assert_eq!(manifest.capabilities.len(), 2);
        assert_eq!(manifest.capabilities[0].name, "shape");
        assert_eq!(manifest.capabilities[0].requires, ["area", "perimeter"]);
        assert_eq!(manifest.paths, ["~/plugins"]);
    }

    #[test]
    fn requires_defaults_to_universal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("caps.toml");
        fs::write(
            &path,
            r#"
[[capability]]
name = "any"
"#,
        )
        .unwrap();

        let manifest = load_manifest(&path).unwrap();
        assert!(manifest.capabilities[0].requires.is_empty());
    }

    #[test]
    fn load_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_manifest(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ManifestError::Read { .. }));
    }

    #[test]
    fn load_manifest_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("caps.toml");
        fs::write(&path, "not valid toml {{{{").unwrap();
        let err = load_manifest(&path).unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
    }

    #[test]
    fn load_manifest_empty_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("caps.toml");
        fs::write(
            &path,
            r#"
[[capability]]
name = "  "
"#,
        )
        .unwrap();
        let err = load_manifest(&path).unwrap_err();
        assert!(matches!(err, ManifestError::EmptyName { .. }));
    }
}
