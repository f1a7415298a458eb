//! YAML emit manifest.
//!
//! The manifest lists the provenance entries of one generator together with
//! the generator's identity and run settings.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! identity: pgdcp
//! generator_version: 0.1.0
//! base_dir: .
//! capture:
//!   timeout_ms: 60000
//! sources:
//!   - source: 010_context.sqla.ts
//!     index: 10
//!     interpreter: [deno, run, -A]
//!   - source: seed.sql
//!     confidentiality: contains-secrets
//!     content: "SELECT 1;"
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;

use pgdcp_core::ProvenanceEntry;
use serde::{Deserialize, Serialize};

use crate::capture::{CaptureOptions, DEFAULT_CAPTURE_TIMEOUT_MS};
use crate::error::Result;

/// Settings for process-backed sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Per-program timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_CAPTURE_TIMEOUT_MS
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_CAPTURE_TIMEOUT_MS,
        }
    }
}

/// Top-level emit manifest.
///
/// # Examples
///
/// ```
/// # let yaml = r#"
/// # version: "1.0"
/// # identity: pgdcp
/// # sources:
/// #   - source: a.sql
/// #     content: "SELECT 1;"
/// # "#;
/// let manifest: pgdcp_persist::EmitManifest = serde_yaml::from_str(yaml).unwrap();
/// assert_eq!(manifest.identity, "pgdcp");
/// assert_eq!(manifest.sources.len(), 1);
/// assert_eq!(manifest.capture.timeout_ms, 120_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitManifest {
    /// Manifest format version (e.g., `"1.0"`).
    pub version: String,
    /// Generator identity used in headers and reports.
    pub identity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator_version: Option<String>,
    /// Source and destination base directory; relative values resolve
    /// against the manifest's own directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,
    #[serde(default)]
    pub capture: CaptureConfig,
    /// Ordered provenance entries.
    #[serde(default)]
    pub sources: Vec<ProvenanceEntry>,
}

impl EmitManifest {
    pub fn new(identity: impl Into<String>, sources: Vec<ProvenanceEntry>) -> Self {
        Self {
            version: "1.0".to_string(),
            identity: identity.into(),
            generator_version: None,
            base_dir: None,
            capture: CaptureConfig::default(),
            sources,
        }
    }

    /// Loads a manifest from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::PersistError::Io) if the file cannot be read,
    /// or [`Yaml`](crate::PersistError::Yaml) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let manifest = serde_yaml::from_reader(reader)?;
        Ok(manifest)
    }

    /// Saves the manifest as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Base directory for sources and outputs, given where the manifest
    /// was loaded from.
    pub fn resolved_base_dir(&self, manifest_path: &Path) -> PathBuf {
        let manifest_dir = match manifest_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        match self.base_dir.as_ref() {
            Some(base) if base.is_absolute() => base.clone(),
            Some(base) => manifest_dir.join(base),
            None => manifest_dir,
        }
    }

    pub fn capture_options(&self) -> CaptureOptions {
        CaptureOptions {
            timeout: Duration::from_millis(self.capture.timeout_ms),
            ..CaptureOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgdcp_core::Confidentiality;

    fn sample_yaml() -> &'static str {
        r#"
version: "1.0"
identity: pgdcp
generator_version: 0.1.0
base_dir: gen
capture:
  timeout_ms: 5000
sources:
  - source: 010_context.sqla.ts
    index: 10
    interpreter: [deno, run, -A]
  - source: seed.sql
    confidentiality: contains-secrets
    content: "SELECT 1;"
"#
    }

    #[test]
    fn test_parse_full_manifest() {
        let manifest: EmitManifest = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(manifest.identity, "pgdcp");
        assert_eq!(manifest.generator_version.as_deref(), Some("0.1.0"));
        assert_eq!(manifest.capture.timeout_ms, 5000);
        assert_eq!(manifest.sources.len(), 2);
        assert_eq!(manifest.sources[0].index, Some(10));
        assert_eq!(
            manifest.sources[0].interpreter.as_deref(),
            Some(&["deno".to_string(), "run".to_string(), "-A".to_string()][..])
        );
        assert_eq!(
            manifest.sources[1].confidentiality,
            Confidentiality::ContainsSecrets
        );
        assert!(manifest.sources[1].is_persistable_content());
        assert_eq!(
            manifest.capture_options().timeout,
            Duration::from_millis(5000)
        );
    }

    #[test]
    fn test_resolved_base_dir() {
        let mut manifest: EmitManifest = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(
            manifest.resolved_base_dir(Path::new("/repo/emit.yml")),
            PathBuf::from("/repo/gen")
        );

        manifest.base_dir = Some(PathBuf::from("/abs/out"));
        assert_eq!(
            manifest.resolved_base_dir(Path::new("/repo/emit.yml")),
            PathBuf::from("/abs/out")
        );

        manifest.base_dir = None;
        assert_eq!(
            manifest.resolved_base_dir(Path::new("/repo/emit.yml")),
            PathBuf::from("/repo")
        );
        assert_eq!(
            manifest.resolved_base_dir(Path::new("emit.yml")),
            PathBuf::from(".")
        );
    }

    #[test]
    fn test_load_save_roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("emit.yml");
        let manifest = EmitManifest::new(
            "pgdcp",
            vec![ProvenanceEntry::literal("a.sql", "SELECT 1;").with_index(3)],
        );
        manifest.save(&path).unwrap();
        let loaded = EmitManifest::load(&path).unwrap();
        assert_eq!(loaded, manifest);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = EmitManifest::load("/definitely/missing/emit.yml").unwrap_err();
        assert!(matches!(err, crate::PersistError::Io(_)));
    }
}
