//! Deterministic name derivation.
//!
//! Everything here is a pure function of its arguments: output file
//! basenames, subject areas derived from schema names, and the canonical
//! names of lifecycle, assurance and observability routines.
//!
//! # Examples
//!
//! ```
//! use pgdcp_core::naming::{destination_basename, lifecycle_operation_name, subject_area_of};
//! use pgdcp_core::{DcpSchema, LifecyclePhase};
//! use std::path::Path;
//!
//! assert_eq!(
//!     destination_basename(Path::new("/gen/context.sqla.ts"), 7),
//!     "007_context.auto.psql"
//! );
//! assert_eq!(subject_area_of("dcp_observability"), "observability");
//!
//! let phase = LifecyclePhase::DestroyStorage;
//! assert_eq!(lifecycle_operation_name("billing", phase), "billing_destroy_storage");
//! assert_eq!(phase.namespace(), DcpSchema::LifecycleDestroy);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::schema::{DCP_SCHEMA_PREFIX, DcpSchema, SqlNamespaceSupplier};

/// Extension appended to every generated SQL file.
pub const AUTO_PSQL_EXTENSION: &str = ".auto.psql";

/// Name of the file that includes every generated file in order.
pub const DRIVER_BASENAME: &str = "driver.auto.psql";

/// Generator-source suffixes stripped from source filenames, longest first.
pub const KNOWN_SOURCE_SUFFIXES: &[&str] = &[".sqla.ts", ".sqla.sh", ".sqla.py", ".sqla"];

/// Identity used when neither a subject area nor an override is available.
/// SQL built from it fails downstream.
pub const UNDETERMINED_IDENTITY: &str = "assert_SHOULD_NEVER_HAPPEN";

/// Computes `{ordinal:03}_{stem}.auto.psql` for a source path.
///
/// The stem is the file name with a known generator-source suffix removed;
/// other file names are kept whole (`seed.sql` gives `seed.sql`).
pub fn destination_basename(source: &Path, ordinal: u32) -> String {
    format!("{ordinal:03}_{}{AUTO_PSQL_EXTENSION}", source_stem(source))
}

/// File name of `source` without its generator-source suffix.
pub fn source_stem(source: &Path) -> String {
    let file_name = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    KNOWN_SOURCE_SUFFIXES
        .iter()
        .filter_map(|suffix| file_name.strip_suffix(suffix))
        .find(|stem| !stem.is_empty())
        .map(str::to_string)
        .unwrap_or(file_name)
}

/// Strips the `dcp_` prefix from a schema name or namespace supplier.
///
/// Inputs without the prefix are returned unchanged.
pub fn subject_area_of<T: SqlNamespaceSupplier + ?Sized>(target: &T) -> &str {
    let namespace = target.sql_namespace();
    namespace
        .strip_prefix(DCP_SCHEMA_PREFIX)
        .unwrap_or(namespace)
}

pub fn subject_areas<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    names.into_iter().map(subject_area_of::<str>).collect()
}

/// Chooses the identity for a routine name: the override when given, else
/// the subject area, else [`UNDETERMINED_IDENTITY`].
pub fn resolve_identity<'a>(identity: Option<&'a str>, subject_area: Option<&'a str>) -> &'a str {
    let usable = |id: &&str| !id.trim().is_empty();
    match identity.filter(usable).or(subject_area.filter(usable)) {
        Some(id) => id,
        None => {
            warn!("no subject area or identity override available; using sentinel identity");
            UNDETERMINED_IDENTITY
        }
    }
}

/// Stages of a subject area's lifecycle that get a canonical procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    ConstructStorage,
    ConstructShield,
    ConstructDomains,
    ConstructIdempotent,
    DestroyShield,
    DestroyStorage,
    DestroyIdempotent,
    DeployProvenanceHttpRequest,
    Upgrade,
    PopulateExperimentalData,
    PopulateSecrets,
    PopulateSeedData,
    PopulateData,
}

impl LifecyclePhase {
    pub const ALL: [LifecyclePhase; 13] = [
        Self::ConstructStorage,
        Self::ConstructShield,
        Self::ConstructDomains,
        Self::ConstructIdempotent,
        Self::DestroyShield,
        Self::DestroyStorage,
        Self::DestroyIdempotent,
        Self::DeployProvenanceHttpRequest,
        Self::Upgrade,
        Self::PopulateExperimentalData,
        Self::PopulateSecrets,
        Self::PopulateSeedData,
        Self::PopulateData,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConstructStorage => "construct_storage",
            Self::ConstructShield => "construct_shield",
            Self::ConstructDomains => "construct_domains",
            Self::ConstructIdempotent => "construct_idempotent",
            Self::DestroyShield => "destroy_shield",
            Self::DestroyStorage => "destroy_storage",
            Self::DestroyIdempotent => "destroy_idempotent",
            Self::DeployProvenanceHttpRequest => "deploy_provenance_http_request",
            Self::Upgrade => "upgrade",
            Self::PopulateExperimentalData => "populate_experimental_data",
            Self::PopulateSecrets => "populate_secrets",
            Self::PopulateSeedData => "populate_seed_data",
            Self::PopulateData => "populate_data",
        }
    }

    pub fn is_destructive(self) -> bool {
        matches!(
            self,
            Self::DestroyShield | Self::DestroyStorage | Self::DestroyIdempotent
        )
    }

    /// Destructive phases live in `dcp_lifecycle_destroy`.
    pub fn namespace(self) -> DcpSchema {
        if self.is_destructive() {
            DcpSchema::LifecycleDestroy
        } else {
            DcpSchema::Lifecycle
        }
    }
}

impl std::fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{identity}_{phase}`.
pub fn lifecycle_operation_name(identity: &str, phase: LifecyclePhase) -> String {
    format!("{identity}_{}", phase.as_str())
}

/// Assurance routines: unit tests, lint, and doctor checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssurancePhase {
    UnitTest,
    Lint,
    Doctor,
}

impl AssurancePhase {
    pub const ALL: [AssurancePhase; 3] = [Self::UnitTest, Self::Lint, Self::Doctor];

    pub fn prefix(self) -> &'static str {
        match self {
            Self::UnitTest => "test_",
            Self::Lint => "lint_",
            Self::Doctor => "test_doctor_",
        }
    }

    pub fn namespace(self) -> DcpSchema {
        DcpSchema::Assurance
    }
}

pub fn assurance_operation_name(identity: &str, phase: AssurancePhase) -> String {
    format!("{}{identity}", phase.prefix())
}

pub fn observability_metrics_name(identity: &str) -> String {
    format!("observability_metrics_{identity}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaDefinition;
    use std::path::PathBuf;

    #[test]
    fn test_destination_basename_strips_generator_suffix() {
        let path = PathBuf::from("/repo/gen/020_lifecycle.sqla.ts");
        assert_eq!(
            destination_basename(&path, 20),
            "020_020_lifecycle.auto.psql"
        );
        assert_eq!(
            destination_basename(Path::new("/repo/gen/a"), 0),
            "000_a.auto.psql"
        );
        assert_eq!(
            destination_basename(Path::new("seed.sql"), 12),
            "012_seed.sql.auto.psql"
        );
        assert_eq!(
            destination_basename(Path::new("/gen/report.v2.sql"), 3),
            "003_report.v2.sql.auto.psql"
        );
        assert_eq!(
            destination_basename(Path::new("setup.sqla.sh"), 1000),
            "1000_setup.auto.psql"
        );
    }

    #[test]
    fn test_destination_basename_is_stable() {
        let path = Path::new("/tmp/does-not-exist/context.sqla.ts");
        assert_eq!(destination_basename(path, 5), destination_basename(path, 5));
    }

    #[test]
    fn test_source_stem_keeps_dotfile_names() {
        assert_eq!(source_stem(Path::new(".sqla")), ".sqla");
        assert_eq!(source_stem(Path::new(".hidden")), ".hidden");
    }

    #[test]
    fn test_subject_area_strips_only_dcp_prefix() {
        assert_eq!(subject_area_of("dcp_observability"), "observability");
        assert_eq!(subject_area_of("other_schema"), "other_schema");
        assert_eq!(subject_area_of("dcp"), "dcp");
        assert_eq!(subject_area_of(&SchemaDefinition::new("dcp_lib")), "lib");
        assert_eq!(subject_area_of(&DcpSchema::LifecycleDestroy), "lifecycle_destroy");
        assert_eq!(
            subject_areas(["dcp_context", "public"]),
            vec!["context", "public"]
        );
    }

    #[test]
    fn test_resolve_identity_prefers_override() {
        assert_eq!(resolve_identity(Some("ops"), Some("billing")), "ops");
        assert_eq!(resolve_identity(None, Some("billing")), "billing");
        assert_eq!(resolve_identity(None, None), UNDETERMINED_IDENTITY);
        assert_eq!(resolve_identity(Some("  "), None), UNDETERMINED_IDENTITY);
    }

    #[test]
    fn test_blank_override_falls_back_to_subject_area() {
        assert_eq!(resolve_identity(Some("  "), Some("billing")), "billing");
        assert_eq!(resolve_identity(Some(""), Some("billing")), "billing");
        assert_eq!(resolve_identity(Some(""), Some(" ")), UNDETERMINED_IDENTITY);
    }

    #[test]
    fn test_lifecycle_names_and_namespaces() {
        assert_eq!(
            lifecycle_operation_name("billing", LifecyclePhase::ConstructStorage),
            "billing_construct_storage"
        );
        assert_eq!(
            LifecyclePhase::ConstructStorage.namespace(),
            DcpSchema::Lifecycle
        );
        assert_eq!(
            lifecycle_operation_name("billing", LifecyclePhase::DestroyStorage),
            "billing_destroy_storage"
        );
        assert_eq!(
            LifecyclePhase::DestroyStorage.namespace(),
            DcpSchema::LifecycleDestroy
        );
        let destructive: Vec<_> = LifecyclePhase::ALL
            .into_iter()
            .filter(|phase| phase.is_destructive())
            .collect();
        assert_eq!(destructive.len(), 3);
    }

    #[test]
    fn test_phase_display_matches_serde() {
        for phase in LifecyclePhase::ALL {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{phase}\""));
        }
    }

    #[test]
    fn test_assurance_and_observability_names() {
        assert_eq!(assurance_operation_name("billing", AssurancePhase::UnitTest), "test_billing");
        assert_eq!(assurance_operation_name("billing", AssurancePhase::Lint), "lint_billing");
        assert_eq!(
            assurance_operation_name("billing", AssurancePhase::Doctor),
            "test_doctor_billing"
        );
        assert_eq!(observability_metrics_name("billing"), "observability_metrics_billing");
    }
}
