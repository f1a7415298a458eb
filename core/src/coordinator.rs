//! Emit coordinator: the shared state every facade is built from.
//!
//! The coordinator owns the [`CapabilityBundle`], the generator's own
//! provenance (used for SQL file headers) and the [`ExecutionContext`] the
//! emitted SQL targets. Routine references it hands out carry only a name and
//! a namespace; rendering them into DDL is the SQL-assembly layer's job.

use serde::{Deserialize, Serialize};

use crate::naming::{KNOWN_SOURCE_SUFFIXES, subject_area_of};
use crate::schema::{CapabilityBundle, DcpSchema, SchemaDefinition, SqlNamespaceSupplier};

/// Environment the emitted SQL is meant for.
///
/// # Examples
///
/// ```
/// use pgdcp_core::ExecutionContext;
///
/// assert_eq!(ExecutionContext::Development.code(), "devl");
/// assert_eq!("sandbox".parse::<ExecutionContext>(), Ok(ExecutionContext::Sandbox));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ExecutionContext {
    #[serde(rename = "production")]
    Production,
    #[serde(rename = "test")]
    Test,
    #[default]
    #[serde(rename = "devl")]
    Development,
    #[serde(rename = "sandbox")]
    Sandbox,
    #[serde(rename = "experimental")]
    Experimental,
}

impl ExecutionContext {
    pub const ALL: [ExecutionContext; 5] = [
        Self::Production,
        Self::Test,
        Self::Development,
        Self::Sandbox,
        Self::Experimental,
    ];

    /// Code stored in the `execution_context` enum table.
    pub fn code(self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Test => "test",
            Self::Development => "devl",
            Self::Sandbox => "sandbox",
            Self::Experimental => "experimental",
        }
    }
}

impl std::fmt::Display for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for ExecutionContext {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ctx| ctx.code() == s)
            .ok_or_else(|| format!("unknown execution context: {s}"))
    }
}

/// Shape of a routine reference handed to the SQL-assembly layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutineKind {
    /// Stored procedure with no typed arguments.
    StoredProcedure,
    /// Argument-less function returning `SETOF TEXT` (pgTAP style).
    SetOfTextFunction,
}

/// A namespaced routine name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineRef {
    pub name: String,
    pub namespace: SchemaDefinition,
    pub kind: RoutineKind,
}

impl RoutineRef {
    /// `namespace.name`.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace.name, self.name)
    }
}

impl std::fmt::Display for RoutineRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.namespace.name, self.name)
    }
}

/// Where the generator itself comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorProvenance {
    pub identity: String,
    pub version: String,
    /// Path or `file://` URL of the generator source.
    pub source: String,
}

/// Shared state for one generator.
#[derive(Debug, Clone)]
pub struct EmitCoordinator {
    pub bundle: CapabilityBundle,
    pub provenance: CoordinatorProvenance,
    pub context: ExecutionContext,
}

impl EmitCoordinator {
    pub fn new(provenance: CoordinatorProvenance) -> Self {
        Self {
            bundle: CapabilityBundle::dcp(),
            provenance,
            context: ExecutionContext::default(),
        }
    }

    pub fn with_bundle(mut self, bundle: CapabilityBundle) -> Self {
        self.bundle = bundle;
        self
    }

    pub fn with_context(mut self, context: ExecutionContext) -> Self {
        self.context = context;
        self
    }

    pub fn schema(&self, schema: DcpSchema) -> SchemaDefinition {
        self.bundle.schema(schema)
    }

    /// Comment line placed at the top of emitted SQL.
    ///
    /// ```
    /// use pgdcp_core::{CoordinatorProvenance, EmitCoordinator};
    ///
    /// let ec = EmitCoordinator::new(CoordinatorProvenance {
    ///     identity: "pgdcp".into(),
    ///     version: "0.1.0".into(),
    ///     source: "file:///repo/010_context.sqla.ts".into(),
    /// });
    /// assert_eq!(
    ///     ec.psql_header(),
    ///     "-- generated from pgdcp version 0.1.0 (basename: 010_context.psql)"
    /// );
    /// ```
    pub fn psql_header(&self) -> String {
        let p = &self.provenance;
        format!(
            "-- generated from {} version {} (basename: {})",
            p.identity,
            p.version,
            self.psql_basename(".psql")
        )
    }

    /// Generator source file name with its `.sqla.*` suffix replaced by
    /// `extension`.
    pub fn psql_basename(&self, extension: &str) -> String {
        let source = self.provenance.source.as_str();
        let source = source.strip_prefix("file://").unwrap_or(source);
        let file_name = source.rsplit(['/', '\\']).next().unwrap_or(source);
        let stem = KNOWN_SOURCE_SUFFIXES
            .iter()
            .find_map(|suffix| file_name.strip_suffix(suffix))
            .unwrap_or(file_name);
        format!("{stem}{extension}")
    }

    pub fn subject_area<'a, T: SqlNamespaceSupplier + ?Sized>(&self, target: &'a T) -> &'a str {
        subject_area_of(target)
    }

    pub fn subject_areas<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
        crate::naming::subject_areas(names)
    }

    /// Untyped, argument-less stored procedure in `schema`.
    pub fn stored_procedure(&self, name: impl Into<String>, schema: DcpSchema) -> RoutineRef {
        RoutineRef {
            name: name.into(),
            namespace: self.schema(schema),
            kind: RoutineKind::StoredProcedure,
        }
    }

    /// Argument-less `SETOF TEXT` function in `schema`.
    pub fn set_of_text_function(&self, name: impl Into<String>, schema: DcpSchema) -> RoutineRef {
        RoutineRef {
            name: name.into(),
            namespace: self.schema(schema),
            kind: RoutineKind::SetOfTextFunction,
        }
    }
}
