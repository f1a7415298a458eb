//! Known schemas, extensions and domains.
//!
//! A [`CapabilityBundle`] is the plain record describing which schemas,
//! extensions and domains an [`EmitCoordinator`](crate::EmitCoordinator)
//! knows about. It is passed explicitly to every facade instead of being
//! threaded through type parameters.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Namespace prefix carried by every PgDCP schema name.
pub const DCP_SCHEMA_PREFIX: &str = "dcp_";

/// Anything that exposes a SQL namespace name.
pub trait SqlNamespaceSupplier {
    fn sql_namespace(&self) -> &str;
}

impl SqlNamespaceSupplier for str {
    fn sql_namespace(&self) -> &str {
        self
    }
}

impl SqlNamespaceSupplier for String {
    fn sql_namespace(&self) -> &str {
        self.as_str()
    }
}

/// The schemas every PgDCP coordinator defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DcpSchema {
    Context,
    Extensions,
    Lifecycle,
    LifecycleDestroy,
    Lib,
    Confidential,
    Assurance,
    Experimental,
    Observability,
}

impl DcpSchema {
    pub const ALL: [DcpSchema; 9] = [
        Self::Context,
        Self::Extensions,
        Self::Lifecycle,
        Self::LifecycleDestroy,
        Self::Lib,
        Self::Confidential,
        Self::Assurance,
        Self::Experimental,
        Self::Observability,
    ];

    /// Fully prefixed schema name, e.g. `dcp_lifecycle_destroy`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Context => "dcp_context",
            Self::Extensions => "dcp_extensions",
            Self::Lifecycle => "dcp_lifecycle",
            Self::LifecycleDestroy => "dcp_lifecycle_destroy",
            Self::Lib => "dcp_lib",
            Self::Confidential => "dcp_confidential",
            Self::Assurance => "dcp_assurance",
            Self::Experimental => "dcp_experimental",
            Self::Observability => "dcp_observability",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|schema| schema.name() == name)
    }
}

impl SqlNamespaceSupplier for DcpSchema {
    fn sql_namespace(&self) -> &str {
        self.name()
    }
}

impl std::fmt::Display for DcpSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A named schema (SQL namespace).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub name: String,
}

impl SchemaDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl From<DcpSchema> for SchemaDefinition {
    fn from(schema: DcpSchema) -> Self {
        Self::new(schema.name())
    }
}

impl SqlNamespaceSupplier for SchemaDefinition {
    fn sql_namespace(&self) -> &str {
        &self.name
    }
}

/// A PostgreSQL extension installed into a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionDefinition {
    pub name: String,
    pub schema: SchemaDefinition,
}

/// A SQL domain known to the coordinator. Its type mapping lives in the
/// SQL-assembly layer; only identity and placement are recorded here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainDefinition {
    pub name: String,
    pub schema: SchemaDefinition,
    pub idempotent: bool,
    pub quote_identifiers: bool,
}

/// Known schemas, extensions and domains for one coordinator.
///
/// # Examples
///
/// ```
/// use pgdcp_core::{CapabilityBundle, DcpSchema};
///
/// let bundle = CapabilityBundle::dcp();
/// assert_eq!(bundle.schema(DcpSchema::Lifecycle).name, "dcp_lifecycle");
/// assert_eq!(bundle.extension("ltree").unwrap().schema.name, "dcp_extensions");
/// assert!(bundle.domain("execution_host_identity").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityBundle {
    pub schemas: Vec<SchemaDefinition>,
    pub extensions: Vec<ExtensionDefinition>,
    pub domains: Vec<DomainDefinition>,
}

impl CapabilityBundle {
    /// The standard PgDCP bundle: the nine `dcp_*` schemas, `ltree` in
    /// `dcp_extensions`, and the `execution_host_identity` domain.
    pub fn dcp() -> Self {
        let schemas = DcpSchema::ALL.into_iter().map(SchemaDefinition::from).collect();
        Self {
            schemas,
            extensions: vec![ExtensionDefinition {
                name: "ltree".to_string(),
                schema: DcpSchema::Extensions.into(),
            }],
            domains: vec![DomainDefinition {
                name: "execution_host_identity".to_string(),
                schema: DcpSchema::Context.into(),
                idempotent: true,
                quote_identifiers: true,
            }],
        }
    }

    /// Looks up one of the standard schemas. Falls back to a definition
    /// built from the enum when a custom bundle omitted it.
    pub fn schema(&self, schema: DcpSchema) -> SchemaDefinition {
        self.schema_named(schema.name())
            .cloned()
            .unwrap_or_else(|| schema.into())
    }

    pub fn schema_named(&self, name: &str) -> Option<&SchemaDefinition> {
        self.schemas.iter().find(|s| s.name == name)
    }

    pub fn extension(&self, name: &str) -> Option<&ExtensionDefinition> {
        self.extensions.iter().find(|e| e.name == name)
    }

    pub fn domain(&self, name: &str) -> Option<&DomainDefinition> {
        self.domains.iter().find(|d| d.name == name)
    }

    /// Resolves extension names, returning the unknown names on failure.
    pub fn extensions_named<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<Vec<&ExtensionDefinition>, Vec<String>> {
        let mut found = Vec::new();
        let mut missing = Vec::new();
        for name in names {
            match self.extension(name) {
                Some(extension) => found.push(extension),
                None => missing.push(name.to_string()),
            }
        }
        if missing.is_empty() {
            Ok(found)
        } else {
            Err(missing)
        }
    }
}

impl Default for CapabilityBundle {
    fn default() -> Self {
        Self::dcp()
    }
}

/// De-duplicates schema names, keeping first-seen order.
pub fn unique_schemas<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<SchemaDefinition> {
    let mut seen = BTreeSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(*name))
        .map(SchemaDefinition::new)
        .collect()
}
