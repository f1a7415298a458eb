//! Assembles the facades a single generator script works with.
//!
//! A generator declares a principal schema, a subject area, or both. When
//! only the principal is given the subject area is derived from it; when
//! neither is given the sentinel identity is used so the problem shows up in
//! every generated name.

use tracing::warn;

use crate::coordinator::EmitCoordinator;
use crate::facade::{Assurance, Context, Lifecycle};
use crate::naming::{UNDETERMINED_IDENTITY, subject_area_of};
use crate::schema::{DcpSchema, ExtensionDefinition, SchemaDefinition, unique_schemas};

/// Inputs to [`DcpState::new`].
#[derive(Debug, Clone, Default)]
pub struct StateInit {
    pub principal: Option<DcpSchema>,
    pub subject_area: Option<String>,
    /// Additional schemas the generator references.
    pub schemas: Vec<DcpSchema>,
    /// Extension names the generator requires.
    pub extensions: Vec<String>,
}

/// Facades and schema/extension lists for one generator.
///
/// # Examples
///
/// ```
/// use pgdcp_core::{CoordinatorProvenance, DcpSchema, DcpState, EmitCoordinator, StateInit};
///
/// let ec = EmitCoordinator::new(CoordinatorProvenance {
///     identity: "pgdcp".into(),
///     version: "0.1.0".into(),
///     source: "observability.sqla.ts".into(),
/// });
/// let state = DcpState::new(&ec, StateInit {
///     principal: Some(DcpSchema::Observability),
///     extensions: vec!["ltree".into()],
///     ..StateInit::default()
/// });
/// assert_eq!(state.subject_area, "observability");
/// assert_eq!(state.lc.upgrade(None).name, "observability_upgrade");
/// assert_eq!(state.schemas[1].name, "dcp_extensions");
/// ```
#[derive(Debug, Clone)]
pub struct DcpState<'a> {
    pub subject_area: String,
    pub schemas: Vec<SchemaDefinition>,
    pub extensions: Vec<ExtensionDefinition>,
    /// Requested extensions the bundle does not define.
    pub unknown_extensions: Vec<String>,
    pub lc: Lifecycle<'a>,
    pub ae: Assurance<'a>,
    pub c: Context<'a>,
}

impl<'a> DcpState<'a> {
    pub fn new(ec: &'a EmitCoordinator, init: StateInit) -> Self {
        let principal = init.principal.map(|p| ec.schema(p));
        let subject_area = match (init.subject_area, principal.as_ref()) {
            (Some(subject_area), _) => subject_area,
            (None, Some(principal)) => subject_area_of(principal).to_string(),
            (None, None) => {
                warn!("state has neither a principal schema nor a subject area");
                UNDETERMINED_IDENTITY.to_string()
            }
        };

        let (extensions, unknown_extensions) =
            match ec.bundle.extensions_named(init.extensions.iter().map(String::as_str)) {
                Ok(found) => (found.into_iter().cloned().collect::<Vec<_>>(), Vec::new()),
                Err(missing) => {
                    warn!(?missing, "unknown extensions requested");
                    let found = init
                        .extensions
                        .iter()
                        .filter_map(|name| ec.bundle.extension(name))
                        .cloned()
                        .collect();
                    (found, missing)
                }
            };

        let schema_names: Vec<String> = principal
            .iter()
            .map(|p| p.name.clone())
            .chain(extensions.iter().map(|e| e.schema.name.clone()))
            .chain(init.schemas.iter().map(|s| ec.schema(*s).name))
            .collect();
        let schemas = unique_schemas(schema_names.iter().map(String::as_str));

        Self {
            lc: Lifecycle::new(ec, subject_area.clone()),
            ae: Assurance::new(ec, subject_area.clone()),
            c: Context::new(ec),
            subject_area,
            schemas,
            extensions,
            unknown_extensions,
        }
    }
}
