//! Provenance model, naming composer and lifecycle facades for PgDCP SQL
//! emitters.
//!
//! This crate holds the pure, I/O-free half of the emit toolkit:
//!
//! - [`ProvenanceEntry`]: where one piece of generated SQL comes from, its
//!   optional explicit ordinal and its [`Confidentiality`].
//! - [`naming`]: output basenames (`007_context.auto.psql`), subject areas
//!   (`dcp_observability` → `observability`) and canonical routine names
//!   (`billing_construct_storage`).
//! - [`CapabilityBundle`] and [`EmitCoordinator`]: the known schemas,
//!   extensions and domains plus the generator's own provenance.
//! - [`Lifecycle`], [`Assurance`], [`Observability`], [`Context`]: facades
//!   exposing one accessor per canonical routine of a subject area.
//! - [`resolve_ordinals`] / [`validate_entries`]: ordinal assignment and
//!   configuration checks for a provenance list.
//!
//! Persisting generated SQL lives in the `pgdcp-persist` crate.
//!
//! # Example
//!
//! ```
//! use pgdcp_core::*;
//!
//! let ec = EmitCoordinator::new(CoordinatorProvenance {
//!     identity: "pgdcp".into(),
//!     version: "0.1.0".into(),
//!     source: "file:///repo/billing.sqla.ts".into(),
//! });
//!
//! let lc = Lifecycle::new(&ec, naming::subject_area_of("dcp_billing"));
//! assert_eq!(lc.construct_storage(None).name, "billing_construct_storage");
//! assert_eq!(lc.destroy_storage(None).namespace.name, "dcp_lifecycle_destroy");
//!
//! let obs = Observability::new(&ec, &DcpSchema::Context);
//! assert_eq!(obs.metrics(None).name, "observability_metrics_context");
//! ```

mod coordinator;
mod facade;
pub mod naming;
mod provenance;
mod schema;
mod state;
mod validate;

pub use coordinator::{
    CoordinatorProvenance, EmitCoordinator, ExecutionContext, RoutineKind, RoutineRef,
};
pub use facade::{Assurance, Context, ContextStorage, Lifecycle, Observability};
pub use naming::{AssurancePhase, LifecyclePhase};
pub use provenance::{Confidentiality, ProvenanceEntry, ResolvedProvenance};
pub use schema::{
    CapabilityBundle, DCP_SCHEMA_PREFIX, DcpSchema, DomainDefinition, ExtensionDefinition,
    SchemaDefinition, SqlNamespaceSupplier, unique_schemas,
};
pub use state::{DcpState, StateInit};
pub use validate::{ValidationError, resolve_ordinals, validate_entries, validate_ordinals};
