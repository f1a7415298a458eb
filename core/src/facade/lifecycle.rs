use crate::coordinator::{EmitCoordinator, RoutineRef};
use crate::naming::{LifecyclePhase, lifecycle_operation_name, resolve_identity};
use crate::schema::SchemaDefinition;

/// Construct/destroy/populate/deploy/upgrade procedures for a subject area.
///
/// Constructive procedures live in `dcp_lifecycle`; destructive ones in
/// `dcp_lifecycle_destroy`.
///
/// # Examples
///
/// ```
/// use pgdcp_core::{CoordinatorProvenance, EmitCoordinator, Lifecycle};
///
/// let ec = EmitCoordinator::new(CoordinatorProvenance {
///     identity: "pgdcp".into(),
///     version: "0.1.0".into(),
///     source: "billing.sqla.ts".into(),
/// });
/// let lc = Lifecycle::new(&ec, "billing");
/// assert_eq!(
///     lc.construct_storage(None).qualified_name(),
///     "dcp_lifecycle.billing_construct_storage"
/// );
/// assert_eq!(
///     lc.destroy_storage(Some("ledger")).qualified_name(),
///     "dcp_lifecycle_destroy.ledger_destroy_storage"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Lifecycle<'a> {
    ec: &'a EmitCoordinator,
    subject_area: String,
}

impl<'a> Lifecycle<'a> {
    pub fn new(ec: &'a EmitCoordinator, subject_area: impl Into<String>) -> Self {
        Self {
            ec,
            subject_area: subject_area.into(),
        }
    }

    pub fn subject_area(&self) -> &str {
        &self.subject_area
    }

    pub fn lc_schema(&self) -> SchemaDefinition {
        self.ec.schema(LifecyclePhase::ConstructStorage.namespace())
    }

    pub fn lc_destroy_schema(&self) -> SchemaDefinition {
        self.ec.schema(LifecyclePhase::DestroyStorage.namespace())
    }

    /// Procedure for `phase`, named `{identity}_{phase}`.
    pub fn operation(&self, phase: LifecyclePhase, identity: Option<&str>) -> RoutineRef {
        let identity = resolve_identity(identity, Some(self.subject_area.as_str()));
        self.ec
            .stored_procedure(lifecycle_operation_name(identity, phase), phase.namespace())
    }

    /// Every lifecycle procedure, in [`LifecyclePhase::ALL`] order.
    pub fn all(&self, identity: Option<&str>) -> Vec<RoutineRef> {
        LifecyclePhase::ALL
            .into_iter()
            .map(|phase| self.operation(phase, identity))
            .collect()
    }

    pub fn construct_storage(&self, identity: Option<&str>) -> RoutineRef {
        self.operation(LifecyclePhase::ConstructStorage, identity)
    }

    pub fn construct_shield(&self, identity: Option<&str>) -> RoutineRef {
        self.operation(LifecyclePhase::ConstructShield, identity)
    }

    pub fn construct_domains(&self, identity: Option<&str>) -> RoutineRef {
        self.operation(LifecyclePhase::ConstructDomains, identity)
    }

    pub fn construct_idempotent(&self, identity: Option<&str>) -> RoutineRef {
        self.operation(LifecyclePhase::ConstructIdempotent, identity)
    }

    pub fn destroy_shield(&self, identity: Option<&str>) -> RoutineRef {
        self.operation(LifecyclePhase::DestroyShield, identity)
    }

    pub fn destroy_storage(&self, identity: Option<&str>) -> RoutineRef {
        self.operation(LifecyclePhase::DestroyStorage, identity)
    }

    pub fn destroy_idempotent(&self, identity: Option<&str>) -> RoutineRef {
        self.operation(LifecyclePhase::DestroyIdempotent, identity)
    }

    pub fn deploy_provenance_http_request(&self, identity: Option<&str>) -> RoutineRef {
        self.operation(LifecyclePhase::DeployProvenanceHttpRequest, identity)
    }

    pub fn upgrade(&self, identity: Option<&str>) -> RoutineRef {
        self.operation(LifecyclePhase::Upgrade, identity)
    }

    /// `{identity}_populate_experimental_data`.
    pub fn populate_context(&self, identity: Option<&str>) -> RoutineRef {
        self.operation(LifecyclePhase::PopulateExperimentalData, identity)
    }

    pub fn populate_secrets(&self, identity: Option<&str>) -> RoutineRef {
        self.operation(LifecyclePhase::PopulateSecrets, identity)
    }

    pub fn populate_seed_data(&self, identity: Option<&str>) -> RoutineRef {
        self.operation(LifecyclePhase::PopulateSeedData, identity)
    }

    pub fn populate_data(&self, identity: Option<&str>) -> RoutineRef {
        self.operation(LifecyclePhase::PopulateData, identity)
    }
}
