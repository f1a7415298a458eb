use crate::coordinator::{EmitCoordinator, RoutineRef};
use crate::naming::{observability_metrics_name, resolve_identity, subject_area_of};
use crate::schema::{DcpSchema, SchemaDefinition, SqlNamespaceSupplier};

/// Metrics procedures for a principal schema, in `dcp_observability`.
///
/// The subject area is derived from the principal's namespace.
#[derive(Debug, Clone)]
pub struct Observability<'a> {
    ec: &'a EmitCoordinator,
    principal: SchemaDefinition,
    subject_area: String,
}

impl<'a> Observability<'a> {
    pub fn new<T: SqlNamespaceSupplier + ?Sized>(ec: &'a EmitCoordinator, principal: &T) -> Self {
        Self {
            ec,
            principal: SchemaDefinition::new(principal.sql_namespace()),
            subject_area: subject_area_of(principal).to_string(),
        }
    }

    pub fn principal(&self) -> &SchemaDefinition {
        &self.principal
    }

    pub fn subject_area(&self) -> &str {
        &self.subject_area
    }

    pub fn o_schema(&self) -> SchemaDefinition {
        self.ec.schema(DcpSchema::Observability)
    }

    /// `observability_metrics_{identity}`.
    pub fn metrics(&self, identity: Option<&str>) -> RoutineRef {
        let identity = resolve_identity(identity, Some(self.subject_area.as_str()));
        self.ec
            .stored_procedure(observability_metrics_name(identity), DcpSchema::Observability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::CoordinatorProvenance;

    #[test]
    fn test_metrics_uses_principal_subject_area() {
        let ec = EmitCoordinator::new(CoordinatorProvenance {
            identity: "pgdcp".to_string(),
            version: "0.1.0".to_string(),
            source: "obs.sqla.ts".to_string(),
        });
        let o = Observability::new(&ec, &DcpSchema::Context);
        assert_eq!(o.subject_area(), "context");
        assert_eq!(o.principal().name, "dcp_context");
        assert_eq!(
            o.metrics(None).qualified_name(),
            "dcp_observability.observability_metrics_context"
        );

        let o = Observability::new(&ec, "billing");
        assert_eq!(
            o.metrics(Some("ledger")).name,
            "observability_metrics_ledger"
        );
    }
}
