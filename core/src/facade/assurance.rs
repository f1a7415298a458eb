use crate::coordinator::{EmitCoordinator, RoutineRef};
use crate::naming::{AssurancePhase, assurance_operation_name, resolve_identity};
use crate::schema::{DcpSchema, SchemaDefinition};

/// Test, lint and doctor functions for a subject area, in `dcp_assurance`.
#[derive(Debug, Clone)]
pub struct Assurance<'a> {
    ec: &'a EmitCoordinator,
    subject_area: String,
}

impl<'a> Assurance<'a> {
    pub fn new(ec: &'a EmitCoordinator, subject_area: impl Into<String>) -> Self {
        Self {
            ec,
            subject_area: subject_area.into(),
        }
    }

    pub fn subject_area(&self) -> &str {
        &self.subject_area
    }

    pub fn ae_schema(&self) -> SchemaDefinition {
        self.ec.schema(DcpSchema::Assurance)
    }

    pub fn operation(&self, phase: AssurancePhase, identity: Option<&str>) -> RoutineRef {
        let identity = resolve_identity(identity, Some(self.subject_area.as_str()));
        self.ec
            .set_of_text_function(assurance_operation_name(identity, phase), phase.namespace())
    }

    pub fn all(&self, identity: Option<&str>) -> Vec<RoutineRef> {
        AssurancePhase::ALL
            .into_iter()
            .map(|phase| self.operation(phase, identity))
            .collect()
    }

    /// `test_{identity}`.
    pub fn unit_test(&self, identity: Option<&str>) -> RoutineRef {
        self.operation(AssurancePhase::UnitTest, identity)
    }

    /// `lint_{identity}`.
    pub fn lint(&self, identity: Option<&str>) -> RoutineRef {
        self.operation(AssurancePhase::Lint, identity)
    }

    /// `test_doctor_{identity}`.
    pub fn doctor(&self, identity: Option<&str>) -> RoutineRef {
        self.operation(AssurancePhase::Doctor, identity)
    }

    /// pgTAP assertion line checking that `schema.routine` exists.
    pub fn has_function(&self, schema: &str, routine: &str) -> String {
        format!(
            "RETURN NEXT {}.has_function('{}', '{}');",
            self.ae_schema().name,
            schema.replace('\'', "''"),
            routine.replace('\'', "''")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::{CoordinatorProvenance, RoutineKind};

    fn coordinator() -> EmitCoordinator {
        EmitCoordinator::new(CoordinatorProvenance {
            identity: "pgdcp".to_string(),
            version: "0.1.0".to_string(),
            source: "billing.sqla.ts".to_string(),
        })
    }

    #[test]
    fn test_assurance_names() {
        let ec = coordinator();
        let ae = Assurance::new(&ec, "billing");
        assert_eq!(ae.unit_test(None).qualified_name(), "dcp_assurance.test_billing");
        assert_eq!(ae.lint(None).qualified_name(), "dcp_assurance.lint_billing");
        assert_eq!(
            ae.doctor(Some("ops")).qualified_name(),
            "dcp_assurance.test_doctor_ops"
        );
        assert!(
            ae.all(None)
                .iter()
                .all(|r| r.kind == RoutineKind::SetOfTextFunction)
        );
    }

    #[test]
    fn test_has_function_quotes_literals() {
        let ec = coordinator();
        let ae = Assurance::new(&ec, "billing");
        assert_eq!(
            ae.has_function("dcp_lifecycle", "billing_upgrade"),
            "RETURN NEXT dcp_assurance.has_function('dcp_lifecycle', 'billing_upgrade');"
        );
        assert!(ae.has_function("a'b", "c").contains("'a''b'"));
    }
}
