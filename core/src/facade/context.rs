use serde::{Deserialize, Serialize};

use crate::coordinator::{EmitCoordinator, ExecutionContext};
use crate::naming::subject_area_of;
use crate::schema::{DcpSchema, SchemaDefinition};

/// Tables backing the execution context of a deployment.
///
/// `execution_context` is an enum table seeded with every
/// [`ExecutionContext`] code; `context` is a singleton row naming the active
/// context and host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextStorage {
    pub execution_context_table: String,
    pub context_table: String,
    pub codes: Vec<String>,
    pub active: ExecutionContext,
}

/// Execution-context objects, in `dcp_context`.
#[derive(Debug, Clone)]
pub struct Context<'a> {
    ec: &'a EmitCoordinator,
    schema: SchemaDefinition,
    subject_area: String,
}

impl<'a> Context<'a> {
    pub fn new(ec: &'a EmitCoordinator) -> Self {
        let schema = ec.schema(DcpSchema::Context);
        let subject_area = subject_area_of(&schema).to_string();
        Self {
            ec,
            schema,
            subject_area,
        }
    }

    pub fn subject_area(&self) -> &str {
        &self.subject_area
    }

    pub fn c_schema(&self) -> &SchemaDefinition {
        &self.schema
    }

    pub fn active(&self) -> ExecutionContext {
        self.ec.context
    }

    pub fn storage(&self) -> ContextStorage {
        ContextStorage {
            execution_context_table: format!("{}.execution_context", self.schema.name),
            context_table: format!("{}.context", self.schema.name),
            codes: ExecutionContext::ALL
                .into_iter()
                .map(|ctx| ctx.code().to_string())
                .collect(),
            active: self.active(),
        }
    }
}
