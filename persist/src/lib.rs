//! Planning, capturing and persisting generated PgDCP SQL.
//!
//! A run takes an ordered list of [`ProvenanceEntry`](pgdcp_core::ProvenanceEntry)
//! values and turns it into numbered `.auto.psql` files plus one
//! `driver.auto.psql` that includes them in order:
//!
//! 1. [`plan::plan`] resolves ordinals, source paths and basenames without
//!    side effects; entries with an empty source or a colliding ordinal are
//!    planned to fail on their own.
//! 2. [`PersistenceEngine::run`] resolves each item (literal text, or the
//!    captured stdout of a program), writes it atomically and reports it.
//! 3. The driver file is written once at the end.
//!
//! # Example
//!
//! ```
//! use pgdcp_core::ProvenanceEntry;
//! use pgdcp_persist::{CollectingReporter, DestinationResolver, PersistenceEngine, plan};
//!
//! let dir = tempfile::TempDir::new().unwrap();
//! let entries = vec![
//!     ProvenanceEntry::literal("a", "SELECT 1;"),
//!     ProvenanceEntry::literal("c", "SELECT 2;").with_index(6),
//! ];
//! let plan = plan::plan(&entries, dir.path());
//!
//! let engine = PersistenceEngine::new(DestinationResolver::new(dir.path()));
//! let mut reporter = CollectingReporter::new();
//! let outcome = engine.run(plan, &mut reporter).unwrap();
//!
//! assert_eq!(outcome.succeeded(), 2);
//! let driver = std::fs::read_to_string(&outcome.driver.dest_file).unwrap();
//! assert_eq!(driver, "\\ir 000_a.auto.psql\n\\ir 006_c.auto.psql");
//! ```

mod capture;
mod config;
mod driver;
mod engine;
mod error;
mod output;
pub mod plan;
mod producer;
mod report;

pub use capture::{CaptureOptions, CommandSpec, DEFAULT_CAPTURE_TIMEOUT_MS, capture_stdout};
pub use config::{CaptureConfig, EmitManifest};
pub use driver::{driver_basename, driver_body};
pub use engine::{DestinationResolver, PersistenceEngine, RunOutcome, write_atomic};
pub use error::{PersistError, ResolveError, Result, WriteError};
pub use output::{OutputFormat, format_plan, format_report};
pub use plan::Plan;
pub use producer::{ContentItem, ContentSource};
pub use report::{
    CollectingReporter, FailureCode, PersistedFileResult, ReportEvent, Reporter, RunReport,
    TracingReporter, display_path,
};
