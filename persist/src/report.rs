//! Per-item results, reporting callbacks and run reports.

use std::path::{Path, PathBuf};

use pgdcp_core::{Confidentiality, ResolvedProvenance};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Structured failure code for an item that was not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCode {
    /// The source program could not be started.
    SpawnFailed,
    /// The source program exited with a non-zero status.
    NonZeroExit,
    /// The source program exceeded the capture timeout.
    Timeout,
    /// Waiting on the program or reading its output failed.
    CaptureFailed,
    /// The destination file could not be written.
    WriteFailed,
    /// The entry was rejected while planning.
    InvalidEntry,
}

impl std::fmt::Display for FailureCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SpawnFailed => write!(f, "spawn_failed"),
            Self::NonZeroExit => write!(f, "non_zero_exit"),
            Self::Timeout => write!(f, "timeout"),
            Self::CaptureFailed => write!(f, "capture_failed"),
            Self::WriteFailed => write!(f, "write_failed"),
            Self::InvalidEntry => write!(f, "invalid_entry"),
        }
    }
}

/// Outcome of persisting one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedFileResult {
    /// Absolute destination path.
    pub dest_file: PathBuf,
    /// Originating entry, minus literal content; `None` for files not
    /// backed by an entry (the driver file).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provenance: Option<ResolvedProvenance>,
    /// Present only on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_code: Option<FailureCode>,
    /// SHA-256 of the written content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl PersistedFileResult {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn confidentiality(&self) -> Option<Confidentiality> {
        self.provenance.as_ref().map(ResolvedProvenance::confidentiality)
    }

    /// File name of [`dest_file`](Self::dest_file).
    pub fn basename(&self) -> String {
        self.dest_file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Receives one callback per processed item, in emission order.
pub trait Reporter {
    fn report_success(&mut self, provenance: &ResolvedProvenance, dest_file: &Path);
    fn report_failure(&mut self, provenance: Option<&ResolvedProvenance>, error: &str);
}

/// Logs results through `tracing`, with paths relative to the working
/// directory.
#[derive(Debug, Clone)]
pub struct TracingReporter {
    cwd: Option<PathBuf>,
}

impl TracingReporter {
    pub fn new() -> Self {
        Self {
            cwd: std::env::current_dir().ok(),
        }
    }

    fn relative(&self, path: &Path) -> String {
        display_path(path, self.cwd.as_deref())
    }
}

impl Default for TracingReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for TracingReporter {
    fn report_success(&mut self, provenance: &ResolvedProvenance, dest_file: &Path) {
        info!(
            source = %self.relative(&provenance.source_path),
            dest = %self.relative(dest_file),
            ordinal = provenance.ordinal,
            confidentiality = %provenance.confidentiality(),
            "persisted"
        );
    }

    fn report_failure(&mut self, provenance: Option<&ResolvedProvenance>, err: &str) {
        let source = provenance
            .map(|p| self.relative(&p.source_path))
            .unwrap_or_else(|| "<?>".to_string());
        error!(source = %source, error = %err, "failed to persist");
    }
}

/// One recorded callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    Success {
        provenance: ResolvedProvenance,
        dest_file: PathBuf,
    },
    Failure {
        provenance: Option<ResolvedProvenance>,
        error: String,
    },
}

impl ReportEvent {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn provenance(&self) -> Option<&ResolvedProvenance> {
        match self {
            Self::Success { provenance, .. } => Some(provenance),
            Self::Failure { provenance, .. } => provenance.as_ref(),
        }
    }
}

/// Records every callback in order, optionally forwarding to another
/// reporter.
#[derive(Default)]
pub struct CollectingReporter {
    pub events: Vec<ReportEvent>,
    forward: Option<Box<dyn Reporter>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forwarding(inner: impl Reporter + 'static) -> Self {
        Self {
            events: Vec::new(),
            forward: Some(Box::new(inner)),
        }
    }

    pub fn successes(&self) -> usize {
        self.events.iter().filter(|e| e.is_success()).count()
    }

    pub fn failures(&self) -> usize {
        self.events.len() - self.successes()
    }
}

impl Reporter for CollectingReporter {
    fn report_success(&mut self, provenance: &ResolvedProvenance, dest_file: &Path) {
        if let Some(inner) = self.forward.as_mut() {
            inner.report_success(provenance, dest_file);
        }
        self.events.push(ReportEvent::Success {
            provenance: provenance.clone(),
            dest_file: dest_file.to_path_buf(),
        });
    }

    fn report_failure(&mut self, provenance: Option<&ResolvedProvenance>, error: &str) {
        if let Some(inner) = self.forward.as_mut() {
            inner.report_failure(provenance, error);
        }
        self.events.push(ReportEvent::Failure {
            provenance: provenance.cloned(),
            error: error.to_string(),
        });
    }
}

/// Serializable summary of one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub identity: String,
    pub generated_at: String,
    pub driver: PathBuf,
    pub succeeded: usize,
    pub failed: usize,
    /// Every item result, in emission order.
    pub results: Vec<PersistedFileResult>,
}

impl RunReport {
    pub fn failures(&self) -> impl Iterator<Item = &PersistedFileResult> {
        self.results.iter().filter(|r| !r.is_success())
    }
}

/// Renders `path` relative to `base` when it lies beneath it.
pub fn display_path(path: &Path, base: Option<&Path>) -> String {
    if let Some(base) = base {
        if let Ok(relative) = path.strip_prefix(base) {
            return relative.display().to_string();
        }
    }
    path.display().to_string()
}
