//! The persistence engine.
//!
//! Items of a [`Plan`] are resolved and written one at a time, in plan
//! order. A failing item is reported and recorded, and the run moves on.
//! Once every item has been handled the driver file is written exactly once.

use std::io::Write;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::capture::CaptureOptions;
use crate::driver::{driver_basename, driver_body};
use crate::error::{PersistError, Result, WriteError};
use crate::plan::Plan;
use crate::report::{FailureCode, PersistedFileResult, Reporter, RunReport};

/// Maps output basenames to absolute destination paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationResolver {
    base_dir: PathBuf,
}

impl DestinationResolver {
    /// Relative `base_dir`s are anchored at the current working directory.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let base_dir = std::path::absolute(&base_dir).unwrap_or(base_dir);
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Absolute paths pass through; anything else lands under the base.
    pub fn destination_path(&self, basename: &str) -> PathBuf {
        let path = Path::new(basename);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// One result per plan item, in plan order.
    pub results: Vec<PersistedFileResult>,
    /// Destination files that were written, in emission order.
    pub emitted: Vec<PathBuf>,
    /// The driver file.
    pub driver: PersistedFileResult,
}

impl RunOutcome {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    pub fn to_report(&self, identity: &str) -> RunReport {
        RunReport {
            identity: identity.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            driver: self.driver.dest_file.clone(),
            succeeded: self.succeeded(),
            failed: self.failed(),
            results: self.results.clone(),
        }
    }
}

/// Resolves plan items and writes them under a destination directory.
#[derive(Debug, Clone)]
pub struct PersistenceEngine {
    destination: DestinationResolver,
    capture: CaptureOptions,
}

impl PersistenceEngine {
    pub fn new(destination: DestinationResolver) -> Self {
        Self {
            destination,
            capture: CaptureOptions::default(),
        }
    }

    pub fn with_capture(mut self, capture: CaptureOptions) -> Self {
        self.capture = capture;
        self
    }

    pub fn destination(&self) -> &DestinationResolver {
        &self.destination
    }

    /// Runs the plan, invoking `reporter` once per item.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Finalize`] when the driver file cannot be
    /// written. Item failures never abort the run.
    pub fn run(&self, plan: Plan, reporter: &mut dyn Reporter) -> Result<RunOutcome> {
        info!(
            items = plan.len(),
            dest = %self.destination.base_dir().display(),
            "persisting generated SQL"
        );

        let mut results = Vec::with_capacity(plan.len());
        let mut emitted = Vec::new();

        for item in plan {
            let (provenance, basename, text) = item.resolve(&self.capture);
            let dest_file = self.destination.destination_path(&basename);

            let text = match text {
                Ok(text) => text,
                Err(err) => {
                    let message = err.to_string();
                    reporter.report_failure(Some(&provenance), &message);
                    results.push(PersistedFileResult {
                        dest_file,
                        provenance: Some(provenance.without_content()),
                        error: Some(message),
                        failure_code: Some(err.failure_code()),
                        checksum: None,
                    });
                    continue;
                }
            };

            match write_atomic(&dest_file, text.as_bytes()) {
                Ok(checksum) => {
                    reporter.report_success(&provenance, &dest_file);
                    emitted.push(dest_file.clone());
                    results.push(PersistedFileResult {
                        dest_file,
                        provenance: Some(provenance.without_content()),
                        error: None,
                        failure_code: None,
                        checksum: Some(checksum),
                    });
                }
                Err(err) => {
                    let message = err.to_string();
                    reporter.report_failure(Some(&provenance), &message);
                    results.push(PersistedFileResult {
                        dest_file,
                        provenance: Some(provenance.without_content()),
                        error: Some(message),
                        failure_code: Some(FailureCode::WriteFailed),
                        checksum: None,
                    });
                }
            }
        }

        let driver = self.finalize(&results)?;
        let outcome = RunOutcome {
            results,
            emitted,
            driver,
        };
        if outcome.failed() > 0 {
            warn!(
                succeeded = outcome.succeeded(),
                failed = outcome.failed(),
                "run finished with failures"
            );
        } else {
            info!(succeeded = outcome.succeeded(), "run finished");
        }
        Ok(outcome)
    }

    fn finalize(&self, results: &[PersistedFileResult]) -> Result<PersistedFileResult> {
        let dest_file = self.destination.destination_path(driver_basename());
        let body = driver_body(results);
        let checksum = write_atomic(&dest_file, body.as_bytes()).map_err(PersistError::Finalize)?;
        debug!(driver = %dest_file.display(), "wrote driver file");
        Ok(PersistedFileResult {
            dest_file,
            provenance: None,
            error: None,
            failure_code: None,
            checksum: Some(checksum),
        })
    }
}

/// Writes `bytes` to a temp file beside `path` and renames it into place,
/// returning the SHA-256 of the content.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::result::Result<String, WriteError> {
    let wrap = |source: std::io::Error| WriteError {
        path: path.to_path_buf(),
        source,
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(wrap)?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(wrap)?;
    tmp.write_all(bytes).map_err(wrap)?;
    tmp.flush().map_err(wrap)?;
    tmp.persist(path).map_err(|e| wrap(e.error))?;

    Ok(format!("{:x}", Sha256::digest(bytes)))
}
