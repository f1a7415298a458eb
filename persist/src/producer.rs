//! Content items and their one-shot resolution.
//!
//! A [`ContentItem`] is produced by the [plan](crate::plan) step and consumed
//! by the [engine](crate::PersistenceEngine). Resolving takes the item by
//! value, so a process-backed source runs at most once per item.

use pgdcp_core::{ResolvedProvenance, ValidationError};
use tracing::debug;

use crate::capture::{CaptureOptions, CommandSpec, capture_stdout};
use crate::error::ResolveError;

/// Where an item's text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// Precomputed text, persisted verbatim.
    Literal(String),
    /// Standard output of a program.
    Command(CommandSpec),
    /// Rejected while planning; resolving fails without side effects.
    Rejected(ValidationError),
}

/// One planned output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    pub provenance: ResolvedProvenance,
    /// Destination file name, `{ordinal:03}_{stem}.auto.psql`.
    pub basename: String,
    pub content: ContentSource,
}

impl ContentItem {
    pub fn is_process_backed(&self) -> bool {
        matches!(self.content, ContentSource::Command(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self.content, ContentSource::Rejected(_))
    }

    /// Produces the item's text, running its program if it has one.
    ///
    /// Returns the provenance and basename alongside the outcome so they
    /// survive for reporting after the content is gone.
    pub fn resolve(
        self,
        options: &CaptureOptions,
    ) -> (ResolvedProvenance, String, Result<String, ResolveError>) {
        let Self {
            provenance,
            basename,
            content,
        } = self;
        let text = match content {
            ContentSource::Literal(text) => Ok(text),
            ContentSource::Command(spec) => {
                debug!(
                    source = %provenance.source_path.display(),
                    ordinal = provenance.ordinal,
                    "resolving process-backed content"
                );
                capture_stdout(&spec, options)
            }
            ContentSource::Rejected(error) => Err(ResolveError::from(error)),
        };
        (provenance, basename, text)
    }
}
