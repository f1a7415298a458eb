//! Ordinal resolution and validation for provenance lists.
//!
//! Ordinals are resolved with a running counter seeded at `-1`: an explicit
//! index becomes the new running value, otherwise the value increments by
//! one. Validation then catches configurations whose explicit indices would
//! collide with, or run behind, earlier ordinals. Collisions and empty
//! sources fail the offending entry; a regression alone is only reported.
//!
//! # Examples
//!
//! ```
//! use pgdcp_core::{ProvenanceEntry, resolve_ordinals, validate_entries};
//!
//! let entries = vec![
//!     ProvenanceEntry::literal("a", "SELECT 1;"),
//!     ProvenanceEntry::command("b.sqla.ts").with_index(5),
//!     ProvenanceEntry::literal("c", "SELECT 2;"),
//! ];
//! assert_eq!(resolve_ordinals(&entries), vec![0, 5, 6]);
//! assert!(validate_entries(&entries).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::provenance::ProvenanceEntry;

/// Provenance list validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// An entry's `source` is empty or whitespace-only.
    #[error("entry {position} has an empty source")]
    EmptySource { position: usize },
    /// Two entries resolve to the same ordinal.
    #[error("ordinal {ordinal} is used more than once (entry {position})")]
    DuplicateOrdinal { ordinal: u32, position: usize },
    /// An explicit index is lower than the ordinal resolved before it.
    #[error("explicit index {ordinal} at entry {position} precedes previous ordinal {previous}")]
    OrdinalRegression {
        ordinal: u32,
        previous: u32,
        position: usize,
    },
}

impl ValidationError {
    /// Index of the offending entry in the provenance list.
    pub fn position(&self) -> usize {
        match self {
            Self::EmptySource { position }
            | Self::DuplicateOrdinal { position, .. }
            | Self::OrdinalRegression { position, .. } => *position,
        }
    }

    /// Whether the entry must be failed instead of emitted. Regressions keep
    /// a unique ordinal and do not.
    pub fn rejects_entry(&self) -> bool {
        !matches!(self, Self::OrdinalRegression { .. })
    }
}

/// Resolves the ordinal of every entry, in order.
pub fn resolve_ordinals(entries: &[ProvenanceEntry]) -> Vec<u32> {
    let mut last: i64 = -1;
    entries
        .iter()
        .map(|entry| {
            last = match entry.index {
                Some(index) => i64::from(index),
                None => last + 1,
            };
            // `last` starts at -1 and only grows from an explicit u32 or by
            // one, so it is non-negative here; saturate past u32::MAX.
            u32::try_from(last).unwrap_or(u32::MAX)
        })
        .collect()
}

/// Checks resolved ordinals for collisions and regressions.
pub fn validate_ordinals(ordinals: &[u32]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let mut previous: Option<u32> = None;

    for (position, &ordinal) in ordinals.iter().enumerate() {
        if let Some(prev) = previous {
            if ordinal < prev {
                errors.push(ValidationError::OrdinalRegression {
                    ordinal,
                    previous: prev,
                    position,
                });
            }
        }
        if !seen.insert(ordinal) {
            errors.push(ValidationError::DuplicateOrdinal { ordinal, position });
        }
        previous = Some(ordinal);
    }

    errors
}

/// Validates a provenance list: non-empty sources and well-formed ordinals.
pub fn validate_entries(entries: &[ProvenanceEntry]) -> Vec<ValidationError> {
    let mut errors: Vec<ValidationError> = entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.source.trim().is_empty())
        .map(|(position, _)| ValidationError::EmptySource { position })
        .collect();
    errors.extend(validate_ordinals(&resolve_ordinals(entries)));
    errors
}
