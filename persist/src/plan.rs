//! The pure planning step.
//!
//! Planning resolves every entry's source path, ordinal, destination
//! basename and content source up front without running or writing
//! anything. The resulting [`Plan`] is consumed by value, once.
//!
//! Every entry becomes an item. An entry with an empty source or an
//! ordinal already taken by an earlier entry is planned as
//! [`ContentSource::Rejected`] and fails when the engine reaches it; an
//! explicit index lower than the previous ordinal is logged and kept.
//!
//! # Examples
//!
//! ```
//! use pgdcp_core::ProvenanceEntry;
//! use pgdcp_persist::plan;
//! use std::path::Path;
//!
//! let entries = vec![
//!     ProvenanceEntry::literal("a", "SELECT 1;"),
//!     ProvenanceEntry::command("b.sqla.sh").with_index(5),
//!     ProvenanceEntry::literal("c", "SELECT 2;"),
//! ];
//! let plan = plan::plan(&entries, Path::new("/gen"));
//! let names: Vec<&str> = plan.items().iter().map(|i| i.basename.as_str()).collect();
//! assert_eq!(names, ["000_a.auto.psql", "005_b.auto.psql", "006_c.auto.psql"]);
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use pgdcp_core::naming::destination_basename;
use pgdcp_core::{
    ProvenanceEntry, ResolvedProvenance, ValidationError, resolve_ordinals, validate_entries,
};
use tracing::warn;

use crate::capture::CommandSpec;
use crate::producer::{ContentItem, ContentSource};

/// Ordered, fully resolved content items for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    items: Vec<ContentItem>,
}

impl Plan {
    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl IntoIterator for Plan {
    type Item = ContentItem;
    type IntoIter = std::vec::IntoIter<ContentItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Resolves `source` against `base_dir`: `file://` URLs are stripped and
/// percent-decoded, absolute paths are kept, relative ones are joined.
pub fn resolve_source_path(source: &str, base_dir: &Path) -> PathBuf {
    let path = match source.strip_prefix("file://") {
        Some(rest) => PathBuf::from(percent_decode_str(rest).decode_utf8_lossy().into_owned()),
        None => PathBuf::from(source),
    };
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}

/// Collects the entries that must fail, keyed by position. The first error
/// found for a position wins.
fn rejected_entries(entries: &[ProvenanceEntry]) -> HashMap<usize, ValidationError> {
    let mut rejected = HashMap::new();
    for error in validate_entries(entries) {
        if error.rejects_entry() {
            rejected.entry(error.position()).or_insert(error);
        } else {
            warn!(position = error.position(), %error, "ordinal runs behind an earlier entry");
        }
    }
    rejected
}

/// Plans a run over `entries`. Every entry yields exactly one item.
pub fn plan(entries: &[ProvenanceEntry], base_dir: &Path) -> Plan {
    let mut rejected = rejected_entries(entries);

    let items = entries
        .iter()
        .zip(resolve_ordinals(entries))
        .enumerate()
        .map(|(position, (entry, ordinal))| {
            let source_path = resolve_source_path(&entry.source, base_dir);
            let basename = destination_basename(&source_path, ordinal);
            let content = match (rejected.remove(&position), entry.content.as_ref()) {
                (Some(error), _) => ContentSource::Rejected(error),
                (None, Some(text)) => ContentSource::Literal(text.clone()),
                (None, None) => ContentSource::Command(CommandSpec::new(
                    &source_path,
                    entry.interpreter.as_deref(),
                )),
            };
            ContentItem {
                provenance: ResolvedProvenance {
                    entry: entry.clone(),
                    source_path,
                    ordinal,
                },
                basename,
                content,
            }
        })
        .collect();

    Plan { items }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgdcp_core::{Confidentiality, ValidationError};

    #[test]
    fn test_resolve_source_path_variants() {
        let base = Path::new("/repo/gen");
        assert_eq!(
            resolve_source_path("a.sqla.ts", base),
            PathBuf::from("/repo/gen/a.sqla.ts")
        );
        assert_eq!(
            resolve_source_path("./sub/b.sqla.ts", base),
            PathBuf::from("/repo/gen/./sub/b.sqla.ts")
        );
        assert_eq!(
            resolve_source_path("/abs/c.sqla.ts", base),
            PathBuf::from("/abs/c.sqla.ts")
        );
        assert_eq!(
            resolve_source_path("file:///abs/d.sqla.ts", base),
            PathBuf::from("/abs/d.sqla.ts")
        );
    }

    #[test]
    fn test_file_url_is_percent_decoded() {
        let base = Path::new("/repo/gen");
        assert_eq!(
            resolve_source_path("file:///my%20dir/x.sqla.ts", base),
            PathBuf::from("/my dir/x.sqla.ts")
        );
        assert_eq!(
            resolve_source_path("file:///gen/%C3%A9t%C3%A9.sqla.ts", base),
            PathBuf::from("/gen/\u{e9}t\u{e9}.sqla.ts")
        );
        // Plain paths are taken literally.
        assert_eq!(
            resolve_source_path("a%20b.sqla.ts", base),
            PathBuf::from("/repo/gen/a%20b.sqla.ts")
        );

        let plan = plan(
            &[ProvenanceEntry::command("file:///my%20dir/x.sqla.ts")],
            base,
        );
        assert_eq!(plan.items()[0].basename, "000_x.auto.psql");
        assert_eq!(
            plan.items()[0].provenance.source_path,
            PathBuf::from("/my dir/x.sqla.ts")
        );
    }

    #[test]
    fn test_plan_assigns_ordinals_and_content_sources() {
        let entries = vec![
            ProvenanceEntry::literal("a", "SELECT 1;"),
            ProvenanceEntry::command("b.sqla.ts")
                .with_index(5)
                .with_interpreter(["deno", "run", "-A"])
                .with_confidentiality(Confidentiality::ContainsSecrets),
            ProvenanceEntry::literal("c", "SELECT 2;"),
        ];
        let plan = plan(&entries, Path::new("/gen"));
        assert_eq!(plan.len(), 3);

        let ordinals: Vec<u32> = plan.items().iter().map(|i| i.provenance.ordinal).collect();
        assert_eq!(ordinals, vec![0, 5, 6]);

        let b = &plan.items()[1];
        assert_eq!(b.basename, "005_b.auto.psql");
        assert_eq!(b.provenance.confidentiality(), Confidentiality::ContainsSecrets);
        match &b.content {
            ContentSource::Command(spec) => {
                assert_eq!(spec.argv(), vec!["deno", "run", "-A", "/gen/b.sqla.ts"]);
            }
            other => panic!("expected command, got {other:?}"),
        }
        assert_eq!(
            plan.items()[2].content,
            ContentSource::Literal("SELECT 2;".to_string())
        );
    }

    #[test]
    fn test_duplicate_ordinal_rejects_only_later_entry() {
        let entries = vec![
            ProvenanceEntry::literal("a", "SELECT 1;").with_index(3),
            ProvenanceEntry::literal("b", "SELECT 2;").with_index(3),
            ProvenanceEntry::literal("c", "SELECT 3;"),
        ];
        let plan = plan(&entries, Path::new("/gen"));
        assert_eq!(plan.len(), 3);
        assert_eq!(
            plan.items()[0].content,
            ContentSource::Literal("SELECT 1;".to_string())
        );
        assert_eq!(
            plan.items()[1].content,
            ContentSource::Rejected(ValidationError::DuplicateOrdinal {
                ordinal: 3,
                position: 1
            })
        );
        assert_eq!(plan.items()[2].basename, "004_c.auto.psql");
        assert!(!plan.items()[2].is_rejected());
    }

    #[test]
    fn test_regressing_index_is_kept() {
        let entries = vec![
            ProvenanceEntry::literal("a", "SELECT 1;").with_index(5),
            ProvenanceEntry::literal("b", "SELECT 2;").with_index(2),
        ];
        let plan = plan(&entries, Path::new("/gen"));
        let names: Vec<&str> = plan.items().iter().map(|i| i.basename.as_str()).collect();
        assert_eq!(names, ["005_a.auto.psql", "002_b.auto.psql"]);
        assert!(plan.items().iter().all(|item| !item.is_rejected()));
    }

    #[test]
    fn test_empty_source_is_rejected() {
        let entries = vec![
            ProvenanceEntry::literal(" ", "SELECT 1;"),
            ProvenanceEntry::literal("b", "SELECT 2;"),
        ];
        let plan = plan(&entries, Path::new("/gen"));
        assert_eq!(
            plan.items()[0].content,
            ContentSource::Rejected(ValidationError::EmptySource { position: 0 })
        );
        assert!(!plan.items()[1].is_rejected());
    }

    #[test]
    fn test_empty_plan_is_valid() {
        let plan = plan(&[], Path::new("/gen"));
        assert!(plan.is_empty());
        assert_eq!(plan.into_iter().count(), 0);
    }
}
