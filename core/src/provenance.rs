//! Provenance of generated SQL content.
//!
//! A [`ProvenanceEntry`] describes where one piece of emitted SQL comes from:
//! the source identifier, an optional explicit ordinal, and a
//! confidentiality classification. Entries either carry literal text (see
//! [`ProvenanceEntry::is_persistable_content`]) or name a program whose
//! standard output supplies the text.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Confidentiality classification attached to generated output.
///
/// The emit pipeline never branches on this value; it is preserved in every
/// reported result so callers can apply their own handling policy (for
/// example, excluding secret-bearing files from public artifacts).
///
/// # Examples
///
/// ```
/// use pgdcp_core::Confidentiality;
///
/// assert_eq!(Confidentiality::default(), Confidentiality::NonSensitive);
/// assert_eq!(Confidentiality::ContainsSecrets.to_string(), "contains-secrets");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Confidentiality {
    #[default]
    NonSensitive,
    ContainsSecrets,
}

impl Confidentiality {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NonSensitive => "non-sensitive",
            Self::ContainsSecrets => "contains-secrets",
        }
    }
}

impl std::fmt::Display for Confidentiality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// One declared content source, in declaration order.
///
/// # Examples
///
/// ```
/// use pgdcp_core::{Confidentiality, ProvenanceEntry};
///
/// let inline = ProvenanceEntry::literal("seed.sql", "SELECT 1;");
/// assert!(inline.is_persistable_content());
///
/// let script = ProvenanceEntry::command("020_lifecycle.sqla.ts")
///     .with_index(20)
///     .with_interpreter(["deno", "run", "-A"])
///     .with_confidentiality(Confidentiality::ContainsSecrets);
/// assert!(!script.is_persistable_content());
/// assert_eq!(script.index, Some(20));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceEntry {
    /// Path or URL of the origin of the content.
    pub source: String,
    /// Explicit ordinal; `None` continues from the previous resolved ordinal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(default)]
    pub confidentiality: Confidentiality,
    /// Precomputed SQL text. When absent the source is executed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Program and leading arguments used to launch a process-backed source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<Vec<String>>,
}

impl ProvenanceEntry {
    /// An entry whose text is already computed.
    pub fn literal(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            index: None,
            confidentiality: Confidentiality::default(),
            content: Some(content.into()),
            interpreter: None,
        }
    }

    /// An entry whose text is the standard output of running `source`.
    pub fn command(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            index: None,
            confidentiality: Confidentiality::default(),
            content: None,
            interpreter: None,
        }
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_confidentiality(mut self, confidentiality: Confidentiality) -> Self {
        self.confidentiality = confidentiality;
        self
    }

    pub fn with_interpreter<I, S>(mut self, argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interpreter = Some(argv.into_iter().map(Into::into).collect());
        self
    }

    /// Returns `true` when the entry supplies its own content.
    pub fn is_persistable_content(&self) -> bool {
        self.content.is_some()
    }
}

/// A [`ProvenanceEntry`] after its source path and ordinal are resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedProvenance {
    #[serde(flatten)]
    pub entry: ProvenanceEntry,
    /// Absolute path of the source.
    pub source_path: PathBuf,
    pub ordinal: u32,
}

impl ResolvedProvenance {
    pub fn confidentiality(&self) -> Confidentiality {
        self.entry.confidentiality
    }

    /// Drops literal content, keeping everything that identifies the entry.
    pub fn without_content(mut self) -> Self {
        self.entry.content = None;
        self
    }
}
