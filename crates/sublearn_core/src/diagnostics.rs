//! Per-file diagnostics report.
//!
//! Non-fatal conditions found while processing one file (skipped blocks,
//! low-confidence alignment, corrected overlaps) are collected here and
//! returned with the result. Every entry is also logged when recorded.

use std::fmt;

use serde::Serialize;

use crate::track::Role;

/// Kind of non-fatal condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// A malformed cue block was skipped by the parser.
    SkippedBlock,
    /// Parse coverage was below 100%.
    PartialCoverage,
    /// Alignment succeeded but its mapping is unreliable.
    LowConfidence,
    /// A same-role overlap was corrected.
    Overlap,
    /// A cue end was shortened to keep the minimum gap.
    GapAdjusted,
    /// Translation count differed from the dub cue count.
    CountMismatch,
}

impl DiagnosticKind {
    /// Short label for log output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SkippedBlock => "skipped-block",
            Self::PartialCoverage => "partial-coverage",
            Self::LowConfidence => "low-confidence",
            Self::Overlap => "overlap",
            Self::GapAdjusted => "gap-adjusted",
            Self::CountMismatch => "count-mismatch",
        }
    }
}

/// One recorded condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Track the condition belongs to, when it is track-specific.
    pub role: Option<Role>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, role: Option<Role>, message: impl Into<String>) -> Self {
        Self {
            kind,
            role,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.role {
            Some(role) => write!(f, "[{}] {}: {}", self.kind.label(), role, self.message),
            None => write!(f, "[{}] {}", self.kind.label(), self.message),
        }
    }
}

/// Ordered collection of diagnostics for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and log it.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.kind {
            DiagnosticKind::GapAdjusted => tracing::debug!("{}", diagnostic),
            _ => tracing::warn!("{}", diagnostic),
        }
        self.entries.push(diagnostic);
    }

    /// Record a new diagnostic built from parts.
    pub fn record(&mut self, kind: DiagnosticKind, role: Option<Role>, message: impl Into<String>) {
        self.push(Diagnostic::new(kind, role, message));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Number of entries of a given kind.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    /// Whether any entry of the given kind exists.
    pub fn has(&self, kind: DiagnosticKind) -> bool {
        self.entries.iter().any(|d| d.kind == kind)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<T: IntoIterator<Item = Diagnostic>>(&mut self, iter: T) {
        for diagnostic in iter {
            self.push(diagnostic);
        }
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
