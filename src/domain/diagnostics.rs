// ============================================================
// Layer 3 — Build Diagnostics
// ============================================================
// Every recoverable problem met while turning annotated tables
// into a corpus is recorded here instead of aborting the run:
//
//   UnreadableFile      → file skipped
//   MissingColumns      → file skipped
//   LineCountMismatch   → row skipped
//   EmptyText           → utterance skipped
//   TokenizerFailed     → utterance skipped
//   UnknownCodes        → utterance kept, codes reported
//   TokenCountMismatch  → utterance skipped
//
// Pushing a diagnostic also emits a `warn` event, so the log and
// the returned list always agree.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    UnreadableFile {
        source: String,
        reason: String,
    },
    MissingColumns {
        source:  String,
        missing: Vec<String>,
    },
    LineCountMismatch {
        source:  String,
        row:     usize,
        texts:   usize,
        glosses: usize,
    },
    EmptyText {
        source: String,
        row:    usize,
    },
    TokenizerFailed {
        source: String,
        row:    usize,
        reason: String,
    },
    UnknownCodes {
        source: String,
        row:    usize,
        codes:  Vec<String>,
    },
    TokenCountMismatch {
        source:   String,
        row:      usize,
        text:     String,
        tokens:   usize,
        features: usize,
    },
}

impl Diagnostic {
    /// True when the diagnostic means data was left out of the corpus.
    pub fn is_exclusion(&self) -> bool {
        !matches!(self, Diagnostic::UnknownCodes { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnreadableFile { source, reason } => {
                write!(f, "skipping '{source}': {reason}")
            }
            Diagnostic::MissingColumns { source, missing } => {
                write!(f, "skipping '{source}': no table with column(s) {missing:?}")
            }
            Diagnostic::LineCountMismatch { source, row, texts, glosses } => write!(
                f,
                "line count mismatch in '{source}' row {row}: {texts} texts vs {glosses} glosses"
            ),
            Diagnostic::EmptyText { source, row } => {
                write!(f, "empty text after cleaning in '{source}' row {row}")
            }
            Diagnostic::TokenizerFailed { source, row, reason } => {
                write!(f, "cannot tokenise '{source}' row {row}: {reason}")
            }
            Diagnostic::UnknownCodes { source, row, codes } => {
                write!(f, "unknown codes in '{source}' row {row}: {codes:?}")
            }
            Diagnostic::TokenCountMismatch { source, row, text, tokens, features } => write!(
                f,
                "token count mismatch in '{source}' row {row}: '{text}' has {tokens} tokens but {features} feature sets"
            ),
        }
    }
}

/// Ordered list of diagnostics returned alongside a built corpus.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and log it.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::warn!("{}", diagnostic);
        self.items.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of diagnostics that dropped data from the corpus.
    pub fn exclusions(&self) -> usize {
        self.items.iter().filter(|d| d.is_exclusion()).count()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }
}
