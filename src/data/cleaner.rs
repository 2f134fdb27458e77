// ============================================================
// Layer 4 — Corpus Cleaner
// ============================================================
// Normalises raw transcription and gloss cells before they are
// aligned, tokenised, and mapped to features.
//
// Field transcriptions carry a lot of editorial noise:
//   - utterance numbers ("12 ich gehe")
//   - bracketed insertions ("[laughs]", "(unclear)")
//   - doubled dots from gloss separators ("go..PST")
//   - commas and final stops
//
// Cleaning steps (applied in order):
//   1. Remove runs of digits
//   2. Remove brackets  [ ] ( ) { }
//   3. Collapse ".." into "."
//   4. Remove commas
//   5. Trim whitespace, then leading/trailing dots
//   6. Lowercase
//   7. Final trim
//
// A cell may hold several utterances, one per line. Each
// non-empty line becomes its own utterance; text and gloss
// cells of a row must yield the same number of lines.
//
// Reference: Rust Book §8 (Strings in Rust)
//            regex crate documentation

use std::sync::LazyLock;

use regex::Regex;

static DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("digit pattern is valid"));

static BRACKETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\[\]\(\)\{\}]").expect("bracket pattern is valid"));

/// Text and gloss cells of one row split into different line counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCountMismatch {
    pub texts:   usize,
    pub glosses: usize,
}

pub struct Cleaner;

impl Cleaner {
    pub fn new() -> Self {
        Self
    }

    /// Clean one raw cell. Newlines are preserved so the cell
    /// can still be split into utterances afterwards.
    pub fn clean(&self, text: &str) -> String {
        let text = DIGITS.replace_all(text, "");
        let text = BRACKETS.replace_all(&text, "");
        let text = text.replace("..", ".").replace(',', "");
        let text = strip_edges(&text).to_lowercase();
        text.trim().to_string()
    }

    /// Clean a cell and split it into one utterance per non-empty line.
    pub fn split_utterances(&self, cell: &str) -> Vec<String> {
        self.clean(cell)
            .lines()
            .map(strip_edges)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Split both cells of a row and pair their lines.
    ///
    /// A differing line count means the row cannot be aligned
    /// safely; the caller skips the whole row.
    pub fn align(
        &self,
        text_cell:  &str,
        gloss_cell: &str,
    ) -> Result<Vec<(String, String)>, LineCountMismatch> {
        let texts   = self.split_utterances(text_cell);
        let glosses = self.split_utterances(gloss_cell);

        if texts.len() != glosses.len() {
            return Err(LineCountMismatch {
                texts:   texts.len(),
                glosses: glosses.len(),
            });
        }

        Ok(texts.into_iter().zip(glosses).collect())
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new()
    }
}

/// Trim surrounding whitespace and dots.
fn strip_edges(s: &str) -> &str {
    s.trim().trim_matches('.').trim()
}
