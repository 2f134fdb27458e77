// ============================================================
// Layer 3 — Annotated Table Domain Type
// ============================================================
// One input file in format-agnostic form: a list of rows, each
// holding the raw transcription cell and the raw gloss cell.
// By the time an AnnotatedTable exists the file format has
// already been dealt with by a TableSource.
//
// Cells are Option<String> because a row may simply not have
// a value in one of the required columns. Such rows are
// dropped by the dataset builder.

use serde::{Deserialize, Serialize};

/// One row of an annotated utterance table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    /// Zero-based index of the data row (header excluded)
    pub index: usize,

    /// Raw transcription cell; may contain several lines
    pub text: Option<String>,

    /// Raw gloss cell; may contain several lines
    pub gloss: Option<String>,
}

impl RawRow {
    pub fn new(index: usize, text: Option<String>, gloss: Option<String>) -> Self {
        Self { index, text, gloss }
    }

    /// Both required cells, or None if either is absent or blank.
    pub fn required_cells(&self) -> Option<(&str, &str)> {
        let text  = self.text.as_deref().filter(|s| !s.trim().is_empty())?;
        let gloss = self.gloss.as_deref().filter(|s| !s.trim().is_empty())?;
        Some((text, gloss))
    }
}

/// All rows read from one annotated file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotatedTable {
    pub source: String,
    pub rows:   Vec<RawRow>,
}

impl AnnotatedTable {
    pub fn new(source: impl Into<String>, rows: Vec<RawRow>) -> Self {
        Self { source: source.into(), rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_cells_rejects_blank() {
        let row = RawRow::new(0, Some("ich".into()), Some("   ".into()));
        assert!(row.required_cells().is_none());

        let row = RawRow::new(1, None, Some("I.1SG".into()));
        assert!(row.required_cells().is_none());

        let row = RawRow::new(2, Some("ich".into()), Some("I.1SG".into()));
        assert_eq!(row.required_cells(), Some(("ich", "I.1SG")));
    }
}
