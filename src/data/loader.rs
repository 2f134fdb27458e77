// ============================================================
// Layer 4 — Annotated Table Loader
// ============================================================
// Reads annotated utterance tables out of .docx files using the
// docx-rs crate.
//
// The input directory is walked recursively; every file whose
// name ends with the configured suffix (default
// "annotated.docx") is opened and searched for the first table
// whose header row names both required columns:
//
//   | latin_transcription_utterance_used | glossing_utterance_used |
//   |------------------------------------|-------------------------|
//   | der hase läuft                     | art.DEF rabbit.M run    |
//
// The docx-rs tree for a table looks like:
//   Document
//     └── DocumentChild::Table
//           └── TableChild::TableRow
//                 └── TableRowChild::TableCell
//                       └── TableCellContent::Paragraph
//                             └── Run → Text
//
// Each paragraph inside a cell becomes one line of the cell, so
// multi-utterance cells survive as newline-separated text.
//
// Reference: docx-rs crate documentation
//            walkdir crate documentation

use anyhow::{Context, Result};
use std::{fs, path::Path};
use walkdir::WalkDir;

use docx_rs::{
    DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCellContent,
    TableChild, TableRowChild,
};

use crate::domain::diagnostics::{Diagnostic, Diagnostics};
use crate::domain::table::{AnnotatedTable, RawRow};
use crate::domain::traits::TableSource;

pub const DEFAULT_SUFFIX:       &str = "annotated.docx";
pub const DEFAULT_TEXT_COLUMN:  &str = "latin_transcription_utterance_used";
pub const DEFAULT_GLOSS_COLUMN: &str = "glossing_utterance_used";

/// Loads annotated tables from every matching .docx under a directory.
pub struct DocxTableLoader {
    dir:          String,
    suffix:       String,
    text_column:  String,
    gloss_column: String,
    max_rows:     Option<usize>,
}

impl DocxTableLoader {
    pub fn new(dir: impl Into<String>) -> Self {
        Self {
            dir:          dir.into(),
            suffix:       DEFAULT_SUFFIX.to_string(),
            text_column:  DEFAULT_TEXT_COLUMN.to_string(),
            gloss_column: DEFAULT_GLOSS_COLUMN.to_string(),
            max_rows:     None,
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn with_columns(
        mut self,
        text_column:  impl Into<String>,
        gloss_column: impl Into<String>,
    ) -> Self {
        self.text_column  = text_column.into();
        self.gloss_column = gloss_column.into();
        self
    }

    /// Read at most `max_rows` data rows per file.
    pub fn with_max_rows(mut self, max_rows: Option<usize>) -> Self {
        self.max_rows = max_rows;
        self
    }

    fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            // "~$" prefixed files are Word lock files
            .map(|n| n.ends_with(&self.suffix) && !n.starts_with("~$"))
            .unwrap_or(false)
    }

    /// Pull the required columns out of the first table that has them.
    fn extract(&self, source: &str, tables: &[&Table]) -> Option<AnnotatedTable> {
        for table in tables {
            let grid = table_cells(table);
            let Some((header, body)) = grid.split_first() else {
                continue;
            };

            let find = |name: &str| header.iter().position(|h| h.trim() == name);
            let (Some(text_idx), Some(gloss_idx)) =
                (find(&self.text_column), find(&self.gloss_column))
            else {
                continue;
            };

            let limit = self.max_rows.unwrap_or(usize::MAX);
            let rows = body
                .iter()
                .take(limit)
                .enumerate()
                .map(|(index, cells)| {
                    RawRow::new(
                        index,
                        non_blank(cells.get(text_idx)),
                        non_blank(cells.get(gloss_idx)),
                    )
                })
                .collect();

            return Some(AnnotatedTable::new(source, rows));
        }
        None
    }
}

impl TableSource for DocxTableLoader {
    fn load_all(&self, diagnostics: &mut Diagnostics) -> Result<Vec<AnnotatedTable>> {
        let dir = Path::new(&self.dir);
        if !dir.is_dir() {
            anyhow::bail!("Data directory '{}' does not exist", self.dir);
        }

        let mut tables = Vec::new();

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry
                .with_context(|| format!("Cannot walk directory '{}'", self.dir))?;
            let path = entry.path();
            if !entry.file_type().is_file() || !self.matches(path) {
                continue;
            }

            let source = path.display().to_string();
            let docx = match read_document(path) {
                Ok(docx) => docx,
                Err(e) => {
                    diagnostics.push(Diagnostic::UnreadableFile {
                        source,
                        reason: format!("{e:#}"),
                    });
                    continue;
                }
            };

            let doc_tables: Vec<&Table> = docx
                .document
                .children
                .iter()
                .filter_map(|child| match child {
                    DocumentChild::Table(t) => Some(t.as_ref()),
                    _ => None,
                })
                .collect();

            match self.extract(&source, &doc_tables) {
                Some(table) => {
                    tracing::debug!("Loaded: {} ({} rows)", source, table.rows.len());
                    tables.push(table);
                }
                None => diagnostics.push(Diagnostic::MissingColumns {
                    source,
                    missing: vec![self.text_column.clone(), self.gloss_column.clone()],
                }),
            }
        }

        tracing::info!("Loaded {} annotated tables from '{}'", tables.len(), self.dir);
        Ok(tables)
    }
}

fn read_document(path: &Path) -> Result<docx_rs::Docx> {
    let bytes = fs::read(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;
    docx_rs::read_docx(&bytes)
        .map_err(|e| anyhow::anyhow!("docx parse error: {:?}", e))
}

/// Flatten a table into rows of cell strings.
fn table_cells(table: &Table) -> Vec<Vec<String>> {
    table
        .rows
        .iter()
        .filter_map(|row| match row {
            TableChild::TableRow(row) => Some(row),
            #[allow(unreachable_patterns)]
            _ => None,
        })
        .map(|row| {
            row.cells
                .iter()
                .filter_map(|cell| match cell {
                    TableRowChild::TableCell(cell) => Some(cell),
                    #[allow(unreachable_patterns)]
                    _ => None,
                })
                .map(|cell| {
                    cell.children
                        .iter()
                        .filter_map(|content| match content {
                            TableCellContent::Paragraph(p) => Some(paragraph_text(p)),
                            _ => None,
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                })
                .collect()
        })
        .collect()
}

/// Concatenate the text runs of one paragraph.
fn paragraph_text(para: &Paragraph) -> String {
    let mut parts = Vec::new();
    for child in &para.children {
        if let ParagraphChild::Run(run) = child {
            for rc in &run.children {
                if let RunChild::Text(t) = rc {
                    parts.push(t.text.as_str());
                }
            }
        }
    }
    parts.concat()
}

fn non_blank(cell: Option<&String>) -> Option<String> {
    cell.filter(|c| !c.trim().is_empty()).cloned()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use docx_rs::{Docx, Run, TableCell, TableRow};
    use std::path::PathBuf;

    fn cell(text: &str) -> TableCell {
        text.split('\n').fold(TableCell::new(), |c, line| {
            c.add_paragraph(Paragraph::new().add_run(Run::new().add_text(line)))
        })
    }

    /// Write a .docx containing one table with the given header and rows.
    pub(crate) fn write_table_docx(path: &Path, header: &[&str], rows: &[Vec<&str>]) {
        let mut table_rows = vec![TableRow::new(header.iter().map(|h| cell(h)).collect())];
        for r in rows {
            table_rows.push(TableRow::new(r.iter().map(|c| cell(c)).collect()));
        }
        let file = fs::File::create(path).unwrap();
        Docx::new()
            .add_table(Table::new(table_rows))
            .build()
            .pack(file)
            .unwrap();
    }

    fn header() -> Vec<&'static str> {
        vec!["id", DEFAULT_TEXT_COLUMN, DEFAULT_GLOSS_COLUMN]
    }

    #[test]
    fn test_loads_matching_files_recursively() {
        let dir = tempfile::tempdir().unwrap();
        let nested: PathBuf = dir.path().join("speaker1");
        fs::create_dir_all(&nested).unwrap();

        write_table_docx(
            &nested.join("s1_annotated.docx"),
            &header(),
            &[
                vec!["1", "der hase", "art.DEF rabbit.M"],
                vec!["2", "a\nb", "a.M\nb.SG"],
                vec!["3", "", "x.M"],
            ],
        );
        write_table_docx(&dir.path().join("notes.docx"), &header(), &[]);

        let loader = DocxTableLoader::new(dir.path().to_str().unwrap());
        let mut diags = Diagnostics::new();
        let tables = loader.load_all(&mut diags).unwrap();

        assert!(diags.is_empty());
        assert_eq!(tables.len(), 1);
        let rows = &tables[0].rows;
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].text.as_deref(), Some("der hase"));
        assert_eq!(rows[1].gloss.as_deref(), Some("a.M\nb.SG"));
        assert_eq!(rows[2].text, None);
    }

    #[test]
    fn test_max_rows_caps_body() {
        let dir = tempfile::tempdir().unwrap();
        write_table_docx(
            &dir.path().join("x_annotated.docx"),
            &header(),
            &[vec!["1", "a", "a.M"], vec!["2", "b", "b.M"], vec!["3", "c", "c.M"]],
        );

        let loader = DocxTableLoader::new(dir.path().to_str().unwrap())
            .with_max_rows(Some(2));
        let tables = loader.load_all(&mut Diagnostics::new()).unwrap();
        assert_eq!(tables[0].rows.len(), 2);
    }

    #[test]
    fn test_missing_columns_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        write_table_docx(
            &dir.path().join("y_annotated.docx"),
            &["text", "gloss"],
            &[vec!["a", "a.M"]],
        );

        let loader = DocxTableLoader::new(dir.path().to_str().unwrap());
        let mut diags = Diagnostics::new();
        let tables = loader.load_all(&mut diags).unwrap();
        assert!(tables.is_empty());
        assert!(matches!(
            diags.iter().next(),
            Some(Diagnostic::MissingColumns { .. })
        ));
    }

    #[test]
    fn test_unreadable_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("broken_annotated.docx"), b"not a zip").unwrap();

        let loader = DocxTableLoader::new(dir.path().to_str().unwrap());
        let mut diags = Diagnostics::new();
        let tables = loader.load_all(&mut diags).unwrap();
        assert!(tables.is_empty());
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let loader = DocxTableLoader::new("/definitely/not/here");
        assert!(loader.load_all(&mut Diagnostics::new()).is_err());
    }
}
