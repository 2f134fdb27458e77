// ============================================================
// Layer 4 — Dataset Builder
// ============================================================
// Turns loaded annotated tables into a DocCorpus:
//
//   AnnotatedTable
//       │  drop rows missing text or gloss
//       ▼
//   Cleaner::align        → (text, gloss) per utterance line
//       │
//       ▼
//   BlankTokenizer        → text tokens
//   GlossMapper           → one feature string per gloss token
//       │  token count must equal feature count
//       ▼
//   AnnotatedDoc          → pushed into the corpus
//
// Nothing in here fails the run. Problems are recorded as
// Diagnostics and the offending row or utterance is skipped.

use serde::Serialize;

use crate::data::cleaner::Cleaner;
use crate::data::corpus::DocCorpus;
use crate::data::tokenizer::BlankTokenizer;
use crate::domain::annotated::{AnnotatedDoc, MorphToken};
use crate::domain::diagnostics::{Diagnostic, Diagnostics};
use crate::domain::gloss::GlossMapper;
use crate::domain::table::AnnotatedTable;

/// One aligned (text, gloss) pair, kept for inspection exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlignedPair {
    pub source:        String,
    pub row:           usize,
    pub cleaned_text:  String,
    pub cleaned_gloss: String,
}

/// Counters describing one build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub files:        usize,
    pub rows:         usize,
    pub rows_dropped: usize,
    pub utterances:   usize,
    pub documents:    usize,
    pub tokens:       usize,
}

pub struct BuildOutput {
    pub corpus:      DocCorpus,
    pub diagnostics: Diagnostics,
    pub aligned:     Vec<AlignedPair>,
    pub stats:       BuildStats,
}

pub struct DatasetBuilder<'a> {
    mapper:    &'a GlossMapper,
    tokenizer: &'a BlankTokenizer,
    cleaner:   Cleaner,
}

impl<'a> DatasetBuilder<'a> {
    pub fn new(mapper: &'a GlossMapper, tokenizer: &'a BlankTokenizer) -> Self {
        Self { mapper, tokenizer, cleaner: Cleaner::new() }
    }

    /// Build a corpus from every row of every table.
    pub fn build(&self, tables: &[AnnotatedTable]) -> BuildOutput {
        let mut corpus      = DocCorpus::new();
        let mut diagnostics = Diagnostics::new();
        let mut aligned     = Vec::new();
        let mut stats       = BuildStats { files: tables.len(), ..Default::default() };

        for table in tables {
            let before = corpus.len();

            for row in &table.rows {
                stats.rows += 1;

                // Rows missing a required cell are dropped silently
                let Some((text_cell, gloss_cell)) = row.required_cells() else {
                    stats.rows_dropped += 1;
                    continue;
                };

                let pairs = match self.cleaner.align(text_cell, gloss_cell) {
                    Ok(pairs) => pairs,
                    Err(mismatch) => {
                        diagnostics.push(Diagnostic::LineCountMismatch {
                            source:  table.source.clone(),
                            row:     row.index,
                            texts:   mismatch.texts,
                            glosses: mismatch.glosses,
                        });
                        continue;
                    }
                };

                for (text, gloss) in pairs {
                    stats.utterances += 1;
                    aligned.push(AlignedPair {
                        source:        table.source.clone(),
                        row:           row.index,
                        cleaned_text:  text.clone(),
                        cleaned_gloss: gloss.clone(),
                    });
                    self.add_utterance(
                        &table.source, row.index, &text, &gloss,
                        &mut corpus, &mut diagnostics,
                    );
                }
            }

            tracing::info!(
                "Processed '{}': {} documents added",
                table.source,
                corpus.len() - before
            );
        }

        stats.documents = corpus.len();
        stats.tokens    = corpus.token_count();

        tracing::info!(
            "Built corpus with {} documents ({} tokens) from {} files, {} diagnostics",
            stats.documents,
            stats.tokens,
            stats.files,
            diagnostics.len()
        );

        BuildOutput { corpus, diagnostics, aligned, stats }
    }

    /// Tokenise one cleaned utterance, attach features, and add it.
    /// Returns whether the utterance made it into the corpus.
    pub fn add_utterance(
        &self,
        source:      &str,
        row:         usize,
        text:        &str,
        gloss:       &str,
        corpus:      &mut DocCorpus,
        diagnostics: &mut Diagnostics,
    ) -> bool {
        if text.trim().is_empty() {
            diagnostics.push(Diagnostic::EmptyText { source: source.to_string(), row });
            return false;
        }

        let tokens = match self.tokenizer.tokenize(text) {
            Ok(tokens) => tokens,
            Err(e) => {
                diagnostics.push(Diagnostic::TokenizerFailed {
                    source: source.to_string(),
                    row,
                    reason: format!("{e:#}"),
                });
                return false;
            }
        };

        let mapping = self.mapper.map(gloss);
        if mapping.has_unknown_codes() {
            diagnostics.push(Diagnostic::UnknownCodes {
                source: source.to_string(),
                row,
                codes:  mapping.unknown_codes.clone(),
            });
        }

        if tokens.len() != mapping.features.len() {
            diagnostics.push(Diagnostic::TokenCountMismatch {
                source:   source.to_string(),
                row,
                text:     text.to_string(),
                tokens:   tokens.len(),
                features: mapping.features.len(),
            });
            return false;
        }

        let morph_tokens = tokens
            .into_iter()
            .zip(mapping.features)
            .map(|(tok, feat)| MorphToken::new(tok, feat))
            .collect();

        corpus.push(AnnotatedDoc::new(source, text, morph_tokens));
        true
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::gloss::GlossaryTables;
    use crate::domain::table::RawRow;
    use std::collections::BTreeMap;

    fn mapper() -> GlossMapper {
        let codes = BTreeMap::from([
            ("M".to_string(),  "Masc".to_string()),
            ("SG".to_string(), "Sing".to_string()),
        ]);
        let feats = BTreeMap::from([
            ("Masc".to_string(), "Gender".to_string()),
            ("Sing".to_string(), "Number".to_string()),
        ]);
        GlossMapper::new(GlossaryTables::new(codes, feats))
    }

    fn row(i: usize, text: &str, gloss: &str) -> RawRow {
        RawRow::new(i, Some(text.to_string()), Some(gloss.to_string()))
    }

    #[test]
    fn test_token_feature_mismatch_is_skipped_with_warning() {
        let m   = mapper();
        let tok = BlankTokenizer::new("de").unwrap();
        let b   = DatasetBuilder::new(&m, &tok);

        let mut corpus = DocCorpus::new();
        let mut diags  = Diagnostics::new();
        let added = b.add_utterance("f", 0, "der hase läuft", "art.M rabbit.SG", &mut corpus, &mut diags);

        assert!(!added);
        assert!(corpus.is_empty());
        assert!(matches!(
            diags.iter().next(),
            Some(Diagnostic::TokenCountMismatch { tokens: 3, features: 2, .. })
        ));
    }

    #[test]
    fn test_builds_documents_with_features() {
        let m   = mapper();
        let tok = BlankTokenizer::new("de").unwrap();
        let b   = DatasetBuilder::new(&m, &tok);

        let table = AnnotatedTable::new(
            "s1_annotated.docx",
            vec![
                row(0, "1. Der Hase.", "art.M rabbit.M.SG"),
                row(1, "ich\ndu", "i.SG\nyou.SG"),
                RawRow::new(2, None, Some("x.M".to_string())),
            ],
        );

        let out = b.build(&[table]);
        assert!(out.diagnostics.is_empty());
        assert_eq!(out.stats.rows, 3);
        assert_eq!(out.stats.rows_dropped, 1);
        assert_eq!(out.stats.documents, 3);
        assert_eq!(out.aligned.len(), 3);

        let first = &out.corpus.docs()[0];
        assert_eq!(first.text, "der hase");
        assert_eq!(first.tokens[1], MorphToken::new("hase", "Gender=Masc|Number=Sing"));
    }

    #[test]
    fn test_line_count_mismatch_skips_row() {
        let m   = mapper();
        let tok = BlankTokenizer::new("de").unwrap();
        let b   = DatasetBuilder::new(&m, &tok);

        let table = AnnotatedTable::new("f", vec![row(0, "a\nb", "a.M"), row(1, "c", "c.M")]);
        let out = b.build(&[table]);

        assert_eq!(out.corpus.len(), 1);
        assert!(matches!(
            out.diagnostics.iter().next(),
            Some(Diagnostic::LineCountMismatch { texts: 2, glosses: 1, row: 0, .. })
        ));
    }

    #[test]
    fn test_unknown_codes_keep_the_utterance() {
        let m   = mapper();
        let tok = BlankTokenizer::new("de").unwrap();
        let b   = DatasetBuilder::new(&m, &tok);

        let mut corpus = DocCorpus::new();
        let mut diags  = Diagnostics::new();
        assert!(b.add_utterance("f", 0, "er ging", "he.M go.PST", &mut corpus, &mut diags));
        assert_eq!(corpus.docs()[0].tokens[1].morph, "_");
        assert_eq!(diags.exclusions(), 0);
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_empty_text_is_reported() {
        let m   = mapper();
        let tok = BlankTokenizer::new("de").unwrap();
        let b   = DatasetBuilder::new(&m, &tok);

        let mut corpus = DocCorpus::new();
        let mut diags  = Diagnostics::new();
        assert!(!b.add_utterance("f", 4, "  ", "", &mut corpus, &mut diags));
        assert!(matches!(diags.iter().next(), Some(Diagnostic::EmptyText { row: 4, .. })));
    }
}
