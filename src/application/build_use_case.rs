// ============================================================
// Layer 2 — BuildUseCase
// ============================================================
// Turns a directory of annotated .docx tables into a corpus:
//
//   Step 1: Load glossary tables        (Layer 6 - infra)
//   Step 2: Create blank tokenizer      (Layer 4 - data)
//   Step 3: Load annotated tables       (Layer 4 - data)
//   Step 4: Clean, align, tokenise, map (Layer 4 - data)
//   Step 5: Optional exports            (Layer 4 - data)
//
// Used on its own by `gloss-morph build` and as the first phase
// of every training run.
//
// Reference: Rust Book §13 (Iterators and Closures)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::data::{
    builder::{BuildOutput, DatasetBuilder},
    corpus::write_jsonl,
    loader::{DocxTableLoader, DEFAULT_GLOSS_COLUMN, DEFAULT_SUFFIX, DEFAULT_TEXT_COLUMN},
    tokenizer::BlankTokenizer,
};
use crate::domain::diagnostics::Diagnostics;
use crate::domain::gloss::GlossMapper;
use crate::domain::traits::TableSource;
use crate::infra::glossary_store::GlossaryStore;

pub const INSPECTION_FILE: &str = "cleaned_inspection.jsonl";
pub const EXAMPLES_FILE:   &str = "examples.jsonl";

// ─── Build Configuration ─────────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    pub lang:          String,
    pub data_dir:      String,
    pub suffix:        String,
    pub text_column:   String,
    pub gloss_column:  String,
    pub max_rows:      Option<usize>,
    pub glossary_path: Option<String>,
    pub features_path: Option<String>,
    /// Directory for cleaned_inspection.jsonl and examples.jsonl
    pub inspect_dir:   Option<String>,
    /// Where to write the corpus as JSON lines
    pub corpus_out:    Option<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            lang:          "gsw".to_string(),
            data_dir:      "data".to_string(),
            suffix:        DEFAULT_SUFFIX.to_string(),
            text_column:   DEFAULT_TEXT_COLUMN.to_string(),
            gloss_column:  DEFAULT_GLOSS_COLUMN.to_string(),
            max_rows:      None,
            glossary_path: None,
            features_path: None,
            inspect_dir:   None,
            corpus_out:    None,
        }
    }
}

/// One accepted document in examples.jsonl.
#[derive(Debug, Clone, Serialize)]
struct ExampleRecord<'a> {
    source:   &'a str,
    text:     &'a str,
    features: String,
}

// ─── BuildUseCase ─────────────────────────────────────────────────────────────
pub struct BuildUseCase {
    config: BuildConfig,
}

impl BuildUseCase {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<BuildOutput> {
        let cfg = &self.config;

        // ── Step 1: Glossary tables ───────────────────────────────────────────
        let store = GlossaryStore::new(
            cfg.glossary_path.as_ref().map(PathBuf::from),
            cfg.features_path.as_ref().map(PathBuf::from),
        );
        let mapper = GlossMapper::new(store.load()?);

        // ── Step 2: Tokenizer ─────────────────────────────────────────────────
        let tokenizer = BlankTokenizer::new(&cfg.lang)?;

        // ── Step 3: Load tables ───────────────────────────────────────────────
        tracing::info!("Loading '*{}' files from '{}'", cfg.suffix, cfg.data_dir);
        let loader = DocxTableLoader::new(&cfg.data_dir)
            .with_suffix(&cfg.suffix)
            .with_columns(&cfg.text_column, &cfg.gloss_column)
            .with_max_rows(cfg.max_rows);

        let mut load_diagnostics = Diagnostics::new();
        let tables = loader.load_all(&mut load_diagnostics)?;

        // ── Step 4: Build the corpus ──────────────────────────────────────────
        let mut output = DatasetBuilder::new(&mapper, &tokenizer).build(&tables);
        load_diagnostics.extend(output.diagnostics);
        output.diagnostics = load_diagnostics;

        // ── Step 5: Exports ───────────────────────────────────────────────────
        if let Some(dir) = &cfg.inspect_dir {
            write_inspection(Path::new(dir), &output)?;
        }
        if let Some(path) = &cfg.corpus_out {
            output.corpus.to_disk(Path::new(path))?;
            tracing::info!("Corpus written to '{}'", path);
        }

        Ok(output)
    }
}

/// Write the aligned pairs and accepted documents for manual review.
pub fn write_inspection(dir: &Path, output: &BuildOutput) -> Result<()> {
    write_jsonl(&dir.join(INSPECTION_FILE), &output.aligned)?;

    let examples: Vec<ExampleRecord> = output
        .corpus
        .docs()
        .iter()
        .map(|doc| ExampleRecord {
            source:   &doc.source,
            text:     &doc.text,
            features: doc.joined_morphs(),
        })
        .collect();
    write_jsonl(&dir.join(EXAMPLES_FILE), &examples)?;

    tracing::info!(
        "Inspection files written to '{}' ({} pairs, {} examples)",
        dir.display(),
        output.aligned.len(),
        examples.len()
    );
    Ok(())
}
