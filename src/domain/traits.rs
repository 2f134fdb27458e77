// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application layer only ever talks to these traits:
//
//   TableSource  — where annotated utterance tables come from
//                  (DocxTableLoader reads .docx tables)
//   MorphTrainer — who fits and scores a morphological tagger
//                  for one fold (BurnTrainer is the shipped one)
//
// Swapping the ML backend or the input format means writing a
// new implementation, never touching the fold orchestration.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)
//            Rust Book §17 (Object Oriented Patterns)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::domain::diagnostics::Diagnostics;
use crate::domain::table::AnnotatedTable;

/// Named evaluation scores for one fold, e.g. "morph_acc" → 0.91.
pub type Scores = BTreeMap<String, f64>;

// ─── TableSource ──────────────────────────────────────────────────────────────
/// Any component that can load annotated utterance tables.
///
/// Files that cannot be used are reported through `diagnostics`
/// and skipped; only an unusable source as a whole is an error.
pub trait TableSource {
    fn load_all(&self, diagnostics: &mut Diagnostics) -> Result<Vec<AnnotatedTable>>;
}

// ─── FoldSplit ────────────────────────────────────────────────────────────────
/// The serialized train/dev corpora of one cross-validation fold.
#[derive(Debug, Clone)]
pub struct FoldSplit {
    /// 1-based fold number, as shown to the user
    pub fold: usize,

    /// Total number of folds in the run
    pub n_folds: usize,

    pub train_path: PathBuf,
    pub dev_path:   PathBuf,

    pub train_docs: usize,
    pub dev_docs:   usize,
}

// ─── MorphTrainer ─────────────────────────────────────────────────────────────
/// Capability to fit a tagger on a fold and score it on the dev set.
///
/// Each `train` call starts from scratch (or from the configured
/// base model); nothing carries over between folds. `save`
/// persists whatever the most recent `train` produced.
pub trait MorphTrainer {
    fn train(&mut self, split: &FoldSplit) -> Result<()>;

    fn evaluate(&self, split: &FoldSplit) -> Result<Scores>;

    fn save(&self, dir: &Path) -> Result<()>;

    /// Train, then evaluate on the same split's dev corpus.
    fn fit(&mut self, split: &FoldSplit) -> Result<Scores> {
        self.train(split)?;
        self.evaluate(split)
    }
}
