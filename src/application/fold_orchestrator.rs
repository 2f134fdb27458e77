// ============================================================
// Layer 2 — Fold Orchestrator
// ============================================================
// Runs k-fold cross-validation over a built corpus.
//
// A training run moves through these phases:
//
//   Idle → Building → Folding → { Training → Evaluating } × k
//        → Reporting → Done
//
// The use case owns Building and Reporting; this module owns
// Folding and the per-fold Training/Evaluating loop. Every
// transition goes through RunState, which refuses anything not
// on the path above.
//
// Per fold i:
//   1. training set = every fold but i, dev set = fold i
//   2. both written as JSON lines into a fresh temp directory
//   3. trainer.train(split), then trainer.evaluate(split)
//   4. scores recorded, temp directory removed
//
// Any error ends the run; nothing is retried.
//
// Reference: Rust Book §17 (State Pattern)
//            tempfile crate documentation

use anyhow::{Context, Result};
use thiserror::Error;

use crate::data::{
    corpus::DocCorpus,
    folds::{partition, shuffle, training_set},
};
use crate::domain::annotated::AnnotatedDoc;
use crate::domain::traits::{FoldSplit, MorphTrainer};
use crate::infra::metrics::MetricsAccumulator;

// ─── Phase ────────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Building,
    Folding,
    Training,
    Evaluating,
    Reporting,
    Done,
}

impl Phase {
    fn can_advance_to(self, next: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, next),
            (Idle, Building)
                | (Building, Folding)
                | (Folding, Training)
                | (Training, Evaluating)
                | (Evaluating, Training)
                | (Evaluating, Reporting)
                | (Reporting, Done)
        )
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("internal error: illegal phase transition {from:?} -> {to:?}")]
pub struct IllegalTransition {
    pub from: Phase,
    pub to:   Phase,
}

/// Current phase of a run plus every phase it went through.
#[derive(Debug, Clone)]
pub struct RunState {
    phase:   Phase,
    history: Vec<Phase>,
}

impl RunState {
    pub fn new() -> Self {
        Self { phase: Phase::Idle, history: vec![Phase::Idle] }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn history(&self) -> &[Phase] {
        &self.history
    }

    pub fn advance(&mut self, next: Phase) -> Result<(), IllegalTransition> {
        if !self.phase.can_advance_to(next) {
            return Err(IllegalTransition { from: self.phase, to: next });
        }
        tracing::debug!("Phase {:?} -> {:?}", self.phase, next);
        self.phase = next;
        self.history.push(next);
        Ok(())
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

// ─── FoldOrchestrator ─────────────────────────────────────────────────────────
pub struct FoldOrchestrator {
    n_folds:      usize,
    shuffle:      bool,
    seed:         Option<u64>,
    metric_names: Vec<String>,
}

impl FoldOrchestrator {
    pub fn new(n_folds: usize, metric_names: Vec<String>) -> Self {
        Self { n_folds, shuffle: false, seed: None, metric_names }
    }

    /// Shuffle the documents before partitioning. Without a seed
    /// the order comes from thread entropy.
    pub fn with_shuffle(mut self, shuffle: bool, seed: Option<u64>) -> Self {
        self.shuffle = shuffle;
        self.seed    = seed;
        self
    }

    /// Cross-validate `trainer` on `docs`. Expects `state` to be in
    /// Building and leaves it in Evaluating after the last fold.
    pub fn run(
        &self,
        state:   &mut RunState,
        docs:    Vec<AnnotatedDoc>,
        trainer: &mut dyn MorphTrainer,
    ) -> Result<MetricsAccumulator> {
        state.advance(Phase::Folding)?;

        let mut docs = docs;
        if self.shuffle {
            shuffle(&mut docs, self.seed);
        }
        let folds = partition(docs, self.n_folds)?;

        let mut metrics = MetricsAccumulator::new(self.metric_names.as_slice());

        for i in 0..folds.len() {
            state.advance(Phase::Training)?;

            let train = DocCorpus::from_docs(training_set(&folds, i));
            let dev   = DocCorpus::from_docs(folds[i].clone());

            // Dropped at the end of the iteration, which deletes the files
            let scratch = tempfile::tempdir()
                .context("Cannot create temporary directory for fold data")?;
            let split = FoldSplit {
                fold:       i + 1,
                n_folds:    folds.len(),
                train_path: scratch.path().join("train.jsonl"),
                dev_path:   scratch.path().join("dev.jsonl"),
                train_docs: train.len(),
                dev_docs:   dev.len(),
            };
            train.to_disk(&split.train_path)?;
            dev.to_disk(&split.dev_path)?;

            println!(
                "Fold {}/{}: {} train docs, {} dev docs",
                split.fold, split.n_folds, split.train_docs, split.dev_docs
            );

            trainer
                .train(&split)
                .with_context(|| format!("Training failed on fold {}", split.fold))?;

            state.advance(Phase::Evaluating)?;
            let scores = trainer
                .evaluate(&split)
                .with_context(|| format!("Evaluation failed on fold {}", split.fold))?;

            tracing::info!("Fold {} scores: {:?}", split.fold, scores);
            metrics.record(&scores);
        }

        Ok(metrics)
    }
}
