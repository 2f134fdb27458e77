// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates a full cross-validation run in order:
//
//   Step 1: Build the corpus from .docx tables   (BuildUseCase)
//   Step 2: Create the trainer for the device    (Layer 5 - ml)
//   Step 3: k-fold train + evaluate              (FoldOrchestrator)
//   Step 4: Average and write results            (Layer 6 - infra)
//   Step 5: Save the last trained model + config (Layer 6 - infra)
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::application::build_use_case::{BuildConfig, BuildUseCase};
use crate::application::fold_orchestrator::{FoldOrchestrator, Phase, RunState};
use crate::domain::traits::MorphTrainer;
use crate::infra::{
    checkpoint::ModelStore,
    report::{CrossValidationSummary, ResultsReporter},
};
use crate::ml::trainer::build_trainer;

/// Metrics averaged into results-<lang>.json unless overridden.
pub const DEFAULT_METRICS: [&str; 7] = [
    "token_acc",
    "pos_acc",
    "morph_acc",
    "tag_acc",
    "dep_uas",
    "dep_las",
    "morph_micro_f",
];

// ─── Training Configuration ──────────────────────────────────────────────────
// Saved as train_config.json next to the trained model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Input side: language, data directory, glossary and columns
    pub data: BuildConfig,

    /// Directory of a model saved by an earlier run
    pub base_model: Option<String>,

    pub n_folds: usize,
    pub shuffle: bool,
    pub seed:    Option<u64>,

    /// Negative selects the CPU backend
    pub gpu: i32,

    pub output_dir: String,
    pub models_dir: String,

    pub epochs:     usize,
    pub batch_size: usize,
    pub lr:         f64,

    /// Append per-epoch rows to <output_dir>/training_log.csv
    pub metrics_csv: bool,

    pub metrics: Vec<String>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data:        BuildConfig::default(),
            base_model:  None,
            n_folds:     5,
            shuffle:     false,
            seed:        None,
            gpu:         -1,
            output_dir:  "results".to_string(),
            models_dir:  "models".to_string(),
            epochs:      10,
            batch_size:  32,
            lr:          1e-3,
            metrics_csv: false,
            metrics:     DEFAULT_METRICS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl TrainConfig {
    pub fn lang(&self) -> &str {
        &self.data.lang
    }

    /// <models_dir>/<lang>_custom_glossing
    pub fn model_dir(&self) -> PathBuf {
        PathBuf::from(&self.models_dir).join(format!("{}_custom_glossing", self.lang()))
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Run with the burn tagger selected by the configured device.
    pub fn execute(&self) -> Result<CrossValidationSummary> {
        let mut trainer = build_trainer(&self.config)?;
        self.execute_with(trainer.as_mut())
    }

    /// Run with any trainer.
    pub fn execute_with(&self, trainer: &mut dyn MorphTrainer) -> Result<CrossValidationSummary> {
        let cfg       = &self.config;
        let mut state = RunState::new();

        // ── Step 1: Build the corpus ──────────────────────────────────────────
        state.advance(Phase::Building)?;
        let output = BuildUseCase::new(cfg.data.clone()).execute()?;
        if output.corpus.is_empty() {
            bail!(
                "No usable documents found in '{}' ({} diagnostics)",
                cfg.data.data_dir,
                output.diagnostics.len()
            );
        }
        let documents = output.corpus.len();
        tracing::info!(
            "Corpus ready: {} documents, {} skipped",
            documents,
            output.diagnostics.exclusions()
        );

        // ── Step 2 + 3: Cross-validate ────────────────────────────────────────
        let orchestrator = FoldOrchestrator::new(cfg.n_folds, cfg.metrics.clone())
            .with_shuffle(cfg.shuffle, cfg.seed);
        let metrics = orchestrator.run(&mut state, output.corpus.into_docs(), trainer)?;

        // ── Step 4: Report ────────────────────────────────────────────────────
        state.advance(Phase::Reporting)?;
        let summary = CrossValidationSummary {
            language:  cfg.lang().to_string(),
            n_folds:   metrics.fold_count(),
            documents,
            mean:      metrics.means(),
            per_fold:  metrics.per_fold().to_vec(),
        };
        ResultsReporter::new(&cfg.output_dir).write_summary(&summary)?;

        // ── Step 5: Persist the last fold's model ─────────────────────────────
        let model_dir = cfg.model_dir();
        trainer.save(&model_dir)?;
        ModelStore::new(&model_dir).save_config(cfg)?;
        tracing::info!("Model saved to '{}'", model_dir.display());

        state.advance(Phase::Done)?;
        Ok(summary)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::corpus::DocCorpus;
    use crate::data::loader::tests::write_table_docx;
    use crate::data::loader::{DEFAULT_GLOSS_COLUMN, DEFAULT_TEXT_COLUMN};
    use crate::domain::traits::{FoldSplit, Scores};
    use std::{fs, path::Path};

    /// Scores every fold with the share of its dev tokens glossed "_".
    struct PlaceholderTrainer;

    impl MorphTrainer for PlaceholderTrainer {
        fn train(&mut self, _split: &FoldSplit) -> Result<()> {
            Ok(())
        }

        fn evaluate(&self, split: &FoldSplit) -> Result<Scores> {
            let dev   = DocCorpus::from_disk(&split.dev_path)?;
            let total = dev.token_count() as f64;
            let hits  = dev.docs().iter().flat_map(|d| &d.tokens).filter(|t| t.morph == "_").count();
            Ok(Scores::from([("morph_acc".to_string(), hits as f64 / total)]))
        }

        fn save(&self, dir: &Path) -> Result<()> {
            fs::create_dir_all(dir)?;
            Ok(())
        }
    }

    fn config(root: &Path) -> TrainConfig {
        let data = root.join("data");
        fs::create_dir_all(&data).unwrap();
        write_table_docx(
            &data.join("a_annotated.docx"),
            &[DEFAULT_TEXT_COLUMN, DEFAULT_GLOSS_COLUMN],
            &[
                vec!["er", "he.XX"],
                vec!["sie", "she.F"],
                vec!["es", "it.XX"],
                vec!["der", "the.M"],
            ],
        );

        TrainConfig {
            data: BuildConfig {
                lang:     "de".into(),
                data_dir: data.to_str().unwrap().into(),
                ..Default::default()
            },
            n_folds:    2,
            output_dir: root.join("results").to_str().unwrap().into(),
            models_dir: root.join("models").to_str().unwrap().into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_run_writes_results_and_model() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let mut trainer = PlaceholderTrainer;

        let summary = TrainUseCase::new(cfg.clone()).execute_with(&mut trainer).unwrap();

        assert_eq!(summary.language, "de");
        assert_eq!(summary.n_folds, 2);
        assert_eq!(summary.documents, 4);
        // fold 1 dev = [er, sie] → 0.5, fold 2 dev = [es, der] → 0.5
        assert_eq!(summary.mean["morph_acc"], 0.5);
        assert_eq!(summary.mean["dep_las"], 0.0);
        assert_eq!(summary.mean.len(), DEFAULT_METRICS.len());

        assert!(dir.path().join("results").join("results-de.json").exists());
        let saved = ModelStore::new(cfg.model_dir()).load_config().unwrap();
        assert_eq!(saved.n_folds, 2);
        assert!(cfg.model_dir().ends_with("de_custom_glossing"));
    }

    #[test]
    fn test_empty_corpus_is_an_error() {
        let dir  = tempfile::tempdir().unwrap();
        let data = dir.path().join("empty");
        fs::create_dir_all(&data).unwrap();
        let cfg = TrainConfig {
            data: BuildConfig { data_dir: data.to_str().unwrap().into(), ..Default::default() },
            ..Default::default()
        };

        let mut trainer = PlaceholderTrainer;
        assert!(TrainUseCase::new(cfg).execute_with(&mut trainer).is_err());
    }
}
