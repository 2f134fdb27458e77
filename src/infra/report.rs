// ============================================================
// Layer 6 — Results Reporter
// ============================================================
// Writes the cross-validation summary of one run:
//
//   results/results-gsw.json
//   {
//     "language": "gsw",
//     "n_folds": 5,
//     "documents": 412,
//     "mean":     { "morph_acc": 0.71, ... },
//     "per_fold": [ { "morph_acc": 0.69, ... }, ... ]
//   }
//
// Reference: serde_json documentation

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
};

use crate::domain::traits::Scores;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidationSummary {
    pub language:  String,
    pub n_folds:   usize,
    pub documents: usize,
    pub mean:      Scores,
    pub per_fold:  Vec<Scores>,
}

pub struct ResultsReporter {
    output_dir: PathBuf,
}

impl ResultsReporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self { output_dir: output_dir.into() }
    }

    pub fn results_path(&self, language: &str) -> PathBuf {
        self.output_dir.join(format!("results-{language}.json"))
    }

    /// Write the summary as pretty JSON and return where it went.
    pub fn write_summary(&self, summary: &CrossValidationSummary) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("Cannot create output directory '{}'", self.output_dir.display())
        })?;

        let path = self.results_path(&summary.language);
        fs::write(&path, serde_json::to_string_pretty(summary)?)
            .with_context(|| format!("Cannot write results to '{}'", path.display()))?;

        tracing::info!("Results written to '{}'", path.display());
        Ok(path)
    }

    #[cfg(test)]
    pub fn read_summary(path: &std::path::Path) -> Result<CrossValidationSummary> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }
}
