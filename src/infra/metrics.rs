// ============================================================
// Layer 6 — Metrics
// ============================================================
// Two kinds of numbers come out of a training run:
//
//   1. Per-epoch training curves (EpochMetrics / MetricsLogger)
//      appended to a CSV so learning curves can be plotted:
//
//        fold,epoch,train_loss,dev_loss,morph_acc
//        1,1,2.314500,2.101200,0.412000
//        1,2,1.806100,1.744300,0.538000
//
//   2. Per-fold evaluation scores (MetricsAccumulator), one list
//      per metric name, averaged once all folds are done.
//
// How to read the curves:
//   - dev_loss rising while train_loss falls → overfitting
//   - morph_acc flat from epoch 1 → learning rate too low, or
//     the label set is dominated by "_" / "" placeholders
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (I/O and File Handling)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};

use crate::domain::traits::Scores;

/// One row of training-curve data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// 1-based fold number
    pub fold: usize,

    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Average cross-entropy over training batches
    pub train_loss: f64,

    /// Average cross-entropy over dev batches (NaN when the dev
    /// split has no token with a label seen in training)
    pub dev_loss: f64,

    /// Exact-match accuracy of the morph string on dev tokens
    pub morph_acc: f64,
}

impl EpochMetrics {
    pub fn new(fold: usize, epoch: usize, train_loss: f64, dev_loss: f64, morph_acc: f64) -> Self {
        Self { fold, epoch, train_loss, dev_loss, morph_acc }
    }
}

/// Appends epoch metrics to a CSV file.
#[derive(Debug, Clone)]
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("training_log.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "fold,epoch,train_loss,dev_loss,morph_acc")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(
            f,
            "{},{},{:.6},{:.6},{:.6}",
            m.fold,
            m.epoch,
            m.train_loss,
            m.dev_loss,
            m.morph_acc,
        )?;
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

/// Arithmetic mean; an empty slice averages to 0.0.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Collects one value per configured metric per fold.
#[derive(Debug, Clone, Default)]
pub struct MetricsAccumulator {
    values: BTreeMap<String, Vec<f64>>,
    folds:  Vec<Scores>,
}

impl MetricsAccumulator {
    pub fn new<S: AsRef<str>>(metric_names: &[S]) -> Self {
        let values = metric_names
            .iter()
            .map(|name| (name.as_ref().to_string(), Vec::new()))
            .collect();
        Self { values, folds: Vec::new() }
    }

    /// Record one fold. Configured metrics missing from `scores`
    /// count as 0.0; extra entries are ignored.
    pub fn record(&mut self, scores: &Scores) {
        let mut kept = Scores::new();
        for (name, list) in self.values.iter_mut() {
            let v = scores.get(name).copied().unwrap_or(0.0);
            list.push(v);
            kept.insert(name.clone(), v);
        }
        self.folds.push(kept);
    }

    pub fn fold_count(&self) -> usize {
        self.folds.len()
    }

    /// Per-fold scores restricted to the configured metrics.
    pub fn per_fold(&self) -> &[Scores] {
        &self.folds
    }

    pub fn means(&self) -> Scores {
        self.values
            .iter()
            .map(|(name, list)| (name.clone(), mean(list)))
            .collect()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_of_fold_metrics() {
        assert_eq!(mean(&[1.0, 0.0, 0.5]), 0.5);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_missing_metrics_count_as_zero() {
        let mut acc = MetricsAccumulator::new(&["morph_acc", "dep_las"]);
        acc.record(&Scores::from([("morph_acc".to_string(), 1.0)]));
        acc.record(&Scores::from([
            ("morph_acc".to_string(), 0.0),
            ("dep_las".to_string(),   0.6),
        ]));
        acc.record(&Scores::from([
            ("morph_acc".to_string(), 0.5),
            ("extra".to_string(),     9.0),
        ]));

        let means = acc.means();
        assert_eq!(means["morph_acc"], 0.5);
        assert!((means["dep_las"] - 0.2).abs() < 1e-12);
        assert!(!means.contains_key("extra"));
        assert_eq!(acc.fold_count(), 3);
        assert_eq!(acc.per_fold()[0]["dep_las"], 0.0);
    }

    #[test]
    fn test_logger_appends_rows() {
        let dir    = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path()).unwrap();
        logger.log(&EpochMetrics::new(1, 1, 2.0, 1.5, 0.25)).unwrap();
        logger.log(&EpochMetrics::new(1, 2, 1.0, 1.2, 0.5)).unwrap();

        let csv = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "fold,epoch,train_loss,dev_loss,morph_acc");
        assert_eq!(lines[2], "1,2,1.000000,1.200000,0.500000");
    }
}
