// ============================================================
// Layer 6 — Model Store
// ============================================================
// Saves and restores a trained tagger with Burn's gzipped
// MessagePack recorder at full precision: a reloaded tagger (for
// instance a base model) has exactly the weights that were saved.
//
// What gets saved per model directory:
//   1. model.mpk.gz       — all learned parameters
//   2. tagger_meta.json   — architecture config, feature vocabulary,
//                           label set and language code
//   3. train_config.json  — the run configuration that produced it
//
// The weights alone are useless: rebuilding the tagger needs the
// exact MorphTaggerConfig, and decoding its output needs the label
// set in the same order it was trained with. tagger_meta.json
// carries both.
//
// Directory layout:
//   models/
//     gsw_custom_glossing/
//       model.mpk.gz
//       tagger_meta.json
//       train_config.json
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkGzFileRecorder, Recorder},
};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::{MorphTagger, MorphTaggerConfig};
use crate::ml::vocab::{FeatureVocab, LabelSet};

const WEIGHTS_FILE: &str = "model";
const META_FILE:    &str = "tagger_meta.json";
const CONFIG_FILE:  &str = "train_config.json";

type WeightsRecorder = NamedMpkGzFileRecorder<FullPrecisionSettings>;

/// Everything besides the weights that is needed to use a tagger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggerMeta {
    pub language: String,
    pub config:   MorphTaggerConfig,
    pub vocab:    FeatureVocab,
    pub labels:   LabelSet,
}

/// Reads and writes one model directory.
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Save weights and metadata, creating the directory if needed.
    pub fn save<B: Backend>(&self, model: &MorphTagger<B>, meta: &TaggerMeta) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create model directory '{}'", self.dir.display()))?;

        // Recorder adds its own extension
        let path = self.dir.join(WEIGHTS_FILE);
        WeightsRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save model weights to '{}'", path.display()))?;

        let meta_path = self.dir.join(META_FILE);
        fs::write(&meta_path, serde_json::to_string_pretty(meta)?)
            .with_context(|| format!("Cannot write '{}'", meta_path.display()))?;

        tracing::debug!("Saved tagger to '{}'", self.dir.display());
        Ok(())
    }

    pub fn load_meta(&self) -> Result<TaggerMeta> {
        let path = self.dir.join(META_FILE);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read '{}'. Is this a model directory written by 'train'?",
                path.display()
            )
        })?;
        serde_json::from_str(&json)
            .with_context(|| format!("Malformed tagger metadata in '{}'", path.display()))
    }

    /// Rebuild the tagger from its metadata and load the weights into it.
    pub fn load<B: Backend>(&self, device: &B::Device) -> Result<(MorphTagger<B>, TaggerMeta)> {
        let meta  = self.load_meta()?;
        let model = meta.config.init::<B>(device);

        let path   = self.dir.join(WEIGHTS_FILE);
        let record = WeightsRecorder::new()
            .load(path.clone(), device)
            .with_context(|| format!("Cannot load model weights '{}'", path.display()))?;

        tracing::info!(
            "Loaded '{}' tagger from '{}' ({} labels)",
            meta.language,
            self.dir.display(),
            meta.labels.len()
        );
        Ok((model.load_record(record), meta))
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(CONFIG_FILE);
        fs::write(&path, serde_json::to_string_pretty(cfg)?)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    #[cfg(test)]
    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join(CONFIG_FILE);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read config from '{}'", path.display()))?;
        Ok(serde_json::from_str(&json)?)
    }
}
