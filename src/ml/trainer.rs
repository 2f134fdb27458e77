// ============================================================
// Layer 5 — Training Loop
// ============================================================
// BurnTrainer is the MorphTrainer the CLI ships with. Per fold:
//
//   train.jsonl ──► FeatureVocab + LabelSet ──► MorphTagger
//                        │                          │
//                        ▼                          ▼
//                  TaggerDataset ──► DataLoader ──► Adam steps
//                                                   │
//   dev.jsonl ─────────────────────────────────────►│ dev loss
//                                                   ▼ morph_acc
//
// Key Burn insight:
//   - Training runs on B (Autodiff<...>) for gradients
//   - model.valid() returns the model on B::InnerBackend
//   - The dev batcher must use B::InnerBackend as well
//
// Base model: the embedding table and feature vocabulary of a
// previously saved tagger are reused with gradients disabled;
// only the hidden layer and the output head are trained.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{bail, Context, Result};
use burn::{
    backend::{ndarray::NdArrayDevice, wgpu::WgpuDevice, Autodiff, NdArray, Wgpu},
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    nn::Embedding,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use std::path::Path;

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{feature_tensor, TokenBatcher},
    corpus::DocCorpus,
    dataset::TaggerDataset,
};
use crate::domain::gloss::NO_FEATURES;
use crate::domain::traits::{FoldSplit, MorphTrainer, Scores};
use crate::infra::{
    checkpoint::{ModelStore, TaggerMeta},
    metrics::{EpochMetrics, MetricsLogger},
};
use crate::ml::model::{MorphTagger, MorphTaggerConfig};
use crate::ml::scorer::{MorphScorer, MORPH_ACC};
use crate::ml::vocab::{encode_corpus, EncodedToken, FeatureVocab, LabelSet};

#[derive(Debug, Clone, Copy)]
pub struct TrainOptions {
    pub epochs:     usize,
    pub batch_size: usize,
    pub lr:         f64,
    /// Shuffle seed for the training data loader
    pub seed:       u64,
}

impl From<&TrainConfig> for TrainOptions {
    fn from(cfg: &TrainConfig) -> Self {
        Self {
            epochs:     cfg.epochs,
            batch_size: cfg.batch_size.max(1),
            lr:         cfg.lr,
            seed:       cfg.seed.unwrap_or(42),
        }
    }
}

/// Frozen pieces taken from a saved tagger.
struct BaseModel<B: AutodiffBackend> {
    embedding: Embedding<B>,
    vocab:     FeatureVocab,
    d_embed:   usize,
}

struct Trained<B: AutodiffBackend> {
    model: MorphTagger<B>,
    meta:  TaggerMeta,
}

pub struct BurnTrainer<B: AutodiffBackend> {
    device:   B::Device,
    language: String,
    options:  TrainOptions,
    base:     Option<BaseModel<B>>,
    logger:   Option<MetricsLogger>,
    trained:  Option<Trained<B>>,
}

impl<B: AutodiffBackend> BurnTrainer<B> {
    pub fn new(device: B::Device, language: impl Into<String>, options: TrainOptions) -> Self {
        Self {
            device,
            language: language.into(),
            options,
            base:     None,
            logger:   None,
            trained:  None,
        }
    }

    /// Warm-start every fold from a model directory written by `save`.
    pub fn with_base_model(mut self, dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let (model, meta) = ModelStore::new(dir)
            .load::<B>(&self.device)
            .with_context(|| format!("Cannot use '{}' as base model", dir.display()))?;

        tracing::info!(
            "Base model '{}': {} features, embedding frozen",
            dir.display(),
            meta.vocab.len()
        );
        self.base = Some(BaseModel {
            embedding: model.embedding.no_grad(),
            vocab:     meta.vocab,
            d_embed:   meta.config.d_embed,
        });
        Ok(self)
    }

    pub fn with_metrics_logger(mut self, logger: MetricsLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    fn init_model(&self, vocab: &FeatureVocab, labels: &LabelSet) -> (MorphTagger<B>, MorphTaggerConfig) {
        let mut config = MorphTaggerConfig::new(vocab.len(), labels.len());
        if let Some(base) = &self.base {
            config = config.with_d_embed(base.d_embed);
        }

        let mut model: MorphTagger<B> = config.init(&self.device);
        if let Some(base) = &self.base {
            model.embedding = base.embedding.clone();
        }
        (model, config)
    }
}

/// Predict every token in batches and score against its gold morph.
fn score_tokens<B: Backend>(
    model:      &MorphTagger<B>,
    tokens:     &[EncodedToken],
    labels:     &LabelSet,
    batch_size: usize,
    device:     &B::Device,
) -> MorphScorer {
    let mut scorer = MorphScorer::new();

    for chunk in tokens.chunks(batch_size.max(1)) {
        let rows: Vec<_> = chunk.iter().map(|t| t.features).collect();
        let predicted    = model.predict(feature_tensor::<B>(&rows, device));

        for (token, id) in chunk.iter().zip(predicted) {
            scorer.add(&token.gold, labels.label(id).unwrap_or(NO_FEATURES));
        }
    }
    scorer
}

impl<B: AutodiffBackend> MorphTrainer for BurnTrainer<B> {
    fn train(&mut self, split: &FoldSplit) -> Result<()> {
        let opts = self.options;

        // ── Vocabularies ──────────────────────────────────────────────────────
        let train_corpus = DocCorpus::from_disk(&split.train_path)?;
        let dev_corpus   = DocCorpus::from_disk(&split.dev_path)?;

        let vocab = match &self.base {
            Some(base) => base.vocab.clone(),
            None       => FeatureVocab::build(&train_corpus),
        };
        let labels = LabelSet::build(&train_corpus);
        if labels.is_empty() {
            bail!("Fold {} has no training tokens", split.fold);
        }

        // ── Build model ───────────────────────────────────────────────────────
        let (mut model, config) = self.init_model(&vocab, &labels);
        tracing::info!(
            "Fold {}: {} features, {} labels, d_embed={}",
            split.fold,
            vocab.len(),
            labels.len(),
            config.d_embed
        );

        let train_tokens = encode_corpus(&train_corpus, &vocab, &labels);
        let dev_tokens   = encode_corpus(&dev_corpus, &vocab, &labels);

        // ── Adam optimiser ────────────────────────────────────────────────────
        let mut optim = AdamConfig::new().with_epsilon(1e-8).init();

        // ── Data loaders ──────────────────────────────────────────────────────
        let train_loader = DataLoaderBuilder::new(TokenBatcher::<B>::new(self.device.clone()))
            .batch_size(opts.batch_size)
            .shuffle(opts.seed)
            .num_workers(1)
            .build(TaggerDataset::from_encoded(&train_tokens));

        // Dev tokens whose morph never occurred in training have no
        // label id; they are left out of the loss but not the scores
        let dev_loader = DataLoaderBuilder::new(TokenBatcher::<B::InnerBackend>::new(self.device.clone()))
            .batch_size(opts.batch_size)
            .num_workers(1)
            .build(TaggerDataset::from_encoded(&dev_tokens));

        // ── Epoch loop ────────────────────────────────────────────────────────
        for epoch in 1..=opts.epochs {
            let mut train_loss_sum = 0.0f64;
            let mut train_batches  = 0usize;

            for batch in train_loader.iter() {
                let loss = model.forward_loss(batch.inputs, batch.targets);

                train_loss_sum += loss.clone().into_scalar().elem::<f64>();
                train_batches  += 1;

                let grads = loss.backward();
                let grads = GradientsParams::from_grads(grads, &model);
                model = optim.step(opts.lr, model, grads);
            }

            // dropout disabled, no autodiff graph
            let model_valid = model.valid();

            let mut dev_loss_sum = 0.0f64;
            let mut dev_batches  = 0usize;
            for batch in dev_loader.iter() {
                dev_loss_sum += model_valid
                    .forward_loss(batch.inputs, batch.targets)
                    .into_scalar()
                    .elem::<f64>();
                dev_batches += 1;
            }

            let train_loss = if train_batches > 0 { train_loss_sum / train_batches as f64 } else { f64::NAN };
            let dev_loss   = if dev_batches   > 0 { dev_loss_sum   / dev_batches   as f64 } else { f64::NAN };
            let morph_acc  = score_tokens(&model_valid, &dev_tokens, &labels, opts.batch_size, &self.device)
                .scores()[MORPH_ACC];

            println!(
                "Fold {} | Epoch {:>3}/{} | train_loss={:.4} | dev_loss={:.4} | morph_acc={:.1}%",
                split.fold, epoch, opts.epochs, train_loss, dev_loss, morph_acc * 100.0,
            );

            if let Some(logger) = &self.logger {
                logger.log(&EpochMetrics::new(split.fold, epoch, train_loss, dev_loss, morph_acc))?;
            }
        }

        self.trained = Some(Trained {
            model,
            meta: TaggerMeta {
                language: self.language.clone(),
                config,
                vocab,
                labels,
            },
        });
        Ok(())
    }

    fn evaluate(&self, split: &FoldSplit) -> Result<Scores> {
        let trained = self
            .trained
            .as_ref()
            .context("No trained model to evaluate; call train first")?;

        let dev_corpus = DocCorpus::from_disk(&split.dev_path)?;
        let tokens = encode_corpus(&dev_corpus, &trained.meta.vocab, &trained.meta.labels);

        let scorer = score_tokens(
            &trained.model.valid(),
            &tokens,
            &trained.meta.labels,
            self.options.batch_size,
            &self.device,
        );
        tracing::debug!("Fold {}: scored {} dev tokens", split.fold, scorer.tokens());
        Ok(scorer.scores())
    }

    fn save(&self, dir: &Path) -> Result<()> {
        let trained = self
            .trained
            .as_ref()
            .context("No trained model to save; call train first")?;
        ModelStore::new(dir).save(&trained.model, &trained.meta)
    }
}

// ─── Device selection ─────────────────────────────────────────────────────────
/// CPU (NdArray) for a negative `gpu`, otherwise discrete GPU `gpu` via Wgpu.
pub fn build_trainer(cfg: &TrainConfig) -> Result<Box<dyn MorphTrainer>> {
    if cfg.gpu < 0 {
        tracing::info!("Using CPU (NdArray backend)");
        Ok(Box::new(configure::<Autodiff<NdArray>>(cfg, NdArrayDevice::Cpu)?))
    } else {
        let device = WgpuDevice::DiscreteGpu(cfg.gpu as usize);
        tracing::info!("Using WGPU device: {:?}", device);
        Ok(Box::new(configure::<Autodiff<Wgpu>>(cfg, device)?))
    }
}

fn configure<B: AutodiffBackend>(cfg: &TrainConfig, device: B::Device) -> Result<BurnTrainer<B>> {
    let mut trainer = BurnTrainer::<B>::new(device, cfg.lang(), TrainOptions::from(cfg));
    if let Some(base) = &cfg.base_model {
        trainer = trainer.with_base_model(base)?;
    }
    if cfg.metrics_csv {
        trainer = trainer.with_metrics_logger(MetricsLogger::new(&cfg.output_dir)?);
    }
    Ok(trainer)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::build_use_case::BuildConfig;
    use crate::domain::annotated::{AnnotatedDoc, MorphToken};
    use crate::ml::scorer::{MORPH_MICRO_F, TOKEN_ACC};

    type TestBackend = Autodiff<NdArray>;

    fn doc(pairs: &[(&str, &str)]) -> AnnotatedDoc {
        let text = pairs.iter().map(|(w, _)| *w).collect::<Vec<_>>().join(" ");
        AnnotatedDoc::new("t", text, pairs.iter().map(|(w, m)| MorphToken::new(*w, *m)).collect())
    }

    fn split(dir: &Path) -> FoldSplit {
        let train = DocCorpus::from_docs(vec![
            doc(&[("der", "Definite=Def"), ("hase", "Gender=Masc")]),
            doc(&[("die", "Definite=Def"), ("katze", "Gender=Fem")]),
            doc(&[("der", "Definite=Def"), ("hund", "Gender=Masc")]),
        ]);
        let dev = DocCorpus::from_docs(vec![doc(&[("der", "Definite=Def"), ("fuchs", "Gender=Masc")])]);

        let split = FoldSplit {
            fold:       1,
            n_folds:    2,
            train_path: dir.join("train.jsonl"),
            dev_path:   dir.join("dev.jsonl"),
            train_docs: train.len(),
            dev_docs:   dev.len(),
        };
        train.to_disk(&split.train_path).unwrap();
        dev.to_disk(&split.dev_path).unwrap();
        split
    }

    fn options() -> TrainOptions {
        TrainOptions { epochs: 2, batch_size: 4, lr: 1e-2, seed: 7 }
    }

    #[test]
    fn test_one_fold_trains_scores_and_saves() {
        let dir   = tempfile::tempdir().unwrap();
        let split = split(dir.path());

        let mut trainer = BurnTrainer::<TestBackend>::new(NdArrayDevice::Cpu, "de", options());
        let scores = trainer.fit(&split).unwrap();

        assert_eq!(scores[TOKEN_ACC], 1.0);
        assert!((0.0..=1.0).contains(&scores[MORPH_ACC]));
        assert!((0.0..=1.0).contains(&scores[MORPH_MICRO_F]));

        let model_dir = dir.path().join("de_custom_glossing");
        trainer.save(&model_dir).unwrap();

        // warm start from the saved model keeps its vocabulary
        let mut warm = BurnTrainer::<TestBackend>::new(NdArrayDevice::Cpu, "de", options())
            .with_base_model(&model_dir)
            .unwrap();
        warm.train(&split).unwrap();
        let saved = ModelStore::new(&model_dir).load_meta().unwrap();
        let meta  = &warm.trained.as_ref().unwrap().meta;
        assert_eq!(meta.vocab, saved.vocab);
    }

    #[test]
    fn test_base_model_embedding_is_not_updated() {
        let dir   = tempfile::tempdir().unwrap();
        let split = split(dir.path());
        let model_dir = dir.path().join("base");

        let mut base = BurnTrainer::<TestBackend>::new(NdArrayDevice::Cpu, "de", options());
        base.train(&split).unwrap();
        base.save(&model_dir).unwrap();

        let opts = TrainOptions { epochs: 5, ..options() };
        let mut warm = BurnTrainer::<TestBackend>::new(NdArrayDevice::Cpu, "de", opts)
            .with_base_model(&model_dir)
            .unwrap();
        let before = warm.base.as_ref().unwrap().embedding.weight.val().to_data();
        warm.train(&split).unwrap();

        let trained = warm.trained.as_ref().unwrap();
        trained.model.embedding.weight.val().to_data().assert_eq(&before, true);
        assert!(!trained.model.embedding.weight.is_require_grad());
    }

    #[test]
    fn test_negative_gpu_trains_on_cpu() {
        let dir   = tempfile::tempdir().unwrap();
        let split = split(dir.path());
        let cfg   = TrainConfig {
            data:       BuildConfig { lang: "de".into(), ..Default::default() },
            gpu:        -1,
            epochs:     2,
            batch_size: 4,
            ..Default::default()
        };

        let mut trainer = build_trainer(&cfg).unwrap();
        let scores = trainer.fit(&split).unwrap();
        assert_eq!(scores[TOKEN_ACC], 1.0);
    }

    #[test]
    fn test_evaluate_before_train_is_an_error() {
        let dir     = tempfile::tempdir().unwrap();
        let split   = split(dir.path());
        let trainer = BurnTrainer::<TestBackend>::new(NdArrayDevice::Cpu, "de", options());
        assert!(trainer.evaluate(&split).is_err());
        assert!(trainer.save(dir.path()).is_err());
    }

    #[test]
    fn test_metrics_logger_gets_one_row_per_epoch() {
        let dir   = tempfile::tempdir().unwrap();
        let split = split(dir.path());
        let log   = MetricsLogger::new(dir.path().join("out")).unwrap();

        let mut trainer = BurnTrainer::<TestBackend>::new(NdArrayDevice::Cpu, "de", options())
            .with_metrics_logger(log.clone());
        trainer.train(&split).unwrap();

        let csv = std::fs::read_to_string(log.csv_path()).unwrap();
        assert_eq!(csv.lines().count(), 1 + options().epochs);
    }
}
