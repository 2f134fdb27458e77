// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn model and training code lives here. The data layer
// only supplies Dataset/Batcher glue; nothing above this layer
// touches tensors.
//
// What's in this layer:
//
//   vocab.rs   — Feature vocabulary (words + suffixes) and the
//                label set of full morph strings
//
//   model.rs   — The window tagger: embeddings of
//                [prev, word, next, suffix] → hidden layer →
//                one class per morph string
//
//   scorer.rs  — Exact-match and micro P/R/F scoring of
//                predicted morph strings
//
//   trainer.rs — BurnTrainer: per-fold training loop with Adam,
//                evaluation, saving, and CPU/GPU selection
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Feature and label vocabularies
pub mod vocab;

/// Window-based morphological tagger
pub mod model;

/// Morph string scoring
pub mod scorer;

/// Training loop and device selection
pub mod trainer;
