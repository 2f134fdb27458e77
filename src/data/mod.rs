// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from annotated .docx tables to tagger-ready
// tensor batches:
//
//   *annotated.docx
//       │
//       ▼
//   DocxTableLoader   → raw text/gloss cells per row
//       │
//       ▼
//   Cleaner           → normalised, line-aligned utterances
//       │
//       ▼
//   BlankTokenizer    → tokens
//   GlossMapper       → per-token UD features
//       │
//       ▼
//   DatasetBuilder    → DocCorpus (+ diagnostics)
//       │
//       ▼
//   folds             → k train/dev splits
//       │
//       ▼
//   TaggerDataset     → implements Burn's Dataset trait
//       │
//       ▼
//   TokenBatcher      → stacks samples into tensor batches
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Reads annotated tables from .docx files
pub mod loader;

/// Cleans and aligns raw transcription / gloss cells
pub mod cleaner;

/// Whitespace + punctuation word tokenizer
pub mod tokenizer;

/// Builds the annotated corpus from loaded tables
pub mod builder;

/// In-memory corpus and its JSON-lines form
pub mod corpus;

/// K-fold partitioning and shuffling
pub mod folds;

/// Implements Burn's Dataset trait for token samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
