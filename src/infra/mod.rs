// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that touches the filesystem on behalf of the
// other layers:
//
//   checkpoint.rs      — ModelStore: saves and loads a trained
//                        tagger (weights via Burn's
//                        CompactRecorder, metadata and run
//                        config as JSON)
//
//   glossary_store.rs  — Loads the glossary and feature tables,
//                        from user files or the built-in
//                        defaults
//
//   metrics.rs         — Per-epoch CSV logging and per-fold
//                        metric accumulation
//
//   report.rs          — Writes results-<lang>.json
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Checkpointing)

/// Trained tagger persistence
pub mod checkpoint;

/// Glossary and feature lookup tables
pub mod glossary_store;

/// Training metrics CSV logger and fold averaging
pub mod metrics;

/// Cross-validation results file
pub mod report;
