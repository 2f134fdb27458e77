// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates all the other layers to accomplish
// one user-facing goal per use case.
//
// Rules for this layer:
//   - No ML math or model code here
//   - No printing of results (that's Layer 1), except the
//     per-fold progress line
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// Corpus building and inspection exports
pub mod build_use_case;

// k-fold loop and run phases
pub mod fold_orchestrator;

// Single gloss lookup
pub mod gloss_use_case;

// The full cross-validation workflow
pub mod train_use_case;
