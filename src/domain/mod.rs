// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs, enums, and traits describing the glossing
// pipeline: what an annotated table is, what an annotated
// document is, how a gloss maps to UD features, and which
// capabilities the outer layers must provide.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// The glossary tables live here as plain values. They are
// loaded by the infra layer and handed to the mapper at
// construction, so nothing in this layer holds global state.
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Annotated documents and their tokens
pub mod annotated;

// Raw annotated utterance tables as read from disk
pub mod table;

// Gloss string → UD feature conversion
pub mod gloss;

// Structured warnings collected while building a corpus
pub mod diagnostics;

// Core abstractions (traits) that other layers implement
pub mod traits;
