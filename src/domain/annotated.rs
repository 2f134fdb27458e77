// ============================================================
// Layer 3 — Annotated Document Domain Type
// ============================================================
// One accepted utterance: the cleaned transcription split into
// tokens, each token carrying the UD feature string derived
// from its gloss.
//
// A morph string is one of:
//   "Gender=Masc|Number=Sing"  → mapped features
//   "_"                        → glossed, but nothing mapped
//   ""                         → token had no gloss codes
//
// Reference: Rust Book §5 (Structs and Methods)

use serde::{Deserialize, Serialize};

/// A single token with its gold morphological annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MorphToken {
    pub text:  String,
    pub morph: String,
}

impl MorphToken {
    pub fn new(text: impl Into<String>, morph: impl Into<String>) -> Self {
        Self { text: text.into(), morph: morph.into() }
    }
}

/// Iterate the individual `name=value` pairs of a morph string.
/// Placeholders ("_" and "") yield nothing.
pub fn morph_pairs(morph: &str) -> impl Iterator<Item = &str> {
    morph
        .split('|')
        .filter(|p| !p.is_empty() && *p != "_")
}

/// A tokenised, feature-annotated utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedDoc {
    /// File the utterance came from
    pub source: String,

    /// The cleaned utterance text as fed to the tokenizer
    pub text: String,

    /// Tokens in text order, one per gloss token
    pub tokens: Vec<MorphToken>,
}

impl AnnotatedDoc {
    pub fn new(
        source: impl Into<String>,
        text:   impl Into<String>,
        tokens: Vec<MorphToken>,
    ) -> Self {
        Self {
            source: source.into(),
            text:   text.into(),
            tokens,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The per-token feature strings joined by spaces,
    /// mirroring the layout of the gloss line they came from.
    pub fn joined_morphs(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.morph.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
