// ============================================================
// Layer 5 — Tagger Vocabularies
// ============================================================
// Maps the symbolic side of the corpus to integer ids:
//
//   FeatureVocab — word forms and 3-char suffixes → embedding row
//   LabelSet     — full morph strings ("Gender=Masc|Number=Sing")
//                  → output class
//
// Each token is described by four feature ids:
//
//   [previous word, word, next word, suffix]
//
// Edges of the utterance use PAD; forms never seen during
// training use UNK. Both vocabularies keep first-seen order so
// the same training split always yields the same ids.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data::corpus::DocCorpus;
use crate::domain::annotated::AnnotatedDoc;

pub const PAD_ID: u32 = 0;
pub const UNK_ID: u32 = 1;

/// Number of feature ids describing one token.
pub const CONTEXT_SLOTS: usize = 4;

const SUFFIX_LEN: usize = 3;

/// Insertion-ordered string ↔ id table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
struct Interner {
    items: Vec<String>,
    index: HashMap<String, usize>,
}

impl Interner {
    fn insert(&mut self, s: &str) -> usize {
        if let Some(&id) = self.index.get(s) {
            return id;
        }
        let id = self.items.len();
        self.items.push(s.to_string());
        self.index.insert(s.to_string(), id);
        id
    }

    fn get(&self, s: &str) -> Option<usize> {
        self.index.get(s).copied()
    }
}

impl From<Vec<String>> for Interner {
    fn from(items: Vec<String>) -> Self {
        let mut interner = Interner::default();
        for item in &items {
            interner.insert(item);
        }
        interner
    }
}

impl From<Interner> for Vec<String> {
    fn from(interner: Interner) -> Self {
        interner.items
    }
}

fn suffix_key(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    let start = chars.len().saturating_sub(SUFFIX_LEN);
    format!("suf:{}", chars[start..].iter().collect::<String>())
}

// ─── FeatureVocab ─────────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVocab {
    entries: Interner,
}

impl FeatureVocab {
    pub fn build(corpus: &DocCorpus) -> Self {
        let mut entries = Interner::default();
        entries.insert("<pad>");
        entries.insert("<unk>");
        for doc in corpus.docs() {
            for token in &doc.tokens {
                entries.insert(&token.text);
                entries.insert(&suffix_key(&token.text));
            }
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 2
    }

    pub fn id(&self, key: &str) -> u32 {
        self.entries.get(key).map(|i| i as u32).unwrap_or(UNK_ID)
    }

    /// The four feature ids of token `i` in `doc`.
    pub fn token_features(&self, doc: &AnnotatedDoc, i: usize) -> [u32; CONTEXT_SLOTS] {
        let word = |j: usize| self.id(&doc.tokens[j].text);
        let prev = if i == 0 { PAD_ID } else { word(i - 1) };
        let next = if i + 1 < doc.tokens.len() { word(i + 1) } else { PAD_ID };
        [prev, word(i), next, self.id(&suffix_key(&doc.tokens[i].text))]
    }
}

// ─── LabelSet ─────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSet {
    labels: Interner,
}

impl LabelSet {
    pub fn build(corpus: &DocCorpus) -> Self {
        let mut labels = Interner::default();
        for doc in corpus.docs() {
            for token in &doc.tokens {
                labels.insert(&token.morph);
            }
        }
        Self { labels }
    }

    pub fn len(&self) -> usize {
        self.labels.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.items.is_empty()
    }

    pub fn id(&self, morph: &str) -> Option<usize> {
        self.labels.get(morph)
    }

    pub fn label(&self, id: usize) -> Option<&str> {
        self.labels.items.get(id).map(String::as_str)
    }
}

// ─── Encoding ─────────────────────────────────────────────────────────────────
/// One corpus token in model form, with its gold annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedToken {
    pub features: [u32; CONTEXT_SLOTS],
    pub gold:     String,
    /// None when the gold morph string never occurred in training
    pub label:    Option<usize>,
}

pub fn encode_corpus(corpus: &DocCorpus, vocab: &FeatureVocab, labels: &LabelSet) -> Vec<EncodedToken> {
    corpus
        .docs()
        .iter()
        .flat_map(|doc| {
            (0..doc.tokens.len()).map(move |i| EncodedToken {
                features: vocab.token_features(doc, i),
                gold:     doc.tokens[i].morph.clone(),
                label:    labels.id(&doc.tokens[i].morph),
            })
        })
        .collect()
}
