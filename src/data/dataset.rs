use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::ml::vocab::{EncodedToken, CONTEXT_SLOTS};

/// One token ready for the tagger: its context feature ids and
/// the index of its gold morph label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSample {
    pub features: [u32; CONTEXT_SLOTS],
    pub label:    usize,
}

pub struct TaggerDataset {
    samples: Vec<TokenSample>,
}

impl TaggerDataset {
    /// Keep only tokens whose gold label is part of the label set;
    /// the loss is undefined for the others.
    pub fn from_encoded(tokens: &[EncodedToken]) -> Self {
        let samples = tokens
            .iter()
            .filter_map(|t| t.label.map(|label| TokenSample { features: t.features, label }))
            .collect();
        Self { samples }
    }
}

impl Dataset<TokenSample> for TaggerDataset {
    fn get(&self, index: usize) -> Option<TokenSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_encoded_drops_unlabelled() {
        let tokens = vec![
            EncodedToken { features: [0, 2, 3, 4], gold: "A=B".into(), label: Some(0) },
            EncodedToken { features: [2, 3, 0, 5], gold: "C=D".into(), label: None },
        ];
        let ds = TaggerDataset::from_encoded(&tokens);
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.get(0).unwrap().label, 0);
        assert!(ds.get(1).is_none());
    }
}
