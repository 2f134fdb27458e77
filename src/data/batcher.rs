// ============================================================
// Layer 4 — Token Batcher
// ============================================================
// Implements Burn's Batcher trait to stack TokenSamples into
// tensors for the tagger.
//
//   Input:  Vec of N TokenSamples, each with 4 feature ids
//   Output: TokenBatch
//             inputs  [N, 4]  Int
//             targets [N]     Int
//
// Every sample has the same number of feature ids, so the ids
// are flattened and reshaped without any padding.
//
// Reference: Burn Book §4 (Batcher)

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::TokenSample;
use crate::ml::vocab::CONTEXT_SLOTS;

#[derive(Debug, Clone)]
pub struct TokenBatch<B: Backend> {
    /// Feature ids, shape [batch_size, CONTEXT_SLOTS]
    pub inputs: Tensor<B, 2, Int>,

    /// Gold label indices, shape [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

#[derive(Clone, Debug)]
pub struct TokenBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> TokenBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

/// Build an [N, CONTEXT_SLOTS] input tensor from raw feature rows.
pub fn feature_tensor<B: Backend>(
    rows:   &[[u32; CONTEXT_SLOTS]],
    device: &B::Device,
) -> Tensor<B, 2, Int> {
    let flat: Vec<i32> = rows
        .iter()
        .flat_map(|row| row.iter().map(|&id| id as i32))
        .collect();

    Tensor::<B, 1, Int>::from_ints(flat.as_slice(), device)
        .reshape([rows.len(), CONTEXT_SLOTS])
}

impl<B: Backend> Batcher<TokenSample, TokenBatch<B>> for TokenBatcher<B> {
    fn batch(&self, items: Vec<TokenSample>) -> TokenBatch<B> {
        let rows: Vec<[u32; CONTEXT_SLOTS]> = items.iter().map(|s| s.features).collect();
        let labels: Vec<i32> = items.iter().map(|s| s.label as i32).collect();

        let inputs  = feature_tensor::<B>(&rows, &self.device);
        let targets = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        TokenBatch { inputs, targets }
    }
}
