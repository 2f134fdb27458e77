// ============================================================
// Layer 5 — Morph Tagger Model
// ============================================================
// A window classifier over the four feature ids of a token:
//
//   [prev, word, next, suffix]  → Embedding   [batch, 4, d_embed]
//                               → flatten     [batch, 4·d_embed]
//                               → Linear+ReLU [batch, d_hidden]
//                               → Dropout
//                               → Linear      [batch, n_labels]
//
// Each output class is one full morph string, so predicting a
// token's features is a single argmax.
//
// Reference: Burn Book §3 (Building Blocks)

use burn::{
    nn::{
        loss::CrossEntropyLossConfig,
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::relu,
};

use crate::ml::vocab::CONTEXT_SLOTS;

// #[derive(Config)] already provides Clone and serde impls.
#[derive(Config, Debug)]
pub struct MorphTaggerConfig {
    pub vocab_size: usize,
    pub n_labels:   usize,
    #[config(default = 64)]
    pub d_embed:    usize,
    #[config(default = 128)]
    pub d_hidden:   usize,
    #[config(default = 0.2)]
    pub dropout:    f64,
}

impl MorphTaggerConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> MorphTagger<B> {
        let embedding = EmbeddingConfig::new(self.vocab_size, self.d_embed).init(device);
        let hidden    = LinearConfig::new(CONTEXT_SLOTS * self.d_embed, self.d_hidden).init(device);
        let output    = LinearConfig::new(self.d_hidden, self.n_labels).init(device);
        let dropout   = DropoutConfig::new(self.dropout).init();
        MorphTagger { embedding, hidden, output, dropout }
    }
}

/// Window tagger: embeds the [prev, word, next, suffix] ids of a
/// token, concatenates them, and classifies the token's full
/// morph string through one hidden layer.
#[derive(Module, Debug)]
pub struct MorphTagger<B: Backend> {
    pub embedding: Embedding<B>,
    pub hidden:    Linear<B>,
    pub output:    Linear<B>,
    pub dropout:   Dropout,
}

impl<B: Backend> MorphTagger<B> {
    /// inputs: [batch, CONTEXT_SLOTS] → logits: [batch, n_labels]
    pub fn forward(&self, inputs: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        let [batch_size, slots] = inputs.dims();

        let x = self.embedding.forward(inputs);          // [batch, slots, d_embed]
        let [_, _, d_embed] = x.dims();
        let x = x.reshape([batch_size, slots * d_embed]);

        let x = self.dropout.forward(relu(self.hidden.forward(x)));
        self.output.forward(x)
    }

    /// Predicted label index per row.
    pub fn predict(&self, inputs: Tensor<B, 2, Int>) -> Vec<usize> {
        self.forward(inputs)
            .argmax(1)
            .flatten::<1>(0, 1)
            .into_data()
            .iter::<i64>()
            .map(|i| i as usize)
            .collect()
    }

    /// Cross-entropy against gold labels. Used for the training
    /// step and, on the inner backend, for the dev loss.
    pub fn forward_loss(
        &self,
        inputs:  Tensor<B, 2, Int>,
        targets: Tensor<B, 1, Int>,
    ) -> Tensor<B, 1> {
        let logits = self.forward(inputs);
        CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits, targets)
    }
}
