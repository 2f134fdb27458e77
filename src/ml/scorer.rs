// ============================================================
// Layer 5 — Morphology Scorer
// ============================================================
// Compares predicted and gold morph strings token by token.
//
//   morph_acc      exact match of the whole feature string
//   morph_micro_*  precision / recall / F1 over individual
//                  name=value pairs, pooled across all tokens
//   token_acc      tokenisation accuracy; gold and predicted
//                  tokens come from the same tokenizer, so this
//                  is 1.0 whenever there is anything to score
//
// Placeholders ("_" and "") carry no pairs: predicting "_" for
// a token glossed "_" counts for morph_acc but adds nothing to
// the micro scores.

use std::collections::BTreeSet;

use crate::domain::annotated::morph_pairs;
use crate::domain::traits::Scores;

pub const TOKEN_ACC:     &str = "token_acc";
pub const MORPH_ACC:     &str = "morph_acc";
pub const MORPH_MICRO_P: &str = "morph_micro_p";
pub const MORPH_MICRO_R: &str = "morph_micro_r";
pub const MORPH_MICRO_F: &str = "morph_micro_f";

fn pairs(morph: &str) -> BTreeSet<&str> {
    morph_pairs(morph).collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MorphScorer {
    tokens: usize,
    exact:  usize,
    tp:     usize,
    fp:     usize,
    fn_:    usize,
}

impl MorphScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, gold: &str, predicted: &str) {
        self.tokens += 1;
        if gold == predicted {
            self.exact += 1;
        }

        let g = pairs(gold);
        let p = pairs(predicted);
        let hit = g.intersection(&p).count();
        self.tp  += hit;
        self.fp  += p.len() - hit;
        self.fn_ += g.len() - hit;
    }

    pub fn tokens(&self) -> usize {
        self.tokens
    }

    pub fn scores(&self) -> Scores {
        let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };

        let precision = ratio(self.tp, self.tp + self.fp);
        let recall    = ratio(self.tp, self.tp + self.fn_);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Scores::from([
            (TOKEN_ACC.to_string(),     if self.tokens > 0 { 1.0 } else { 0.0 }),
            (MORPH_ACC.to_string(),     ratio(self.exact, self.tokens)),
            (MORPH_MICRO_P.to_string(), precision),
            (MORPH_MICRO_R.to_string(), recall),
            (MORPH_MICRO_F.to_string(), f1),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_exact_match_accuracy() {
        let mut s = MorphScorer::new();
        s.add("Gender=Masc|Number=Sing", "Gender=Masc|Number=Sing");
        s.add("Case=Nom", "Case=Acc");
        let scores = s.scores();
        assert!(approx(scores[MORPH_ACC], 0.5));
        assert!(approx(scores[TOKEN_ACC], 1.0));
    }

    #[test]
    fn test_micro_scores_count_pairs() {
        let mut s = MorphScorer::new();
        // gold 2 pairs, predicted 2 pairs, 1 shared
        s.add("Gender=Masc|Number=Sing", "Number=Sing|Case=Nom");
        let scores = s.scores();
        assert!(approx(scores[MORPH_MICRO_P], 0.5));
        assert!(approx(scores[MORPH_MICRO_R], 0.5));
        assert!(approx(scores[MORPH_MICRO_F], 0.5));
    }

    #[test]
    fn test_placeholders_have_no_pairs() {
        let mut s = MorphScorer::new();
        s.add("_", "_");
        s.add("", "");
        let scores = s.scores();
        assert!(approx(scores[MORPH_ACC], 1.0));
        assert!(approx(scores[MORPH_MICRO_F], 0.0));
    }

    #[test]
    fn test_empty_scorer_is_all_zero() {
        let scores = MorphScorer::new().scores();
        assert!(scores.values().all(|v| *v == 0.0));
    }
}
