// ============================================================
// Layer 4 — Blank Tokenizer
// ============================================================
// Rule-based word tokenizer used to split cleaned utterances
// before features are attached to each token.
//
// No vocabulary and no learned merges: the text is split on
// whitespace and every punctuation character is isolated as a
// token of its own, the way a blank NLP pipeline behaves.
//
//   "ich geh' heim"  →  ["ich", "geh", "'", "heim"]
//
// Built from the pre-tokenizers of the `tokenizers` crate so the
// splitting rules match what a subword tokenizer would see.
//
// Reference: tokenizers crate documentation (pre_tokenizers)

use anyhow::{bail, Result};
use tokenizers::pre_tokenizers::{
    punctuation::Punctuation,
    sequence::Sequence,
    whitespace::WhitespaceSplit,
};
use tokenizers::{OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer};

pub struct BlankTokenizer {
    lang:          String,
    pre_tokenizer: Sequence,
}

impl BlankTokenizer {
    /// Create a tokenizer tagged with an ISO 639 language code
    /// (two or three ASCII letters, e.g. "de", "gsw").
    pub fn new(lang: &str) -> Result<Self> {
        let valid = (2..=3).contains(&lang.len())
            && lang.chars().all(|c| c.is_ascii_alphabetic());
        if !valid {
            bail!("Invalid language code '{lang}': expected 2-3 ASCII letters");
        }

        let pre_tokenizer = Sequence::new(vec![
            WhitespaceSplit.into(),
            Punctuation::default().into(),
        ]);

        Ok(Self {
            lang: lang.to_ascii_lowercase(),
            pre_tokenizer,
        })
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// Split a text into word and punctuation tokens.
    pub fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        let mut pretokenized = PreTokenizedString::from(text);
        self.pre_tokenizer
            .pre_tokenize(&mut pretokenized)
            .map_err(|e| anyhow::anyhow!("Tokenisation error: {e}"))?;

        Ok(pretokenized
            .get_splits(OffsetReferential::Original, OffsetType::Char)
            .into_iter()
            .map(|(piece, _, _)| piece.to_string())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_whitespace() {
        let tok = BlankTokenizer::new("de").unwrap();
        assert_eq!(tok.tokenize("der  hase\tläuft").unwrap(), vec!["der", "hase", "läuft"]);
    }

    #[test]
    fn test_isolates_punctuation() {
        let tok = BlankTokenizer::new("de").unwrap();
        assert_eq!(
            tok.tokenize("geh' heim!").unwrap(),
            vec!["geh", "'", "heim", "!"]
        );
    }

    #[test]
    fn test_empty_text_has_no_tokens() {
        let tok = BlankTokenizer::new("de").unwrap();
        assert!(tok.tokenize("   ").unwrap().is_empty());
    }

    #[test]
    fn test_rejects_bad_language_code() {
        assert!(BlankTokenizer::new("").is_err());
        assert!(BlankTokenizer::new("german").is_err());
        assert!(BlankTokenizer::new("d3").is_err());
        assert_eq!(BlankTokenizer::new("GSW").unwrap().lang(), "gsw");
    }
}
