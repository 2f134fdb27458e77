// ============================================================
// Layer 2 — GlossUseCase
// ============================================================
// Maps one gloss line to UD features, exactly as the corpus
// builder would. Useful for checking a glossary file against
// real annotations before starting a long training run:
//
//   $ gloss-morph gloss "Hase.M.SG.NOM lauf.PRS"
//   hase.m.sg.nom  Gender=Masc|Number=Sing|Case=Nom
//   lauf.prs       Tense=Pres

use anyhow::Result;
use std::path::PathBuf;

use crate::data::cleaner::Cleaner;
use crate::domain::gloss::{GlossMapper, GlossMapping};
use crate::infra::glossary_store::GlossaryStore;

pub struct GlossUseCase {
    mapper:  GlossMapper,
    cleaner: Cleaner,
    raw:     bool,
}

impl GlossUseCase {
    pub fn new(
        glossary_path: Option<String>,
        features_path: Option<String>,
        raw:           bool,
    ) -> Result<Self> {
        let store = GlossaryStore::new(
            glossary_path.map(PathBuf::from),
            features_path.map(PathBuf::from),
        );
        Ok(Self {
            mapper:  GlossMapper::new(store.load()?),
            cleaner: Cleaner::new(),
            raw,
        })
    }

    /// The gloss as the mapper will see it, plus the mapping.
    /// Unless `raw` is set the gloss is cleaned first.
    pub fn execute(&self, gloss: &str) -> (String, GlossMapping) {
        let gloss = if self.raw {
            gloss.trim().to_string()
        } else {
            self.cleaner.clean(gloss)
        };
        let mapping = self.mapper.map(&gloss);
        (gloss, mapping)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleans_before_mapping() {
        let uc = GlossUseCase::new(None, None, false).unwrap();
        let (cleaned, mapping) = uc.execute("Hase.M.SG.NOM, (lauf.PRS).");
        assert_eq!(cleaned, "hase.m.sg.nom lauf.prs");
        assert_eq!(mapping.features, vec!["Gender=Masc|Number=Sing|Case=Nom", "Tense=Pres"]);
    }

    #[test]
    fn test_raw_keeps_digits() {
        let uc = GlossUseCase::new(None, None, true).unwrap();
        let (_, mapping) = uc.execute("er.3SG");
        assert_eq!(mapping.features, vec!["_"]);
        assert_eq!(mapping.unknown_codes, vec!["3SG"]);
    }
}
