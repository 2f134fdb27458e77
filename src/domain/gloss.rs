// ============================================================
// Layer 3 — Gloss → UD Feature Mapping
// ============================================================
// Converts a Leipzig-style gloss line into one Universal
// Dependencies feature string per token.
//
// Gloss format:
//   tokens are whitespace separated, codes inside a token are
//   dot separated, and the first segment is the lemma/stem:
//
//     "art.DEF.M.SG.NOM rabbit.M.SG.NOM run"
//      └─┬─┘ └────┬───┘
//       stem    codes
//
// Every code is looked up twice:
//   code  → UD value    (glossary table, e.g. "M"    → "Masc")
//   value → UD feature  (feature table,  e.g. "Masc" → "Gender")
// and emitted as "Gender=Masc". Codes failing either lookup are
// reported back to the caller as unknown.
//
// Reference: Leipzig Glossing Rules
//            Universal Dependencies v2 morphological features

use std::collections::BTreeMap;

use thiserror::Error;

/// Placeholder for a glossed token where no code could be mapped.
pub const NO_FEATURES: &str = "_";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GlossaryError {
    #[error("glossary code '{code}' is claimed by both '{first}' and '{second}'")]
    DuplicateCode {
        code:   String,
        first:  String,
        second: String,
    },

    #[error("glossary value '{value}' has an empty code")]
    EmptyCode { value: String },
}

/// The two lookup tables the mapper needs.
///
/// Codes are stored upper-cased; lookups upper-case the code
/// first, so cleaned (lower-cased) glosses still match.
#[derive(Debug, Clone, Default)]
pub struct GlossaryTables {
    code_to_value:    BTreeMap<String, String>,
    value_to_feature: BTreeMap<String, String>,
}

impl GlossaryTables {
    pub fn new(
        code_to_value:    BTreeMap<String, String>,
        value_to_feature: BTreeMap<String, String>,
    ) -> Self {
        let code_to_value = code_to_value
            .into_iter()
            .map(|(code, value)| (code.to_uppercase(), value))
            .collect();
        Self { code_to_value, value_to_feature }
    }

    /// Build the tables from the on-disk layout, which stores the
    /// glossary as value → code. The inverse must be injective:
    /// two values sharing a code would make the mapping ambiguous.
    pub fn from_value_codes(
        value_to_code:    BTreeMap<String, String>,
        value_to_feature: BTreeMap<String, String>,
    ) -> Result<Self, GlossaryError> {
        let mut code_to_value: BTreeMap<String, String> = BTreeMap::new();

        for (value, code) in value_to_code {
            let code = code.trim().to_uppercase();
            if code.is_empty() {
                return Err(GlossaryError::EmptyCode { value });
            }
            if let Some(first) = code_to_value.get(&code) {
                return Err(GlossaryError::DuplicateCode {
                    code,
                    first:  first.clone(),
                    second: value,
                });
            }
            code_to_value.insert(code, value);
        }

        Ok(Self { code_to_value, value_to_feature })
    }

    /// Resolve one code to its `name=value` feature, if both tables know it.
    pub fn feature_for(&self, code: &str) -> Option<String> {
        let value = self.code_to_value.get(&code.to_uppercase())?;
        let name  = self.value_to_feature.get(value)?;
        Some(format!("{name}={value}"))
    }

    pub fn code_count(&self) -> usize {
        self.code_to_value.len()
    }

    pub fn feature_count(&self) -> usize {
        self.value_to_feature.len()
    }
}

/// Result of mapping one gloss line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlossMapping {
    /// One entry per whitespace token of the gloss
    pub features: Vec<String>,

    /// Upper-cased codes that could not be mapped, in input order
    pub unknown_codes: Vec<String>,

    /// Tokens that carried no codes at all
    pub unglossed: Vec<String>,
}

impl GlossMapping {
    pub fn has_unknown_codes(&self) -> bool {
        !self.unknown_codes.is_empty()
    }
}

/// Maps gloss strings to per-token UD feature strings.
#[derive(Debug, Clone)]
pub struct GlossMapper {
    tables: GlossaryTables,
}

impl GlossMapper {
    pub fn new(tables: GlossaryTables) -> Self {
        Self { tables }
    }

    /// Map a full gloss line.
    ///
    /// - token without a dot  → ""   (unglossed)
    /// - no code mapped       → "_"
    /// - otherwise            → mapped features joined with '|'
    pub fn map(&self, gloss: &str) -> GlossMapping {
        let mut out = GlossMapping::default();

        for token in gloss.split_whitespace() {
            let Some((_stem, codes)) = token.split_once('.') else {
                out.features.push(String::new());
                out.unglossed.push(token.to_string());
                continue;
            };

            let mut feats: Vec<String> = Vec::new();
            // An empty code ("x." or "x..M") is reported as unknown
            for code in codes.split('.') {
                match self.tables.feature_for(code) {
                    Some(feat) => feats.push(feat),
                    None       => out.unknown_codes.push(code.to_uppercase()),
                }
            }

            if feats.is_empty() {
                out.features.push(NO_FEATURES.to_string());
            } else {
                out.features.push(feats.join("|"));
            }
        }

        if !out.unglossed.is_empty() {
            tracing::debug!("tokens without gloss: {:?}", out.unglossed);
        }
        if out.has_unknown_codes() {
            tracing::debug!("unknown codes: {:?}", out.unknown_codes);
        }

        out
    }

    /// Only the per-token feature strings of `map`.
    pub fn features(&self, gloss: &str) -> Vec<String> {
        self.map(gloss).features
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> GlossMapper {
        let codes = BTreeMap::from([
            ("M".to_string(),   "Masc".to_string()),
            ("SG".to_string(),  "Sing".to_string()),
            ("NOM".to_string(), "Nom".to_string()),
            ("DEF".to_string(), "Def".to_string()),
        ]);
        let feats = BTreeMap::from([
            ("Masc".to_string(), "Gender".to_string()),
            ("Sing".to_string(), "Number".to_string()),
            ("Nom".to_string(),  "Case".to_string()),
            ("Def".to_string(),  "Definite".to_string()),
        ]);
        GlossMapper::new(GlossaryTables::new(codes, feats))
    }

    #[test]
    fn test_maps_codes_in_order() {
        let m = mapper();
        assert_eq!(
            m.features("rabbit.M.SG.NOM"),
            vec!["Gender=Masc|Number=Sing|Case=Nom".to_string()]
        );
    }

    #[test]
    fn test_lowercase_codes_still_map() {
        let m = mapper();
        assert_eq!(m.features("rabbit.m.sg"), vec!["Gender=Masc|Number=Sing"]);
    }

    #[test]
    fn test_token_without_dot_is_empty() {
        let m = mapper();
        let out = m.map("run rabbit.M fast");
        assert_eq!(out.features, vec!["", "Gender=Masc", ""]);
        assert_eq!(out.unglossed, vec!["run", "fast"]);
    }

    #[test]
    fn test_one_entry_per_token() {
        let m = mapper();
        for gloss in ["", "a", "a.M b.X c", "  x.SG\ty.NOM  z ", "a.b.c.d e.f"] {
            assert_eq!(
                m.features(gloss).len(),
                gloss.split_whitespace().count(),
                "gloss {gloss:?}"
            );
        }
    }

    #[test]
    fn test_unknown_codes_are_reported_not_fatal() {
        let m = mapper();
        let out = m.map("go.PST.M cat.XYZ");
        assert_eq!(out.features, vec!["Gender=Masc", "_"]);
        assert_eq!(out.unknown_codes, vec!["PST", "XYZ"]);
    }

    #[test]
    fn test_empty_code_is_reported_unknown() {
        let m = mapper();
        let out = m.map("x. rabbit..M");
        assert_eq!(out.features, vec!["_", "Gender=Masc"]);
        assert_eq!(out.unknown_codes, vec!["", ""]);
    }

    #[test]
    fn test_code_known_but_value_without_feature_is_unknown() {
        let codes = BTreeMap::from([("PL".to_string(), "Plur".to_string())]);
        let m = GlossMapper::new(GlossaryTables::new(codes, BTreeMap::new()));
        let out = m.map("dog.PL");
        assert_eq!(out.features, vec!["_"]);
        assert_eq!(out.unknown_codes, vec!["PL"]);
    }

    #[test]
    fn test_from_value_codes_inverts() {
        let value_to_code = BTreeMap::from([
            ("Masc".to_string(), "m".to_string()),
            ("Sing".to_string(), "SG".to_string()),
        ]);
        let feats = BTreeMap::from([
            ("Masc".to_string(), "Gender".to_string()),
            ("Sing".to_string(), "Number".to_string()),
        ]);
        let tables = GlossaryTables::from_value_codes(value_to_code, feats).unwrap();
        assert_eq!(tables.code_count(), 2);
        assert_eq!(tables.feature_for("M").as_deref(), Some("Gender=Masc"));
    }

    #[test]
    fn test_from_value_codes_rejects_collision() {
        let value_to_code = BTreeMap::from([
            ("Imp".to_string(),  "IMP".to_string()),
            ("Impf".to_string(), "imp".to_string()),
        ]);
        let err = GlossaryTables::from_value_codes(value_to_code, BTreeMap::new())
            .unwrap_err();
        assert_eq!(
            err,
            GlossaryError::DuplicateCode {
                code:   "IMP".into(),
                first:  "Imp".into(),
                second: "Impf".into(),
            }
        );
    }

    #[test]
    fn test_from_value_codes_rejects_empty_code() {
        let value_to_code = BTreeMap::from([("Masc".to_string(), " ".to_string())]);
        assert!(matches!(
            GlossaryTables::from_value_codes(value_to_code, BTreeMap::new()),
            Err(GlossaryError::EmptyCode { .. })
        ));
    }
}
