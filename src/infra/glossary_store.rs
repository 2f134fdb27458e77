// ============================================================
// Layer 6 — Glossary Store
// ============================================================
// Loads the two lookup tables behind the GlossMapper:
//
//   leipzig_glossary.json   value → code     {"Masc": "M", ...}
//   value_to_feature.json   value → feature  {"Masc": "Gender", ...}
//
// Either file may be overridden on the command line; otherwise
// the defaults compiled into the binary are used. The tables
// are read once per run and handed to the mapper by value.
//
// Codes containing digits (person markers such as "1SG") can
// never match: the cleaner strips digits from glosses first.

use anyhow::{Context, Result};
use std::{
    collections::BTreeMap,
    fs,
    path::PathBuf,
};

use crate::domain::gloss::GlossaryTables;

const DEFAULT_GLOSSARY: &str = include_str!("../../resources/leipzig_glossary.json");
const DEFAULT_FEATURES: &str = include_str!("../../resources/value_to_feature.json");

#[derive(Debug, Clone, Default)]
pub struct GlossaryStore {
    glossary_path: Option<PathBuf>,
    features_path: Option<PathBuf>,
}

impl GlossaryStore {
    pub fn new(glossary_path: Option<PathBuf>, features_path: Option<PathBuf>) -> Self {
        Self { glossary_path, features_path }
    }

    pub fn load(&self) -> Result<GlossaryTables> {
        let value_to_code    = read_table(self.glossary_path.as_ref(), DEFAULT_GLOSSARY, "glossary")?;
        let value_to_feature = read_table(self.features_path.as_ref(), DEFAULT_FEATURES, "feature")?;

        let tables = GlossaryTables::from_value_codes(value_to_code, value_to_feature)
            .context("Invalid glossary table")?;

        tracing::info!(
            "Glossary ready: {} codes, {} feature values",
            tables.code_count(),
            tables.feature_count()
        );
        Ok(tables)
    }
}

fn read_table(
    path:     Option<&PathBuf>,
    fallback: &str,
    what:     &str,
) -> Result<BTreeMap<String, String>> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Cannot read {what} table '{}'", path.display()))?;
            serde_json::from_str(&json)
                .with_context(|| format!("Malformed {what} table '{}'", path.display()))
        }
        None => {
            tracing::debug!("Using built-in {what} table");
            serde_json::from_str(fallback)
                .with_context(|| format!("Malformed built-in {what} table"))
        }
    }
}
