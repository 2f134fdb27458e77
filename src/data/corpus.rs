// ============================================================
// Layer 4 — DocCorpus
// ============================================================
// An ordered, in-memory collection of annotated documents and
// its on-disk form: one JSON object per line.
//
//   {"source":"s1_annotated.docx","text":"der hase","tokens":[...]}
//
// The orchestrator writes a train and a dev file per fold; the
// trainer reads them back. JSON lines keep the files diffable
// and streamable.
//
// Reference: serde_json documentation

use anyhow::{Context, Result};
use serde::Serialize;
use std::{
    fs,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use crate::domain::annotated::AnnotatedDoc;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocCorpus {
    docs: Vec<AnnotatedDoc>,
}

impl DocCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_docs(docs: Vec<AnnotatedDoc>) -> Self {
        Self { docs }
    }

    pub fn push(&mut self, doc: AnnotatedDoc) {
        self.docs.push(doc);
    }

    pub fn docs(&self) -> &[AnnotatedDoc] {
        &self.docs
    }

    pub fn into_docs(self) -> Vec<AnnotatedDoc> {
        self.docs
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn token_count(&self) -> usize {
        self.docs.iter().map(AnnotatedDoc::len).sum()
    }

    /// Write the corpus as JSON lines, replacing any existing file.
    pub fn to_disk(&self, path: &Path) -> Result<()> {
        write_jsonl(path, &self.docs)?;
        tracing::debug!("Wrote {} documents to '{}'", self.docs.len(), path.display());
        Ok(())
    }

    /// Read a corpus written by `to_disk`. Blank lines are ignored.
    pub fn from_disk(path: &Path) -> Result<Self> {
        let file = fs::File::open(path)
            .with_context(|| format!("Cannot open corpus '{}'", path.display()))?;

        let mut docs = Vec::new();
        for (i, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let doc: AnnotatedDoc = serde_json::from_str(&line).with_context(|| {
                format!("Invalid document on line {} of '{}'", i + 1, path.display())
            })?;
            docs.push(doc);
        }

        Ok(Self { docs })
    }
}

/// Write any serialisable records as JSON lines.
pub fn write_jsonl<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::File::create(path)
        .with_context(|| format!("Cannot create '{}'", path.display()))?;
    let mut w = BufWriter::new(file);
    for record in records {
        serde_json::to_writer(&mut w, record)?;
        w.write_all(b"\n")?;
    }
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::annotated::MorphToken;

    fn doc(text: &str) -> AnnotatedDoc {
        AnnotatedDoc::new(
            "f",
            text,
            text.split(' ').map(|t| MorphToken::new(t, "Number=Sing")).collect(),
        )
    }

    #[test]
    fn test_disk_round_trip() {
        let dir    = tempfile::tempdir().unwrap();
        let path   = dir.path().join("nested").join("train.jsonl");
        let corpus = DocCorpus::from_docs(vec![doc("a b"), doc("c")]);

        corpus.to_disk(&path).unwrap();
        let back = DocCorpus::from_disk(&path).unwrap();

        assert_eq!(back, corpus);
        assert_eq!(back.token_count(), 3);
    }

    #[test]
    fn test_rejects_garbage_line() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.jsonl");
        fs::write(&path, "{\"source\":1}\n").unwrap();

        let err = DocCorpus::from_disk(&path).unwrap_err();
        assert!(format!("{err:#}").contains("line 1"));
    }
}
