//! Tagged multi-source ingestion.
//!
//! Several line-record documents, each labeled with a short caller-chosen
//! tag, read together into a per-control index: which tagged documents say
//! anything about each control. Conflicting tags are a configuration
//! mistake and are rejected before any file is opened.

use crate::error::{CollateError, Result};
use crate::statement::{LineRecordReader, ReaderOptions, StatementReader};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

#[derive(Debug, Default)]
pub struct TaggedSources {
    sources: Vec<(String, PathBuf)>,
    tags: BTreeSet<String>,
}

impl TaggedSources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, tag: &str, path: impl Into<PathBuf>) -> Result<()> {
        if !self.tags.insert(tag.to_string()) {
            return Err(CollateError::DuplicateTag(tag.to_string()));
        }
        self.sources.push((tag.to_string(), path.into()));
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// control id -> (tag, text) in input order: a cross-document view of
    /// which tagged documents cover each control.
    pub fn control_index(
        &self,
        options: &ReaderOptions,
    ) -> Result<BTreeMap<String, Vec<(String, String)>>> {
        let reader = LineRecordReader::new(options.clone());
        let mut index: BTreeMap<String, Vec<(String, String)>> = BTreeMap::new();
        for (tag, path) in &self.sources {
            for statement in reader.read(path)? {
                index
                    .entry(statement.control)
                    .or_default()
                    .push((tag.clone(), statement.text));
            }
        }
        Ok(index)
    }
}
