//! Component name canonicalization.
//!
//! Recognized candidate names are noisy: the same component is spelled a
//! dozen ways across documents, and some recurring terms are known false
//! positives. A vocabulary file declares canonical names with their aliases
//! ("aka") plus an exclusion list, and the filter resolves candidates
//! against it case-insensitively.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentEntry {
    #[serde(default)]
    pub aka: Vec<String>,
}

/// Known-component tailoring: canonical names with aliases, and terms that
/// are never components.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentVocabulary {
    #[serde(default)]
    pub components: BTreeMap<String, ComponentEntry>,
    #[serde(default)]
    pub not_components: Vec<String>,
}

impl ComponentVocabulary {
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_reader(File::open(path)?)
    }

    /// Every (spelling, canonical name) pair the vocabulary knows about:
    /// each canonical name for itself, then each alias.
    pub fn spellings(&self) -> Vec<(String, String)> {
        let mut spellings = Vec::new();
        for (name, entry) in &self.components {
            spellings.push((name.clone(), name.clone()));
            for aka in &entry.aka {
                spellings.push((aka.clone(), name.clone()));
            }
        }
        spellings
    }
}

/// The seam between recognition and collation: reduce a set of candidate
/// names to the set of component names worth keeping.
pub trait ComponentFilter {
    fn filter(&self, candidates: BTreeSet<String>) -> BTreeSet<String>;
}

/// Passes every candidate through untouched, for pipelines where upstream
/// matching already guarantees canonical names.
pub struct AcceptAll;

impl ComponentFilter for AcceptAll {
    fn filter(&self, candidates: BTreeSet<String>) -> BTreeSet<String> {
        candidates
    }
}

/// Drops excluded terms and maps aliases to canonical names, both
/// case-insensitively. Unknown candidates pass through verbatim.
pub struct VocabularyFilter {
    excluded: BTreeSet<String>,
    canonical_names: BTreeMap<String, String>,
}

impl VocabularyFilter {
    pub fn new(vocabulary: &ComponentVocabulary) -> Self {
        let excluded = vocabulary
            .not_components
            .iter()
            .map(|term| term.to_lowercase())
            .collect();
        let mut canonical_names = BTreeMap::new();
        for (spelling, name) in vocabulary.spellings() {
            canonical_names.insert(spelling.to_lowercase(), name);
        }
        Self {
            excluded,
            canonical_names,
        }
    }

    /// An absent vocabulary yields a no-op filter.
    pub fn from_optional(vocabulary: Option<&ComponentVocabulary>) -> Self {
        match vocabulary {
            Some(vocabulary) => Self::new(vocabulary),
            None => Self::new(&ComponentVocabulary::default()),
        }
    }

    fn maybe_component(&self, candidate: &str) -> bool {
        !self.excluded.contains(&candidate.to_lowercase())
    }

    fn canonical_name(&self, candidate: &str) -> String {
        self.canonical_names
            .get(&candidate.to_lowercase())
            .cloned()
            .unwrap_or_else(|| candidate.to_string())
    }
}

impl ComponentFilter for VocabularyFilter {
    fn filter(&self, candidates: BTreeSet<String>) -> BTreeSet<String> {
        candidates
            .iter()
            .filter(|candidate| self.maybe_component(candidate))
            .map(|candidate| self.canonical_name(candidate))
            .collect()
    }
}
