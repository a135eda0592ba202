//! Component recognition and per-document collation.
//!
//! The entity-recognition engine itself lives outside this crate; here it
//! is just a function from statement text to a set of candidate names,
//! behind the [`Recognizer`] trait. The [`KeywordRecognizer`] is the
//! built-in rule-based engine: it matches known component spellings
//! directly in the text and emits canonical names by construction.

use crate::components::{ComponentFilter, ComponentVocabulary};
use crate::error::{CollateError, Result};
use crate::statement::ControlStatement;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Reserved component name for statements with no surviving candidates.
/// Unattributed statements are kept, not discarded.
pub const UNKNOWN_COMPONENT: &str = "UNKNOWN";

/// Opaque recognition function: statement text in, candidate component
/// names out.
pub trait Recognizer {
    fn components(&self, text: &str) -> BTreeSet<String>;
}

/// Rule-based recognizer built from the component vocabulary. Case
/// insensitive; every vocabulary spelling (canonical name or alias) found
/// in the text yields its canonical name.
pub struct KeywordRecognizer {
    patterns: Vec<(String, String)>,
}

impl KeywordRecognizer {
    pub fn new(vocabulary: &ComponentVocabulary) -> Self {
        let patterns = vocabulary
            .spellings()
            .into_iter()
            .map(|(spelling, name)| (spelling.to_lowercase(), name))
            .collect();
        Self { patterns }
    }
}

impl Recognizer for KeywordRecognizer {
    fn components(&self, text: &str) -> BTreeSet<String> {
        let haystack = text.to_lowercase();
        self.patterns
            .iter()
            .filter(|(spelling, _)| haystack.contains(spelling.as_str()))
            .map(|(_, name)| name.clone())
            .collect()
    }
}

/// Provenance block carried by every recognition artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub source: String,
    pub catalog: String,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub command: String,
}

impl SourceMetadata {
    /// Stamp a metadata block with the current UTC time at seconds
    /// precision and the invoking command line.
    pub fn now(source: &str, catalog: &str, remarks: &str, command: &str) -> Self {
        Self {
            source: source.to_string(),
            catalog: catalog.to_string(),
            remarks: remarks.to_string(),
            created: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false),
            command: command.to_string(),
        }
    }
}

/// One artifact per source document: statements collated by component.
/// Written once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub metadata: SourceMetadata,
    pub components: BTreeMap<String, Vec<ControlStatement>>,
}

impl RecognitionResult {
    pub fn new(metadata: SourceMetadata, components: BTreeMap<String, Vec<ControlStatement>>) -> Self {
        Self {
            metadata,
            components,
        }
    }

    pub fn from_reader(reader: impl Read, origin: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_reader(reader)?;
        // catch absent provenance before it can poison a combine run
        for field in ["source", "catalog"] {
            if value
                .get("metadata")
                .and_then(|metadata| metadata.get(field))
                .is_none()
            {
                return Err(CollateError::MissingMetadata {
                    path: origin.to_string(),
                    field: field.to_string(),
                });
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_reader(File::open(path)?, &path.display().to_string())
    }
}

/// Collate statements by recognized component. Each statement lands in the
/// list of every component that survives filtering, or under
/// [`UNKNOWN_COMPONENT`] when none do.
pub fn collate(
    statements: &[ControlStatement],
    recognizer: &dyn Recognizer,
    filter: &dyn ComponentFilter,
) -> BTreeMap<String, Vec<ControlStatement>> {
    let mut by_component: BTreeMap<String, Vec<ControlStatement>> = BTreeMap::new();
    for statement in statements {
        let candidates = recognizer.components(&statement.text);
        let components = filter.filter(candidates);
        if components.is_empty() {
            debug!("no component recognized for control {}", statement.control);
            by_component
                .entry(UNKNOWN_COMPONENT.to_string())
                .or_default()
                .push(statement.clone());
        } else {
            for component in components {
                by_component
                    .entry(component)
                    .or_default()
                    .push(statement.clone());
            }
        }
    }
    by_component
}
