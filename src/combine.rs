//! Cross-document combination.
//!
//! Merges recognition artifacts from many source documents into one
//! combined model, preserving full provenance. Nothing is deduplicated:
//! the same text arriving from two sources is two provenance entries, and
//! that redundancy is signal for the auditor. The model is rebuilt fresh
//! on every run, never updated incrementally.

use crate::error::Result;
use crate::recognize::{RecognitionResult, SourceMetadata};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

/// One statement occurrence with the source document it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceEntry {
    pub source: String,
    pub text: String,
}

/// control id -> provenance entries, in input order.
pub type CatalogControls = BTreeMap<String, Vec<ProvenanceEntry>>;

/// catalog -> controls.
pub type ComponentCatalogs = BTreeMap<String, CatalogControls>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedModel {
    pub metadata: Vec<SourceMetadata>,
    pub components: BTreeMap<String, ComponentCatalogs>,
}

impl CombinedModel {
    /// The single place intermediate maps are created. Everything else
    /// reads with plain lookups, so a typo surfaces as an empty result
    /// instead of a silently materialized branch.
    fn controls_mut(&mut self, component: &str, catalog: &str) -> &mut CatalogControls {
        self.components
            .entry(component.to_string())
            .or_default()
            .entry(catalog.to_string())
            .or_default()
    }

    pub fn from_reader(reader: impl std::io::Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn load(path: &std::path::Path) -> Result<Self> {
        Self::from_reader(std::fs::File::open(path)?)
    }
}

/// Merge artifacts in input order. The component/catalog/control key set is
/// independent of artifact order; provenance lists and the metadata list
/// follow input order exactly, for audit reproducibility.
pub fn combine(results: &[RecognitionResult]) -> CombinedModel {
    let mut combined = CombinedModel::default();
    for result in results {
        combined.metadata.push(result.metadata.clone());
        let catalog = &result.metadata.catalog;
        let source = &result.metadata.source;

        for (component, statements) in &result.components {
            let controls = combined.controls_mut(component, catalog);
            for statement in statements {
                controls
                    .entry(statement.control.clone())
                    .or_default()
                    .push(ProvenanceEntry {
                        source: source.clone(),
                        text: statement.text.clone(),
                    });
            }
        }
    }
    combined
}

/// Load every artifact, then combine. Any artifact that fails to load
/// aborts the whole run; a partial combination would silently
/// misrepresent coverage downstream.
pub fn combine_files(paths: &[PathBuf]) -> Result<CombinedModel> {
    let mut results = Vec::with_capacity(paths.len());
    for path in paths {
        results.push(RecognitionResult::load(path)?);
    }
    info!("combining {} recognition artifacts", results.len());
    Ok(combine(&results))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::ControlStatement;
    use std::collections::BTreeMap;

    fn artifact(source: &str, catalog: &str, entries: &[(&str, &str, &str)]) -> RecognitionResult {
        let mut components: BTreeMap<String, Vec<ControlStatement>> = BTreeMap::new();
        for (component, control, text) in entries {
            components
                .entry(component.to_string())
                .or_default()
                .push(ControlStatement::new(*control, *text));
        }
        RecognitionResult::new(
            SourceMetadata {
                source: source.to_string(),
                catalog: catalog.to_string(),
                remarks: String::new(),
                created: String::new(),
                command: String::new(),
            },
            components,
        )
    }

    #[test]
    fn test_combine_preserves_provenance_order() {
        let a = artifact("ssp-a", "rev4", &[("Firewall", "ac-1", "from a")]);
        let b = artifact("ssp-b", "rev4", &[("Firewall", "ac-1", "from b")]);
        let combined = combine(&[a, b]);

        let entries = &combined.components["Firewall"]["rev4"]["ac-1"];
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].source, "ssp-a");
        assert_eq!(entries[1].source, "ssp-b");
        assert_eq!(combined.metadata[0].source, "ssp-a");
        assert_eq!(combined.metadata[1].source, "ssp-b");
    }

    #[test]
    fn test_combine_never_deduplicates() {
        let a = artifact("ssp-a", "rev4", &[("Firewall", "ac-1", "same text")]);
        let b = artifact("ssp-b", "rev4", &[("Firewall", "ac-1", "same text")]);
        let combined = combine(&[a, b]);
        assert_eq!(combined.components["Firewall"]["rev4"]["ac-1"].len(), 2);
    }

    #[test]
    fn test_combine_key_set_is_order_independent() {
        let a = artifact("ssp-a", "rev4", &[("Firewall", "ac-1", "a text")]);
        let b = artifact("ssp-b", "rev5", &[("SIEM", "au-6", "b text")]);
        let c = artifact("ssp-c", "rev4", &[("Firewall", "ac-2", "c text")]);

        let forward = combine(&[a.clone(), b.clone(), c.clone()]);
        let backward = combine(&[c, a, b]);

        let forward_keys: Vec<_> = forward.components.keys().collect();
        let backward_keys: Vec<_> = backward.components.keys().collect();
        assert_eq!(forward_keys, backward_keys);
        assert_eq!(
            forward.components["Firewall"]["rev4"].keys().collect::<Vec<_>>(),
            backward.components["Firewall"]["rev4"].keys().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_combine_same_order_is_identical() {
        let a = artifact("ssp-a", "rev4", &[("Firewall", "ac-1", "a text")]);
        let b = artifact("ssp-b", "rev4", &[("Firewall", "ac-1", "b text")]);

        let first = serde_json::to_string(&combine(&[a.clone(), b.clone()])).unwrap();
        let second = serde_json::to_string(&combine(&[a, b])).unwrap();
        assert_eq!(first, second);
    }
}
