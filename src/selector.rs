//! Selector-driven re-collation and coverage reporting.
//!
//! A selector specification names groups of desired controls per catalog.
//! Selection re-groups a combined model by those controls and reports
//! which of them were matched and which are missing, per selector and
//! catalog.

use crate::combine::{CombinedModel, ProvenanceEntry};
use crate::error::Result;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// selector name -> catalog name -> desired control ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SelectorSpec {
    pub selectors: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl SelectorSpec {
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_reader(File::open(path)?)
    }

    fn desired(&self, selector: &str, catalog: &str) -> Option<BTreeSet<&str>> {
        self.selectors
            .get(selector)
            .and_then(|catalogs| catalogs.get(catalog))
            .map(|controls| controls.iter().map(String::as_str).collect())
    }
}

/// Statements one component contributes to a matched control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentStatements {
    pub component: String,
    pub statements: Vec<ProvenanceEntry>,
}

/// selector -> catalog -> control -> contributions ordered by component.
pub type SelectionResult =
    BTreeMap<String, BTreeMap<String, BTreeMap<String, Vec<ComponentStatements>>>>;

fn matches(value: &str, filter: Option<&str>) -> bool {
    filter.map_or(true, |filter| filter == value)
}

/// Re-collate a combined model by the controls each selector asks for.
/// Absent filters match everything. Contributions for one control are
/// ordered by component name.
pub fn select(
    spec: &SelectorSpec,
    combined: &CombinedModel,
    catalog_filter: Option<&str>,
    selector_filter: Option<&str>,
) -> SelectionResult {
    let mut results: SelectionResult = BTreeMap::new();
    for (component_name, catalogs) in &combined.components {
        for (catalog_name, controls) in catalogs {
            if !matches(catalog_name, catalog_filter) {
                continue;
            }
            for selector_name in spec.selectors.keys() {
                if !matches(selector_name, selector_filter) {
                    continue;
                }
                let Some(desired) = spec.desired(selector_name, catalog_name) else {
                    continue;
                };
                for control_id in desired {
                    let Some(statements) = controls.get(control_id) else {
                        continue;
                    };
                    results
                        .entry(selector_name.clone())
                        .or_default()
                        .entry(catalog_name.clone())
                        .or_default()
                        .entry(control_id.to_string())
                        .or_default()
                        .push(ComponentStatements {
                            component: component_name.clone(),
                            statements: statements.clone(),
                        });
                }
            }
        }
    }
    results
}

/// Desired-minus-matched per (selector, catalog) appearing in the
/// selection. Computed against the full desired set of the spec, whatever
/// catalog filter was applied to the enclosing query.
pub fn missing_controls(
    spec: &SelectorSpec,
    selection: &SelectionResult,
) -> BTreeMap<String, BTreeMap<String, BTreeSet<String>>> {
    let mut missing: BTreeMap<String, BTreeMap<String, BTreeSet<String>>> = BTreeMap::new();
    for (selector_name, catalogs) in selection {
        for (catalog_name, matched) in catalogs {
            let Some(desired) = spec.desired(selector_name, catalog_name) else {
                continue;
            };
            let missed = desired
                .into_iter()
                .filter(|control| !matched.contains_key(*control))
                .map(str::to_string)
                .collect();
            missing
                .entry(selector_name.clone())
                .or_default()
                .insert(catalog_name.clone(), missed);
        }
    }
    missing
}

/// One line per (selector, catalog): matched controls prefixed `+`,
/// missing controls prefixed `-`, both sorted.
pub fn summarize(selection: &SelectionResult, spec: &SelectorSpec) -> String {
    let missing = missing_controls(spec, selection);
    let mut lines = Vec::new();
    for (selector_name, catalogs) in selection {
        for (catalog_name, matched) in catalogs {
            let match_str = matched.keys().map(|control| format!("+{}", control)).join(", ");
            let missing_str = missing
                .get(selector_name)
                .and_then(|catalogs| catalogs.get(catalog_name))
                .map(|missed| missed.iter().map(|control| format!("-{}", control)).join(", "))
                .unwrap_or_default();
            lines.push(format!(
                "{:30} {} | {}",
                format!("{}/{}", selector_name, catalog_name),
                match_str,
                missing_str
            ));
        }
    }
    lines.join("\n")
}
