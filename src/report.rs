//! Markdown rendering for selections and combined components.
//!
//! Presentation only: every level is sorted by key so the same input
//! produces the same bytes.

use crate::combine::{CombinedModel, ComponentCatalogs, ProvenanceEntry};
use crate::error::Result;
use crate::recognize::SourceMetadata;
use crate::selector::{ComponentStatements, SelectionResult};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// File-name-safe slug: lower-cased, runs of anything non-alphanumeric
/// collapsed to a single dash.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Write one markdown document per selector into `dir`.
pub fn write_selection_reports(selection: &SelectionResult, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    for (selector, catalogs) in selection {
        let path = dir.join(format!("{}.md", slugify(selector)));
        info!("writing selection report {}", path.display());
        fs::write(&path, render_selector(selector, catalogs))?;
    }
    Ok(())
}

fn render_selector(
    selector: &str,
    catalogs: &BTreeMap<String, BTreeMap<String, Vec<ComponentStatements>>>,
) -> String {
    let mut out = format!("# Selector {}\n\n", selector);
    for (catalog, controls) in catalogs {
        out.push_str(&format!("## Catalog {}\n\n", catalog));
        for (control, contributions) in controls {
            out.push_str(&format!("### {}\n\n", control));
            for contribution in contributions {
                out.push_str(&format!("#### Component {}\n\n", contribution.component));
                for statement in &contribution.statements {
                    out.push_str(&format!(
                        "*From {}*\n\n{}\n\n",
                        statement.source,
                        statement.text.trim()
                    ));
                }
            }
        }
    }
    out
}

/// Write one markdown report per component of a combined model into `dir`,
/// each ending with a sources section drawn from the model metadata.
pub fn write_component_reports(combined: &CombinedModel, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    for (component, catalogs) in &combined.components {
        let path = dir.join(format!("{}.md", slugify(component)));
        info!("writing component report {}", path.display());
        fs::write(&path, render_component(component, catalogs, &combined.metadata))?;
    }
    Ok(())
}

fn render_component(
    component: &str,
    catalogs: &ComponentCatalogs,
    metadata: &[SourceMetadata],
) -> String {
    let mut out = format!("# {}\n\n", component);
    for (catalog, controls) in catalogs {
        out.push_str(&format!("## Catalog: {}\n\n", catalog));
        for (control, statements) in controls {
            out.push_str(&format!("### Control {}\n\n", control));
            let mut ordered: Vec<&ProvenanceEntry> = statements.iter().collect();
            ordered.sort_by(|a, b| a.source.cmp(&b.source));
            for statement in ordered {
                out.push_str(&format!("#### {}\n\n{}\n\n", statement.source, statement.text.trim()));
            }
        }
    }
    out.push_str(&render_metadata(metadata));
    out
}

fn render_metadata(metadata: &[SourceMetadata]) -> String {
    let mut out = String::from("## Sources\n\n");
    for block in metadata {
        out.push_str(&format!("* From: {}\n", block.source));
        let details = [
            ("catalog", &block.catalog),
            ("remarks", &block.remarks),
            ("created", &block.created),
            ("command", &block.command),
        ];
        for (key, value) in details {
            if !value.is_empty() {
                out.push_str(&format!("  * *{}*: {}\n", key, value));
            }
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Core Controls"), "core-controls");
        assert_eq!(slugify("AWS / GovCloud (East)"), "aws-govcloud-east");
        assert_eq!(slugify("  already-slugged  "), "already-slugged");
    }

    #[test]
    fn test_render_selector_sorted_and_complete() {
        let mut controls = BTreeMap::new();
        controls.insert(
            "ac-1".to_string(),
            vec![ComponentStatements {
                component: "Firewall".to_string(),
                statements: vec![ProvenanceEntry {
                    source: "ssp-a".to_string(),
                    text: "Inbound traffic is filtered.".to_string(),
                }],
            }],
        );
        let mut catalogs = BTreeMap::new();
        catalogs.insert("rev4".to_string(), controls);

        let rendered = render_selector("core", &catalogs);
        assert!(rendered.starts_with("# Selector core\n"));
        assert!(rendered.contains("## Catalog rev4"));
        assert!(rendered.contains("### ac-1"));
        assert!(rendered.contains("#### Component Firewall"));
        assert!(rendered.contains("*From ssp-a*"));
        assert!(rendered.contains("Inbound traffic is filtered."));
    }

    #[test]
    fn test_render_component_orders_statements_by_source() {
        let mut controls = BTreeMap::new();
        controls.insert(
            "ac-1".to_string(),
            vec![
                ProvenanceEntry {
                    source: "zeta".to_string(),
                    text: "from zeta".to_string(),
                },
                ProvenanceEntry {
                    source: "alpha".to_string(),
                    text: "from alpha".to_string(),
                },
            ],
        );
        let mut catalogs = BTreeMap::new();
        catalogs.insert("rev4".to_string(), controls);

        let rendered = render_component("Firewall", &catalogs, &[]);
        let alpha = rendered.find("#### alpha").unwrap();
        let zeta = rendered.find("#### zeta").unwrap();
        assert!(alpha < zeta);
    }

    #[test]
    fn test_render_metadata_skips_empty_fields() {
        let metadata = vec![SourceMetadata {
            source: "ssp-a".to_string(),
            catalog: "rev4".to_string(),
            remarks: String::new(),
            created: "2021-03-01T00:00:00+00:00".to_string(),
            command: String::new(),
        }];
        let rendered = render_metadata(&metadata);
        assert!(rendered.contains("* From: ssp-a"));
        assert!(rendered.contains("*catalog*: rev4"));
        assert!(!rendered.contains("remarks"));
    }
}
