//! Assembly primitives for downstream document builders.
//!
//! The schema-bound compliance artifact is produced outside this crate,
//! but the uniqueness rules it depends on are enforced here, at the point
//! of insertion: one statement id per control group, one component per
//! outline. Duplicates are errors, never silent overwrites.

use crate::error::{CollateError, Result};
use std::collections::BTreeMap;

/// Statements keyed by canonical statement id under one control.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementGroup {
    control_id: String,
    statements: BTreeMap<String, String>,
}

impl RequirementGroup {
    pub fn new(control_id: impl Into<String>) -> Self {
        Self {
            control_id: control_id.into(),
            statements: BTreeMap::new(),
        }
    }

    pub fn control_id(&self) -> &str {
        &self.control_id
    }

    pub fn statements(&self) -> &BTreeMap<String, String> {
        &self.statements
    }

    pub fn add_statement(&mut self, statement_id: &str, text: &str) -> Result<()> {
        if self.statements.contains_key(statement_id) {
            return Err(CollateError::DuplicateKey(format!(
                "statement {} already present for control {}",
                statement_id, self.control_id
            )));
        }
        self.statements
            .insert(statement_id.to_string(), text.to_string());
        Ok(())
    }
}

/// Requirement groups keyed by component name.
#[derive(Debug, Clone, Default)]
pub struct ComponentOutline {
    components: BTreeMap<String, Vec<RequirementGroup>>,
}

impl ComponentOutline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn components(&self) -> &BTreeMap<String, Vec<RequirementGroup>> {
        &self.components
    }

    pub fn add_component(&mut self, name: &str) -> Result<()> {
        if self.components.contains_key(name) {
            return Err(CollateError::DuplicateKey(format!(
                "component {} already present",
                name
            )));
        }
        self.components.insert(name.to_string(), Vec::new());
        Ok(())
    }

    pub fn add_requirement(&mut self, component: &str, requirement: RequirementGroup) -> Result<()> {
        match self.components.get_mut(component) {
            Some(requirements) => {
                requirements.push(requirement);
                Ok(())
            }
            None => Err(CollateError::Config(format!(
                "unknown component '{}'",
                component
            ))),
        }
    }
}
