//! Accumulated requirement values across conversation turns

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::schema::RequirementSchema;

/// Field values gathered so far for one elicitation run.
///
/// Merging is additive per field: a later valid value overwrites an earlier
/// one, and fields absent from a pass keep whatever they held before.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequirementState(BTreeMap<String, Value>);

impl RequirementState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Overlay newly validated fields onto the accumulated state.
    pub fn merge(&mut self, valid: &serde_json::Map<String, Value>) {
        for (field, value) in valid {
            self.0.insert(field.clone(), value.clone());
        }
    }

    /// Fill ungathered fields from schema defaults. Called once the loop
    /// exits so downstream steps see a fully populated object.
    pub fn apply_defaults(&mut self, schema: &RequirementSchema) {
        for field in &schema.fields {
            if let Some(ref default) = field.default
                && !self.0.contains_key(field.name)
            {
                self.0.insert(field.name.to_string(), default.clone());
            }
        }
    }

    pub fn as_json(&self) -> Value {
        Value::Object(self.0.clone().into_iter().collect())
    }

    /// One bullet per gathered field, for display back to the model or user.
    pub fn summary_lines(&self) -> String {
        if self.0.is_empty() {
            return "Nothing gathered yet.".to_string();
        }
        self.0
            .iter()
            .filter(|(name, _)| name.as_str() != "reasoning")
            .map(|(name, value)| match value {
                Value::String(s) => format!("- {name}: {s}"),
                other => format!("- {name}: {other}"),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::catalog;

    #[test]
    fn test_merge_overwrites_per_field() {
        let mut state = RequirementState::new();
        state.insert("location", Value::from("Goa"));
        state.insert("number_of_adults", Value::from(2));

        let mut pass = serde_json::Map::new();
        pass.insert("location".to_string(), Value::from("Manali"));
        state.merge(&pass);

        assert_eq!(state.get("location"), Some(&Value::from("Manali")));
        assert_eq!(state.get("number_of_adults"), Some(&Value::from(2)));
    }

    #[test]
    fn test_apply_defaults_only_fills_gaps() {
        let schema = catalog::stay_booking();
        let mut state = RequirementState::new();
        state.insert("number_of_children", Value::from(3));
        state.apply_defaults(&schema);

        assert_eq!(state.get("number_of_children"), Some(&Value::from(3)));
        assert_eq!(state.get("reasoning"), Some(&Value::from("")));
        assert!(!state.contains("location"));
    }

    #[test]
    fn test_summary_hides_reasoning() {
        let mut state = RequirementState::new();
        state.insert("location", Value::from("Goa"));
        state.insert("reasoning", Value::from("user said so"));

        let summary = state.summary_lines();
        assert!(summary.contains("- location: Goa"));
        assert!(!summary.contains("reasoning"));
    }

    #[test]
    fn test_empty_summary() {
        let state = RequirementState::new();
        assert_eq!(state.summary_lines(), "Nothing gathered yet.");
    }
}
