//! Typed field declarations for requirement schemas

use serde_json::Value;

use crate::schema::state::RequirementState;

/// The value type a requirement field accepts, with per-field constraints.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Integer { gt: Option<i64>, ge: Option<i64> },
    Float { gt: Option<f64> },
    Text { min_length: Option<usize> },
    Date,
}

impl FieldKind {
    /// Short human phrase used when describing the field to the model.
    pub fn type_phrase(&self) -> String {
        match self {
            FieldKind::Integer { gt: Some(n), .. } => format!("Integer greater than {n}."),
            FieldKind::Integer { ge: Some(n), .. } => format!("Integer of at least {n}."),
            FieldKind::Integer { .. } => "Integer.".to_string(),
            FieldKind::Float { gt: Some(n) } => format!("Number greater than {n}."),
            FieldKind::Float { .. } => "Number.".to_string(),
            FieldKind::Text { .. } => "Text.".to_string(),
            FieldKind::Date => "Date in YYYY-MM-DD format.".to_string(),
        }
    }
}

/// One field of a requirement schema.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub description: &'static str,
    /// Assumed value when the user never supplies the field. Fields without
    /// a default must be gathered before the schema counts as complete.
    pub default: Option<Value>,
}

/// A rule spanning more than one field, checked after per-field validation.
#[derive(Debug, Clone, PartialEq)]
pub enum CrossRule {
    /// `later` must be strictly after `earlier`. Both name date fields.
    DateOrder { earlier: &'static str, later: &'static str },
}

/// A named set of typed fields the elicitation loop fills in.
#[derive(Debug, Clone)]
pub struct RequirementSchema {
    pub name: &'static str,
    /// Bumped whenever the field set or constraints change.
    pub version: u32,
    pub fields: Vec<FieldSpec>,
    pub cross_rules: Vec<CrossRule>,
}

impl RequirementSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Fields not yet gathered and without a default, in schema order.
    pub fn missing<'a>(&'a self, state: &RequirementState) -> Vec<&'a FieldSpec> {
        self.fields
            .iter()
            .filter(|f| f.default.is_none() && !state.contains(f.name))
            .collect()
    }

    /// Complete when every field is either gathered or defaulted.
    pub fn is_complete(&self, state: &RequirementState) -> bool {
        self.missing(state).is_empty()
    }

    /// JSON object template handed to the extraction prompt: field name to
    /// a description of what belongs there.
    pub fn structure_hint(&self) -> Value {
        let mut map = serde_json::Map::new();
        for field in &self.fields {
            let mut hint = format!("{} {}", field.kind.type_phrase(), field.description);
            match field.default {
                None => hint.push_str(" Use null if the user has not provided this."),
                // An empty-string default marks free text the model always fills.
                Some(Value::String(ref s)) if s.is_empty() => {}
                Some(ref default) => {
                    hint.push_str(&format!(" Assume {default} unless the user says otherwise."));
                }
            }
            map.insert(field.name.to_string(), Value::String(hint));
        }
        Value::Object(map)
    }

    /// Bullet list of the fields to gather, for the requirement-gathering prompt.
    pub fn description_lines(&self) -> String {
        self.fields
            .iter()
            .filter(|f| f.name != "reasoning")
            .map(|f| {
                let mut line = format!("- {}: {}", f.name, f.description);
                if let Some(ref default) = f.default {
                    line.push_str(&format!(" (assumed {default} unless specified)"));
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
