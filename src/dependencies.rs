//! Side-channel dependency declarations and their validator.
//!
//! Callers may hand the extractor extra values alongside the file (a PAN
//! number they already know, a deductor record from a previous run, …).
//! Each document type declares which values it understands through a
//! [`DependencyContract`]; [`DependencyValidator::validate`] filters and
//! checks the caller's map before any I/O happens.
//!
//! Two contract shapes are supported:
//!
//! * **Typed**: a list of [`DependencySpec`]s, each with a closed
//!   [`DependencyKind`] checked structurally against a JSON value.
//! * **JSON schema**: an object with `properties` and `required`, checked
//!   on required-membership and primitive `type` tags only.
//!
//! Keys that the contract does not declare are dropped silently.

use crate::error::DocExtractError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::debug;

/// Validated dependency values, keyed by name.
pub type Dependencies = Map<String, Value>;

/// The kinds of value a dependency may declare.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    String,
    Number,
    Boolean,
    /// A JSON object carrying at least the listed keys.
    Record { fields: Vec<String> },
    /// A JSON array whose every element matches the inner kind.
    List(Box<DependencyKind>),
}

impl DependencyKind {
    /// Shorthand for a record kind.
    pub fn record<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DependencyKind::Record {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Shorthand for a list kind.
    pub fn list_of(inner: DependencyKind) -> Self {
        DependencyKind::List(Box::new(inner))
    }

    /// Structural check of `value` against this kind.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            DependencyKind::String => value.is_string(),
            DependencyKind::Number => value.is_number(),
            DependencyKind::Boolean => value.is_boolean(),
            DependencyKind::Record { fields } => value
                .as_object()
                .is_some_and(|obj| fields.iter().all(|f| obj.contains_key(f))),
            DependencyKind::List(inner) => value
                .as_array()
                .is_some_and(|items| items.iter().all(|item| inner.matches(item))),
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyKind::String => f.write_str("string"),
            DependencyKind::Number => f.write_str("number"),
            DependencyKind::Boolean => f.write_str("boolean"),
            DependencyKind::Record { fields } => write!(f, "record{{{}}}", fields.join(", ")),
            DependencyKind::List(inner) => write!(f, "list of {inner}"),
        }
    }
}

/// One declared side-channel value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySpec {
    pub name: String,
    pub kind: DependencyKind,
    pub description: String,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl DependencySpec {
    /// A required dependency.
    pub fn required(
        name: impl Into<String>,
        kind: DependencyKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            required: true,
        }
    }

    /// An optional dependency.
    pub fn optional(
        name: impl Into<String>,
        kind: DependencyKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind, description)
        }
    }
}

/// The full side-channel contract for one document type.
#[derive(Debug, Clone, PartialEq)]
pub enum DependencyContract {
    Typed(Vec<DependencySpec>),
    JsonSchema(Value),
}

impl Default for DependencyContract {
    fn default() -> Self {
        DependencyContract::Typed(Vec::new())
    }
}

impl DependencyContract {
    /// Build a contract from a JSON description.
    ///
    /// An object with a `properties` key is taken as a JSON schema; anything
    /// else must deserialise as a list of [`DependencySpec`]s.
    pub fn from_value(value: Value) -> Result<Self, DocExtractError> {
        if value.get("properties").is_some() {
            return Ok(DependencyContract::JsonSchema(value));
        }
        let specs: Vec<DependencySpec> = serde_json::from_value(value).map_err(|e| {
            DocExtractError::InvalidConfig(format!("invalid dependency declarations: {e}"))
        })?;
        Ok(DependencyContract::Typed(specs))
    }

    /// True when the contract declares nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            DependencyContract::Typed(specs) => specs.is_empty(),
            DependencyContract::JsonSchema(schema) => schema
                .get("properties")
                .and_then(Value::as_object)
                .is_none_or(|p| p.is_empty()),
        }
    }
}

/// Pre-filter applied to caller-supplied dependencies.
#[derive(Debug, Clone, Default)]
pub struct DependencyValidator {
    contract: DependencyContract,
}

impl DependencyValidator {
    pub fn new(contract: DependencyContract) -> Self {
        Self { contract }
    }

    pub fn contract(&self) -> &DependencyContract {
        &self.contract
    }

    /// Check `provided` against the contract and return only declared keys.
    pub fn validate(&self, provided: &Dependencies) -> Result<Dependencies, DocExtractError> {
        let validated = match &self.contract {
            DependencyContract::Typed(specs) => validate_typed(specs, provided)?,
            DependencyContract::JsonSchema(schema) => validate_schema(schema, provided)?,
        };
        let dropped = provided.len() - validated.len();
        if dropped > 0 {
            debug!("Dropped {} undeclared dependencies", dropped);
        }
        Ok(validated)
    }
}

fn validate_typed(
    specs: &[DependencySpec],
    provided: &Dependencies,
) -> Result<Dependencies, DocExtractError> {
    let mut validated = Dependencies::new();
    for spec in specs {
        match provided.get(&spec.name) {
            None if spec.required => {
                return Err(DocExtractError::MissingDependency {
                    name: spec.name.clone(),
                })
            }
            None => {}
            Some(value) => {
                if !spec.kind.matches(value) {
                    return Err(DocExtractError::DependencyTypeMismatch {
                        name: spec.name.clone(),
                        expected: spec.kind.to_string(),
                    });
                }
                validated.insert(spec.name.clone(), value.clone());
            }
        }
    }
    Ok(validated)
}

fn validate_schema(schema: &Value, provided: &Dependencies) -> Result<Dependencies, DocExtractError> {
    let mut validated = Dependencies::new();
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Ok(validated);
    };
    let required: Vec<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|r| r.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    for (name, field_schema) in properties {
        let Some(value) = provided.get(name) else {
            if required.contains(&name.as_str()) {
                return Err(DocExtractError::MissingDependency { name: name.clone() });
            }
            continue;
        };
        if let Some(type_tag) = field_schema.get("type").and_then(Value::as_str) {
            if !type_tag_matches(type_tag, value) {
                return Err(DocExtractError::DependencyTypeMismatch {
                    name: name.clone(),
                    expected: type_tag.to_string(),
                });
            }
        }
        validated.insert(name.clone(), value.clone());
    }
    Ok(validated)
}

/// Unknown tags are accepted as-is.
fn type_tag_matches(tag: &str, value: &Value) -> bool {
    match tag {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        _ => true,
    }
}
