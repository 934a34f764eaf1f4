//! Tool input schemas: the required-argument check and full validation.
//!
//! Full validation compiles the schema once with `jsonschema` when the tool
//! is defined; every keyword the draft supports is enforced.

use std::fmt;
use std::sync::Arc;

use jsonschema::JSONSchema;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Invalid input schema: {0}")]
    InvalidDefinition(String),

    #[error("Invalid arguments: {}", .0.join("; "))]
    Validation(Vec<String>),
}

/// JSON Schema describing a tool's `arguments` object.
#[derive(Clone)]
pub struct InputSchema {
    schema: Value,
    /// `None` for [`InputSchema::empty`].
    compiled: Option<Arc<JSONSchema>>,
}

impl InputSchema {
    /// Compile a schema object. The root must be `"type": "object"` and the
    /// schema must itself be valid JSON Schema.
    pub fn new(schema: Value) -> Result<Self, SchemaError> {
        let obj = schema
            .as_object()
            .ok_or_else(|| SchemaError::InvalidDefinition("schema must be an object".into()))?;

        if obj.get("type").and_then(Value::as_str) != Some("object") {
            return Err(SchemaError::InvalidDefinition(
                "root type must be \"object\"".into(),
            ));
        }

        let compiled = JSONSchema::compile(&schema)
            .map_err(|e| SchemaError::InvalidDefinition(e.to_string()))?;

        Ok(Self {
            schema,
            compiled: Some(Arc::new(compiled)),
        })
    }

    /// `{"type": "object"}`: accepts any arguments object.
    pub fn empty() -> Self {
        Self {
            schema: json!({ "type": "object" }),
            compiled: None,
        }
    }

    pub fn required(&self) -> Vec<&str> {
        self.schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Required argument names absent from `arguments`, in schema order.
    pub fn missing_required_arguments(&self, arguments: &Value) -> Vec<String> {
        let provided = arguments.as_object();
        self.required()
            .into_iter()
            .filter(|name| !provided.is_some_and(|args| args.contains_key(*name)))
            .map(str::to_string)
            .collect()
    }

    /// Full validation; every violation is listed as `<pointer>: <message>`.
    pub fn validate_arguments(&self, arguments: &Value) -> Result<(), SchemaError> {
        let Some(compiled) = &self.compiled else {
            if arguments.is_object() {
                return Ok(());
            }
            return Err(SchemaError::Validation(vec![format!(
                "{arguments} is not of type \"object\""
            )]));
        };
        compiled.validate(arguments).map_err(|errors| {
            SchemaError::Validation(
                errors
                    .map(|e| {
                        let path = e.instance_path.to_string();
                        if path.is_empty() {
                            e.to_string()
                        } else {
                            format!("{path}: {e}")
                        }
                    })
                    .collect(),
            )
        })
    }
}

impl Default for InputSchema {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for InputSchema {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema
    }
}

impl fmt::Debug for InputSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InputSchema").field(&self.schema).finish()
    }
}

impl Serialize for InputSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.schema.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_schema() -> InputSchema {
        InputSchema::new(json!({
            "type": "object",
            "properties": {
                "a": { "type": "integer" },
                "b": { "type": "integer" },
                "mode": { "type": "string", "enum": ["fast", "exact"] }
            },
            "required": ["a", "b"]
        }))
        .unwrap()
    }

    #[test]
    fn test_rejects_bad_definitions() {
        assert!(InputSchema::new(json!({ "type": "string" })).is_err());
        assert!(InputSchema::new(json!([])).is_err());
        assert!(matches!(
            InputSchema::new(json!({ "type": "object", "required": [1] })),
            Err(SchemaError::InvalidDefinition(_))
        ));
        assert!(matches!(
            InputSchema::new(json!({ "type": "object", "properties": { "n": { "minimum": "zero" } } })),
            Err(SchemaError::InvalidDefinition(_))
        ));
    }

    #[test]
    fn test_empty_accepts_any_object() {
        let schema = InputSchema::empty();
        assert!(schema.validate_arguments(&json!({ "x": 1 })).is_ok());
        assert!(schema.validate_arguments(&json!([1])).is_err());
        assert_eq!(schema, InputSchema::default());
    }

    #[test]
    fn test_missing_required_in_schema_order() {
        let schema = add_schema();
        assert_eq!(schema.missing_required_arguments(&json!({})), vec!["a", "b"]);
        assert_eq!(schema.missing_required_arguments(&json!({ "b": 1 })), vec!["a"]);
        assert!(schema.missing_required_arguments(&json!({ "a": 1, "b": 2 })).is_empty());
    }

    #[test]
    fn test_type_mismatch_names_the_argument() {
        let err = add_schema()
            .validate_arguments(&json!({ "a": "one", "b": 2 }))
            .unwrap_err();
        let SchemaError::Validation(messages) = &err else {
            panic!("expected validation error, got {err}");
        };
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("/a: "), "{}", messages[0]);
        assert!(err.to_string().starts_with("Invalid arguments: /a: "));
    }

    #[test]
    fn test_enum() {
        let schema = add_schema();
        assert!(schema.validate_arguments(&json!({ "a": 1, "b": 2, "mode": "fast" })).is_ok());
        assert!(schema
            .validate_arguments(&json!({ "a": 1, "b": 2, "mode": "slow" }))
            .is_err());
    }

    #[test]
    fn test_closed_object_and_items() {
        let schema = InputSchema::new(json!({
            "type": "object",
            "properties": { "tags": { "type": "array", "items": { "type": "string" } } },
            "additionalProperties": false
        }))
        .unwrap();
        assert!(schema.validate_arguments(&json!({ "tags": ["x"] })).is_ok());
        assert!(schema.validate_arguments(&json!({ "tags": [1] })).is_err());
        assert!(schema.validate_arguments(&json!({ "other": true })).is_err());
    }

    #[test]
    fn test_numeric_string_and_composition_keywords() {
        let schema = InputSchema::new(json!({
            "type": "object",
            "properties": {
                "n": { "type": "integer", "minimum": 0 },
                "s": { "type": "string", "minLength": 3, "pattern": "^[a-z]+$" },
                "o": { "oneOf": [{ "type": "string" }, { "type": "integer" }] }
            }
        }))
        .unwrap();

        assert!(schema
            .validate_arguments(&json!({ "n": 5, "s": "abc", "o": 1 }))
            .is_ok());

        let err = schema
            .validate_arguments(&json!({ "n": -5, "s": "X!", "o": true }))
            .unwrap_err();
        let SchemaError::Validation(messages) = err else {
            panic!("expected validation error");
        };
        for pointer in ["/n: ", "/s: ", "/o: "] {
            assert!(
                messages.iter().any(|m| m.starts_with(pointer)),
                "{pointer} not in {messages:?}"
            );
        }
    }
}
