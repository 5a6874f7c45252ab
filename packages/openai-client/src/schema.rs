//! JSON schemas for structured output, derived from Rust types.
//!
//! OpenAI strict mode rejects most of what `schemars` emits by default, so
//! the generated schema is rewritten before it is sent:
//!
//! 1. every object gets `additionalProperties: false`
//! 2. every property is listed in `required` (nullable ones included)
//! 3. `$ref`s are inlined and the `definitions` table is dropped

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// A type the model can be asked to produce.
///
/// Blanket-implemented for anything `JsonSchema + DeserializeOwned`.
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    fn openai_schema() -> Value {
        let root = schema_for!(Self);
        let mut value = serde_json::to_value(root).unwrap_or_default();

        let definitions = match &mut value {
            Value::Object(map) => {
                map.remove("$schema");
                map.remove("definitions")
            }
            _ => None,
        };

        if let Some(Value::Object(defs)) = definitions {
            inline_refs(&mut value, &defs);
        }
        tighten_objects(&mut value);

        value
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredOutput for T {}

fn tighten_objects(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if map.get("type").and_then(Value::as_str) == Some("object") {
                map.insert("additionalProperties".to_string(), Value::Bool(false));

                let required: Option<Vec<Value>> = map
                    .get("properties")
                    .and_then(Value::as_object)
                    .map(|props| props.keys().cloned().map(Value::String).collect());
                if let Some(required) = required {
                    map.insert("required".to_string(), Value::Array(required));
                }
            }
            for nested in map.values_mut() {
                tighten_objects(nested);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(tighten_objects),
        _ => {}
    }
}

fn inline_refs(value: &mut Value, definitions: &Map<String, Value>) {
    match value {
        Value::Object(map) => {
            let target = map
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(|path| path.strip_prefix("#/definitions/"))
                .and_then(|name| definitions.get(name))
                .cloned();

            if let Some(mut resolved) = target {
                inline_refs(&mut resolved, definitions);
                *value = resolved;
                return;
            }
            for nested in map.values_mut() {
                inline_refs(nested, definitions);
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                inline_refs(item, definitions);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[allow(dead_code)]
    #[derive(Deserialize, JsonSchema)]
    struct Group {
        members: Vec<String>,
        reason: Option<String>,
    }

    #[allow(dead_code)]
    #[derive(Deserialize, JsonSchema)]
    struct Proposal {
        groups: Vec<Group>,
    }

    #[test]
    fn test_root_has_no_definitions_or_schema_marker() {
        let schema = Proposal::openai_schema();
        let root = schema.as_object().unwrap();

        assert!(!root.contains_key("definitions"));
        assert!(!root.contains_key("$schema"));
        assert_eq!(root.get("additionalProperties"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_nested_group_is_inlined_and_strict() {
        let schema = Proposal::openai_schema();
        let group = &schema["properties"]["groups"]["items"];

        assert!(group.get("$ref").is_none(), "group should be inlined");
        assert_eq!(group["type"], "object");
        assert_eq!(group["additionalProperties"], false);

        let required: Vec<&str> = group["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(Value::as_str)
            .collect();
        assert!(required.contains(&"members"));
        assert!(required.contains(&"reason"), "nullable fields are still required");
    }
}
