//! Function definitions offered to the model and tool-call argument handling.

use crate::capability::Capability;
use crate::error::{LearnPathError, Result};
use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};
use serde_json::{Map, Value};

/// Build the function definitions for a capability list.
pub fn tool_definitions(capabilities: &[Capability]) -> Vec<ChatCompletionTool> {
    capabilities
        .iter()
        .map(|capability| ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: capability.name.clone(),
                description: capability.description.clone(),
                parameters: Some(sanitize_schema(&capability.input_schema)),
                strict: None,
            },
        })
        .collect()
}

/// Remove the `$schema` keyword, which the chat completions API rejects,
/// from an MCP input schema. An empty schema becomes an empty object schema.
pub fn sanitize_schema(schema: &Value) -> Value {
    match strip_schema_keyword(schema) {
        Value::Object(map) if map.is_empty() => {
            serde_json::json!({ "type": "object", "properties": {} })
        }
        Value::Null => serde_json::json!({ "type": "object", "properties": {} }),
        cleaned => cleaned,
    }
}

fn strip_schema_keyword(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| key.as_str() != "$schema")
                .map(|(key, value)| (key.clone(), strip_schema_keyword(value)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(strip_schema_keyword).collect()),
        other => other.clone(),
    }
}

/// Parse the model's argument string, dropping `null` fields.
///
/// Models often emit `null` for optional parameters, which most MCP servers
/// reject during validation.
pub fn parse_tool_arguments(arguments: &str) -> Result<Value> {
    let trimmed = arguments.trim();
    if trimmed.is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    let value: Value = serde_json::from_str(trimmed)
        .map_err(|e| LearnPathError::Agent(format!("Invalid tool arguments: {}", e)))?;

    match value {
        Value::Object(map) => Ok(Value::Object(
            map.into_iter().filter(|(_, v)| !v.is_null()).collect(),
        )),
        Value::Null => Ok(Value::Object(Map::new())),
        other => Err(LearnPathError::Agent(format!(
            "Tool arguments must be an object, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::BucketKey;
    use serde_json::json;

    #[test]
    fn test_definitions_strip_schema_keyword() {
        let mut capability = Capability::new("youtube-search", BucketKey::Youtube);
        capability.description = Some("Search videos".to_string());
        capability.input_schema = json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "properties": { "query": { "type": "string" } },
            "required": ["query"]
        });

        let tools = tool_definitions(&[capability]);
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].function.name, "youtube-search");
        assert_eq!(
            tools[0].function.parameters,
            Some(json!({
                "type": "object",
                "properties": { "query": { "type": "string" } },
                "required": ["query"]
            }))
        );
    }

    #[test]
    fn test_empty_schema_becomes_object() {
        assert_eq!(
            sanitize_schema(&json!({})),
            json!({ "type": "object", "properties": {} })
        );
        let nested = json!({ "type": "object", "properties": { "opts": { "$schema": "x", "type": "object", "properties": {} } } });
        assert_eq!(
            sanitize_schema(&nested),
            json!({ "type": "object", "properties": { "opts": { "type": "object", "properties": {} } } })
        );
    }

    #[test]
    fn test_parse_arguments_drops_nulls() {
        let args = parse_tool_arguments(r#"{"query": "rust", "limit": null}"#).unwrap();
        assert_eq!(args, json!({ "query": "rust" }));
    }

    #[test]
    fn test_parse_empty_arguments() {
        assert_eq!(parse_tool_arguments("").unwrap(), json!({}));
        assert_eq!(parse_tool_arguments("null").unwrap(), json!({}));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(parse_tool_arguments("[1, 2]").is_err());
        assert!(parse_tool_arguments("{broken").is_err());
    }
}
