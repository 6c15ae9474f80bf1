use anyhow::{anyhow, Result};
use serde_json::{json, Value};
use std::collections::HashSet;

use crate::models::message::{Message, MessageContent};
use crate::models::role::Role;
use crate::models::tool::{Tool, ToolCall};

/// Convert internal Message format to OpenAI's API message specification
///
/// Tool responses become separate `tool` role messages that follow the message they came from.
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    let mut messages_spec = Vec::new();

    for message in messages {
        let mut converted = json!({
            "role": message.role
        });
        let mut texts = Vec::new();
        let mut tool_calls = Vec::new();
        let mut output = Vec::new();

        for content in &message.content {
            match content {
                MessageContent::Text(text) => {
                    if !text.text.is_empty() {
                        texts.push(text.text.as_str());
                    }
                }
                MessageContent::ToolRequest(request) => {
                    tool_calls.push(json!({
                        "id": request.id,
                        "type": "function",
                        "function": {
                            "name": request.tool_call.name,
                            "arguments": arguments_to_string(&request.tool_call.arguments),
                        }
                    }));
                }
                MessageContent::ToolResponse(response) => {
                    let content = match &response.tool_result {
                        Ok(text) => text.clone(),
                        // A tool result error is shown as output so the model can interpret the error message
                        Err(e) => format!("The tool call returned the following error:\n{}", e),
                    };
                    output.push(json!({
                        "role": "tool",
                        "content": content,
                        "tool_call_id": response.id
                    }));
                }
            }
        }

        if !texts.is_empty() {
            converted["content"] = json!(texts.join("\n"));
        }
        if !tool_calls.is_empty() {
            converted["tool_calls"] = json!(tool_calls);
        }
        if converted.get("content").is_some() || converted.get("tool_calls").is_some() {
            output.insert(0, converted);
        }
        messages_spec.extend(output);
    }

    messages_spec
}

/// Arguments the model sent as unparsable text go back exactly as they came
fn arguments_to_string(arguments: &Value) -> String {
    match arguments {
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}

/// Convert internal Tool format to OpenAI's API tool specification
pub fn tools_to_openai_spec(tools: &[Tool]) -> Result<Vec<Value>> {
    let mut tool_names = HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(anyhow!("Duplicate tool name: {}", tool.name));
        }

        result.push(json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.input_schema,
            }
        }));
    }

    Ok(result)
}

/// Convert OpenAI's API response to internal Message format
pub fn openai_response_to_message(response: &Value) -> Result<Message> {
    let original = response
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| anyhow!("Invalid response format from OpenAI API"))?;
    let mut message = Message::assistant();

    if let Some(text) = original.get("content").and_then(|t| t.as_str()) {
        if !text.is_empty() {
            message = message.with_text(text);
        }
    }

    if let Some(tool_calls) = original.get("tool_calls").and_then(|t| t.as_array()) {
        for tool_call in tool_calls {
            let id = tool_call["id"].as_str().unwrap_or_default().to_string();
            let function_name = tool_call["function"]["name"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            let arguments = tool_call["function"]["arguments"]
                .as_str()
                .unwrap_or_default();

            message = message.with_tool_request(
                id,
                ToolCall::new(function_name, parse_arguments(arguments)),
            );
        }
    }

    Ok(message)
}

/// Parse the JSON-encoded argument string of a tool call.
///
/// Text that is not JSON is kept as a string value; the tool rejects it when it runs, so the
/// model sees the failure as a tool result.
pub fn parse_arguments(arguments: &str) -> Value {
    if arguments.trim().is_empty() {
        return json!({});
    }
    match serde_json::from_str::<Value>(arguments) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "could not parse tool call arguments");
            Value::String(arguments.to_string())
        }
    }
}

pub(crate) fn role_name(role: &Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AgentError;

    const OPENAI_TOOL_USE_RESPONSE: &str = r#"{
        "choices": [{
            "role": "assistant",
            "message": {
                "tool_calls": [{
                    "id": "1",
                    "function": {
                        "name": "read_file",
                        "arguments": "{\"path\": \"main.go\"}"
                    }
                }]
            }
        }],
        "usage": {
            "input_tokens": 10,
            "output_tokens": 25,
            "total_tokens": 35
        }
    }"#;

    #[test]
    fn test_messages_to_openai_spec() -> Result<()> {
        let message = Message::user().with_text("Hello");
        let spec = messages_to_openai_spec(&[message]);

        assert_eq!(spec.len(), 1);
        assert_eq!(spec[0]["role"], "user");
        assert_eq!(spec[0]["content"], "Hello");
        Ok(())
    }

    #[test]
    fn test_messages_to_openai_spec_joins_text_blocks() {
        let message = Message::assistant()
            .with_text("First paragraph.")
            .with_text("Second paragraph.");
        let spec = messages_to_openai_spec(&[message]);

        assert_eq!(spec.len(), 1);
        assert_eq!(spec[0]["content"], "First paragraph.\nSecond paragraph.");
    }

    #[test]
    fn test_messages_to_openai_spec_with_tool_round() -> Result<()> {
        let messages = vec![
            Message::user().with_text("What is in main.go?"),
            Message::assistant()
                .with_text("Let me look.")
                .with_tool_request("call_1", ToolCall::new("read_file", json!({"path": "main.go"}))),
            Message::user()
                .with_tool_response("call_1", Ok("package main".to_string())),
        ];
        let spec = messages_to_openai_spec(&messages);

        assert_eq!(spec.len(), 3);
        assert_eq!(spec[1]["role"], "assistant");
        assert_eq!(spec[1]["content"], "Let me look.");
        assert_eq!(spec[1]["tool_calls"][0]["id"], "call_1");
        assert_eq!(spec[1]["tool_calls"][0]["function"]["name"], "read_file");
        assert_eq!(
            spec[1]["tool_calls"][0]["function"]["arguments"],
            "{\"path\":\"main.go\"}"
        );
        assert_eq!(spec[2]["role"], "tool");
        assert_eq!(spec[2]["tool_call_id"], "call_1");
        assert_eq!(spec[2]["content"], "package main");
        Ok(())
    }

    #[test]
    fn test_messages_to_openai_spec_with_tool_error() -> Result<()> {
        let message = Message::user()
            .with_tool_response("call_2", Err(AgentError::ToolNotFound("nope".into())));
        let spec = messages_to_openai_spec(&[message]);

        assert_eq!(spec.len(), 1);
        assert_eq!(spec[0]["role"], "tool");
        assert_eq!(
            spec[0]["content"],
            "The tool call returned the following error:\ntool not found"
        );
        Ok(())
    }

    #[test]
    fn test_raw_arguments_are_sent_back_verbatim() {
        let message = Message::assistant().with_tool_request(
            "call_3",
            ToolCall::new("edit_file", Value::String("{\"path\": ".into())),
        );
        let spec = messages_to_openai_spec(&[message]);
        assert_eq!(spec[0]["tool_calls"][0]["function"]["arguments"], "{\"path\": ");
    }

    #[test]
    fn test_tools_to_openai_spec() -> Result<()> {
        let tool = Tool::new(
            "test_tool",
            "A test tool",
            json!({
                "type": "object",
                "properties": {
                    "input": {
                        "type": "string",
                        "description": "Test parameter"
                    }
                },
                "required": ["input"]
            }),
        );

        let spec = tools_to_openai_spec(&[tool])?;

        assert_eq!(spec.len(), 1);
        assert_eq!(spec[0]["type"], "function");
        assert_eq!(spec[0]["function"]["name"], "test_tool");
        assert_eq!(spec[0]["function"]["parameters"]["required"][0], "input");
        Ok(())
    }

    #[test]
    fn test_tools_to_openai_spec_duplicate() {
        let tool = Tool::new("dup", "A tool", json!({"type": "object", "properties": {}}));
        let result = tools_to_openai_spec(&[tool.clone(), tool]);
        assert!(result.unwrap_err().to_string().contains("Duplicate tool name"));
    }

    #[test]
    fn test_openai_response_to_message_text() -> Result<()> {
        let response = json!({
            "choices": [{
                "role": "assistant",
                "message": {
                    "content": "Hello from John Cena!"
                }
            }]
        });

        let message = openai_response_to_message(&response)?;
        assert_eq!(message.content.len(), 1);
        assert_eq!(message.text(), "Hello from John Cena!");
        assert!(matches!(message.role, Role::Assistant));
        Ok(())
    }

    #[test]
    fn test_openai_response_to_message_valid_tooluse() -> Result<()> {
        let response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE)?;
        let message = openai_response_to_message(&response)?;

        let requests = message.tool_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].id, "1");
        assert_eq!(requests[0].tool_call.name, "read_file");
        assert_eq!(requests[0].tool_call.arguments, json!({"path": "main.go"}));
        Ok(())
    }

    #[test]
    fn test_openai_response_to_message_json_decode_error() -> Result<()> {
        let mut response: Value = serde_json::from_str(OPENAI_TOOL_USE_RESPONSE)?;
        response["choices"][0]["message"]["tool_calls"][0]["function"]["arguments"] =
            json!("invalid json {");

        let message = openai_response_to_message(&response)?;
        let requests = message.tool_requests();
        assert_eq!(
            requests[0].tool_call.arguments,
            Value::String("invalid json {".into())
        );
        Ok(())
    }

    #[test]
    fn test_openai_response_missing_choices() {
        let result = openai_response_to_message(&json!({"error": "boom"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_arguments_empty_is_object() {
        assert_eq!(parse_arguments(""), json!({}));
        assert_eq!(parse_arguments("{}"), json!({}));
    }
}
