use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

use super::base::{Provider, Usage};
use super::configs::{AnthropicProviderConfig, DEFAULT_MAX_TOKENS};
use super::utils::role_name;
use crate::models::message::{Message, MessageContent};
use crate::models::tool::{Tool, ToolCall};

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    client: Client,
    config: AnthropicProviderConfig,
}

impl AnthropicProvider {
    pub fn new(config: AnthropicProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self { client, config })
    }

    fn get_usage(data: &Value) -> Usage {
        let usage = match data.get("usage") {
            Some(usage) => usage,
            None => return Usage::default(),
        };

        let input_tokens = usage
            .get("input_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);
        let output_tokens = usage
            .get("output_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);
        let total_tokens = match (input_tokens, output_tokens) {
            (Some(input), Some(output)) => Some(input + output),
            _ => None,
        };

        Usage::new(input_tokens, output_tokens, total_tokens)
    }

    async fn post(&self, payload: Value) -> Result<Value> {
        let url = format!("{}/v1/messages", self.config.host.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&payload)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status => {
                let error_text = response.text().await?;
                Err(anyhow!("Request failed: {} - {}", status, error_text))
            }
        }
    }
}

/// Convert internal Message format to Anthropic's content-block message specification
pub fn messages_to_anthropic_spec(messages: &[Message]) -> Vec<Value> {
    let mut anthropic_messages = Vec::new();

    for message in messages {
        let mut blocks = Vec::new();
        for content in &message.content {
            match content {
                MessageContent::Text(text) => {
                    // The API rejects empty text blocks
                    if !text.text.is_empty() {
                        blocks.push(json!({"type": "text", "text": text.text}));
                    }
                }
                MessageContent::ToolRequest(request) => {
                    let input = match &request.tool_call.arguments {
                        Value::Object(_) => request.tool_call.arguments.clone(),
                        _ => json!({}),
                    };
                    blocks.push(json!({
                        "type": "tool_use",
                        "id": request.id,
                        "name": request.tool_call.name,
                        "input": input,
                    }));
                }
                MessageContent::ToolResponse(response) => {
                    blocks.push(json!({
                        "type": "tool_result",
                        "tool_use_id": response.id,
                        "content": response.text(),
                        "is_error": response.is_error(),
                    }));
                }
            }
        }

        if blocks.is_empty() {
            continue;
        }
        anthropic_messages.push(json!({
            "role": role_name(&message.role),
            "content": blocks,
        }));
    }

    anthropic_messages
}

/// Convert internal Tool format to Anthropic's API tool specification
pub fn tools_to_anthropic_spec(tools: &[Tool]) -> Vec<Value> {
    tools
        .iter()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
                "input_schema": tool.input_schema,
            })
        })
        .collect()
}

/// Convert Anthropic's API response to internal Message format
pub fn anthropic_response_to_message(response: &Value) -> Result<Message> {
    let blocks = response
        .get("content")
        .and_then(|c| c.as_array())
        .ok_or_else(|| anyhow!("Invalid response format from Anthropic API"))?;

    let mut message = Message::assistant();
    for block in blocks {
        match block.get("type").and_then(|t| t.as_str()) {
            Some("text") => {
                let text = block.get("text").and_then(|t| t.as_str()).unwrap_or_default();
                message = message.with_text(text);
            }
            Some("tool_use") => {
                let id = block.get("id").and_then(|v| v.as_str()).unwrap_or_default();
                let name = block.get("name").and_then(|v| v.as_str()).unwrap_or_default();
                let input = block.get("input").cloned().unwrap_or_else(|| json!({}));
                message = message.with_tool_request(id, ToolCall::new(name, input));
            }
            other => {
                tracing::debug!(block_type = ?other, "skipping unsupported content block");
            }
        }
    }

    Ok(message)
}

#[async_trait]
impl Provider for AnthropicProvider {
    async fn complete(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[Tool],
    ) -> Result<(Message, Usage)> {
        let mut payload = json!({
            "model": self.config.model,
            "messages": messages_to_anthropic_spec(messages),
            "max_tokens": self.config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        });

        if let Some(object) = payload.as_object_mut() {
            if !system.is_empty() {
                object.insert("system".to_string(), json!(system));
            }
            if !tools.is_empty() {
                object.insert("tools".to_string(), json!(tools_to_anthropic_spec(tools)));
            }
            if let Some(temp) = self.config.temperature {
                object.insert("temperature".to_string(), json!(temp));
            }
        }

        tracing::debug!(model = %self.config.model, messages = messages.len(), "sending request");
        let response = self.post(payload).await?;

        let message = anthropic_response_to_message(&response)?;
        let usage = Self::get_usage(&response);

        Ok((message, usage))
    }
}
