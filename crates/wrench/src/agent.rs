use anyhow::Result;
use futures::stream::BoxStream;

use crate::models::message::Message;
use crate::models::tool::Tool;
use crate::providers::base::Provider;
use crate::registry::ToolRegistry;

/// Agent pairs a language model with the tools it is allowed to call
pub struct Agent {
    provider: Box<dyn Provider>,
    registry: ToolRegistry,
    system_prompt: String,
}

impl Agent {
    pub fn new(provider: Box<dyn Provider>, registry: ToolRegistry) -> Self {
        Self {
            provider,
            registry,
            system_prompt: String::new(),
        }
    }

    /// Instructions sent ahead of the transcript on every model call
    pub fn with_system_prompt<S: Into<String>>(mut self, system_prompt: S) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn tools(&self) -> Vec<Tool> {
        self.registry.tools()
    }

    /// Create a stream that yields each message as it's generated by the agent.
    ///
    /// Every model message is yielded first. When it asks for tools, the calls run one at a time
    /// in the order requested and a single user message carrying all of their results follows,
    /// then the model is called again without waiting for new input. The stream ends after a
    /// model message that requests no tools, or with the first provider error.
    pub async fn reply(&self, messages: &[Message]) -> Result<BoxStream<'_, Result<Message>>> {
        let mut messages = messages.to_vec();
        let tools = self.registry.tools();

        Ok(Box::pin(async_stream::try_stream! {
            loop {
                let (response, usage) = self.provider.complete(
                    &self.system_prompt,
                    &messages,
                    &tools,
                ).await?;
                tracing::debug!(
                    input_tokens = ?usage.input_tokens,
                    output_tokens = ?usage.output_tokens,
                    "model replied"
                );

                yield response.clone();

                // Make sure the consumer sees the request before a potentially slow tool runs
                tokio::task::yield_now().await;

                if !response.has_tool_requests() {
                    break;
                }

                let mut tool_results = Message::user();
                for request in response.tool_requests() {
                    let output = self.registry.dispatch(&request.tool_call);
                    tool_results = tool_results.with_tool_response(request.id.clone(), output);
                }

                yield tool_results.clone();

                messages.push(response);
                messages.push(tool_results);
            }
        }))
    }
}
