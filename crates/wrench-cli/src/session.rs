use anyhow::Result;
use futures::TryStreamExt;

use crate::prompt::{InputType, Prompt};
use wrench::agent::Agent;
use wrench::models::conversation::Conversation;
use wrench::models::message::Message;

/// Drives one interactive conversation: read a line, let the agent work, repeat.
///
/// Input is only requested once the model has finished a turn without asking for tools.
pub struct Session<'a> {
    agent: Agent,
    prompt: Box<dyn Prompt + 'a>,
    conversation: Conversation,
}

impl<'a> Session<'a> {
    pub fn new(agent: Agent, prompt: Box<dyn Prompt + 'a>) -> Self {
        Session {
            agent,
            prompt,
            conversation: Conversation::new(),
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub async fn start(&mut self) -> Result<()> {
        self.prompt.ready();

        loop {
            let input = self.prompt.get_input()?;
            match input.input_type {
                InputType::Message => {
                    if let Some(content) = &input.content {
                        self.conversation.push(Message::user().with_text(content));
                    }
                }
                InputType::Exit => break,
                InputType::AskAgain => continue,
            }

            if let Err(e) = self.agent_process_messages().await {
                self.prompt.close();
                return Err(e);
            }
        }

        self.prompt.close();
        Ok(())
    }

    /// Run a single user turn without asking for more input
    pub async fn headless_start(&mut self, initial_message: String) -> Result<()> {
        self.conversation
            .push(Message::user().with_text(initial_message));

        let result = self.agent_process_messages().await;
        self.prompt.close();
        result
    }

    async fn agent_process_messages(&mut self) -> Result<()> {
        self.prompt.show_busy();
        let result = self.stream_reply().await;
        self.prompt.hide_busy();
        result
    }

    async fn stream_reply(&mut self) -> Result<()> {
        let mut stream = self.agent.reply(self.conversation.messages()).await?;
        while let Some(message) = stream.try_next().await? {
            tracing::debug!(
                role = ?message.role,
                tool_requests = message.tool_requests().len(),
                "received message"
            );
            self.conversation.push(message.clone());

            self.prompt.hide_busy();
            self.prompt.render(Box::new(message));
            self.prompt.show_busy();
        }
        Ok(())
    }
}
