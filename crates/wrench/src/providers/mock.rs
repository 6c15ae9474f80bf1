use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::models::message::Message;
use crate::models::tool::Tool;
use crate::providers::base::{Provider, Usage};

#[derive(Debug, Clone)]
enum MockReply {
    Message(Message),
    Error(String),
}

/// A provider that plays back pre-configured replies and records every request.
///
/// Clones share their state, so a test can keep one handle and give the other to an agent.
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl MockProvider {
    /// Create a new mock provider with a sequence of responses
    pub fn new(responses: Vec<Message>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(
                responses.into_iter().map(MockReply::Message).collect(),
            )),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a transport failure after the responses already configured
    pub fn with_error<S: Into<String>>(self, error: S) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(MockReply::Error(error.into()));
        }
        self
    }

    /// The transcripts the provider has been called with, oldest first
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn complete(
        &self,
        _system: &str,
        messages: &[Message],
        _tools: &[Tool],
    ) -> Result<(Message, Usage)> {
        self.requests
            .lock()
            .map_err(|_| anyhow!("mock provider lock poisoned"))?
            .push(messages.to_vec());

        let reply = self
            .replies
            .lock()
            .map_err(|_| anyhow!("mock provider lock poisoned"))?
            .pop_front();
        match reply {
            Some(MockReply::Message(message)) => Ok((message, Usage::default())),
            Some(MockReply::Error(error)) => Err(anyhow!(error)),
            // Return empty response if no more pre-configured responses
            None => Ok((Message::assistant().with_text(""), Usage::default())),
        }
    }
}
