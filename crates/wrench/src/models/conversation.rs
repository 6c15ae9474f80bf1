use super::message::Message;

/// The ordered transcript of a session.
///
/// Messages can only be appended; nothing hands out mutable access to a stored message.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::role::Role;

    #[test]
    fn test_append_only_ordering() {
        let mut conversation = Conversation::new();
        assert!(conversation.is_empty());

        conversation.push(Message::user().with_text("hi"));
        conversation.push(Message::assistant().with_text("hello"));

        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.messages()[0].role, Role::User);
        assert_eq!(conversation.last().map(|m| m.text()), Some("hello".to_string()));
    }
}
