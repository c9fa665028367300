use crate::message::{Message, Role};

/// In-memory transcript storage.
#[derive(Default, Clone, Debug)]
pub struct ConversationMemory {
    messages: Vec<Message>,
}

impl ConversationMemory {
    pub fn with_messages(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_of(&self, role: Role) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == role)
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

    #[test]
    fn finds_latest_message_for_role() {
        let memory = ConversationMemory::with_messages(vec![
            Message::user("first"),
            Message::assistant("reply"),
            Message::user("second"),
        ]);

        assert_eq!(memory.len(), 3);
        assert_eq!(memory.last_of(Role::User).unwrap().content, "second");
        assert!(memory.last_of(Role::Tool).is_none());
    }
}
