use crate::api::ChatMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    System,
    User,
    Assistant,
    /// Client-side status text shown to the user but never sent upstream.
    Notice,
    Error,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::System => "System",
            MessageKind::User => "User",
            MessageKind::Assistant => "Assistant",
            MessageKind::Notice => "Notice",
            MessageKind::Error => "Error",
        }
    }

    /// Text rendered in front of the first visual line of a message.
    pub fn prefix(self) -> &'static str {
        match self {
            MessageKind::User => "> ",
            MessageKind::System => "System: ",
            MessageKind::Assistant => "Assistant: ",
            MessageKind::Error => "Error: ",
            MessageKind::Notice => "",
        }
    }

    pub fn to_api_role(self) -> Option<&'static str> {
        match self {
            MessageKind::System => Some("system"),
            MessageKind::User => Some("user"),
            MessageKind::Assistant => Some("assistant"),
            MessageKind::Notice | MessageKind::Error => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub kind: MessageKind,
    pub content: String,
}

impl Message {
    pub fn new(kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageKind::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageKind::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageKind::Assistant, content)
    }

    pub fn notice(content: impl Into<String>) -> Self {
        Self::new(MessageKind::Notice, content)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(MessageKind::Error, content)
    }
}

/// Ordered conversation transcript.
///
/// Index 0 always holds the System message; it survives [`MessageStore::clear`].
#[derive(Debug, Clone)]
pub struct MessageStore {
    messages: Vec<Message>,
}

impl MessageStore {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Appends a message and returns its index.
    pub fn push(&mut self, message: Message) -> usize {
        self.messages.push(message);
        self.messages.len() - 1
    }

    /// Extends the Assistant message at `index` with a streamed delta.
    ///
    /// Returns false when `index` does not name an Assistant message.
    pub fn extend_assistant(&mut self, index: usize, delta: &str) -> bool {
        match self.messages.get_mut(index) {
            Some(message) if message.kind == MessageKind::Assistant => {
                message.content.push_str(delta);
                true
            }
            _ => false,
        }
    }

    /// Swaps the in-flight Assistant message at `index` for an Error message.
    pub fn fail_assistant(&mut self, index: usize, error: impl Into<String>) -> bool {
        match self.messages.get_mut(index) {
            Some(message) if message.kind == MessageKind::Assistant => {
                *message = Message::error(error);
                true
            }
            _ => false,
        }
    }

    /// Drops everything except the System message.
    pub fn clear(&mut self) {
        self.messages.truncate(1);
    }

    /// Builds the request payload: the System message followed by the most
    /// recent `limit` User/Assistant turns in conversation order.
    pub fn recent_history(&self, limit: usize) -> Vec<ChatMessage> {
        let mut history = Vec::with_capacity(limit + 1);
        if let Some(system) = self.messages.first() {
            history.push(ChatMessage::new("system", system.content.clone()));
        }

        let turns: Vec<&Message> = self
            .messages
            .iter()
            .skip(1)
            .filter(|message| {
                matches!(message.kind, MessageKind::User | MessageKind::Assistant)
                    && !message.content.is_empty()
            })
            .collect();
        let start = turns.len().saturating_sub(limit);

        history.extend(turns[start..].iter().filter_map(|message| {
            message
                .kind
                .to_api_role()
                .map(|role| ChatMessage::new(role, message.content.clone()))
        }));
        history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_keeps_only_system_message() {
        let mut store = MessageStore::new("be helpful");
        store.push(Message::notice("hello"));
        store.push(Message::user("hi"));
        store.clear();
        assert_eq!(store.len(), 1);
        assert_eq!(store.messages()[0], Message::system("be helpful"));
    }

    #[test]
    fn extend_assistant_rejects_other_kinds() {
        let mut store = MessageStore::new("sys");
        let user = store.push(Message::user("question"));
        let reply = store.push(Message::assistant(""));

        assert!(!store.extend_assistant(user, "x"));
        assert!(!store.extend_assistant(0, "x"));
        assert!(store.extend_assistant(reply, "Hel"));
        assert!(store.extend_assistant(reply, "lo"));
        assert_eq!(store.messages()[reply].content, "Hello");
        assert_eq!(store.messages()[user].content, "question");
    }

    #[test]
    fn fail_assistant_replaces_in_flight_message() {
        let mut store = MessageStore::new("sys");
        let reply = store.push(Message::assistant("partial"));
        assert!(store.fail_assistant(reply, "connection reset"));
        assert_eq!(store.messages()[reply], Message::error("connection reset"));
    }

    #[test]
    fn recent_history_skips_notices_and_limits_turns() {
        let mut store = MessageStore::new("sys");
        store.push(Message::notice("welcome"));
        for i in 0..5 {
            store.push(Message::user(format!("q{i}")));
            store.push(Message::assistant(format!("a{i}")));
        }
        store.push(Message::error("boom"));

        let history = store.recent_history(3);
        let rendered: Vec<(&str, &str)> = history
            .iter()
            .map(|m| (m.role.as_str(), m.content.as_str()))
            .collect();
        assert_eq!(
            rendered,
            vec![
                ("system", "sys"),
                ("assistant", "a3"),
                ("user", "q4"),
                ("assistant", "a4"),
            ]
        );
    }

    #[test]
    fn recent_history_omits_empty_assistant_placeholders() {
        let mut store = MessageStore::new("sys");
        store.push(Message::user("hi"));
        store.push(Message::assistant(""));
        let history = store.recent_history(20);
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].role, "user");
    }
}
