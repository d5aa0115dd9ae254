//! Chat transcript, session state, and agent metadata.

use serde::{Deserialize, Serialize};

/// The author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    /// The human user.
    User,
    /// The agent.
    Bot,
}

/// A single entry in the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who authored this message.
    pub sender: Sender,
    /// The message text.
    pub text: String,
}

impl ChatMessage {
    /// Create a user message.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    /// Create a bot message.
    #[must_use]
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
        }
    }
}

/// Append-only ordered sequence of chat messages.
///
/// While a streamed reply is in progress the trailing bot message is extended
/// in place rather than a new entry being appended; everything else (user
/// input, error messages) goes through [`push`](Self::push).
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    /// Create an empty transcript.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message as a new entry.
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Streaming append: concatenate onto a trailing bot message, or start a
    /// new bot message when the last entry is not one.
    pub fn append_delta(&mut self, text: &str) {
        match self.messages.last_mut() {
            Some(last) if last.sender == Sender::Bot => last.text.push_str(text),
            _ => self.messages.push(ChatMessage::bot(text)),
        }
    }

    /// All messages, oldest first.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The most recent message, if any.
    #[must_use]
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the transcript has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Mutable per-conversation state: the bearer token and the conversation
/// context id.
///
/// Created at initialization and owned by whoever drives the conversation —
/// never ambient state. The context id is learned from the first stream event
/// that carries one and is immutable for the remainder of the conversation;
/// re-initialization resets it to absent.
#[derive(Debug, Clone, Default)]
pub struct Session {
    bearer_token: Option<String>,
    context_id: Option<String>,
}

impl Session {
    /// Create a fresh session with no token and no context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The bearer token, when authentication is enabled.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer_token.as_deref()
    }

    /// Replace the bearer token (`None` disables the Authorization header).
    pub fn set_bearer_token(&mut self, token: Option<String>) {
        self.bearer_token = token;
    }

    /// The conversation context id, once one has been learned.
    #[must_use]
    pub fn context_id(&self) -> Option<&str> {
        self.context_id.as_deref()
    }

    /// Store the context id unless one has already been learned. The first
    /// observed id wins for the whole conversation.
    pub fn capture_context_id(&mut self, id: &str) {
        if self.context_id.is_none() {
            self.context_id = Some(id.to_string());
        }
    }

    /// Forget the conversation context. Called on re-initialization.
    pub fn reset_context(&mut self) {
        self.context_id = None;
    }
}

/// Agent card published at `/.well-known/agent.json`.
///
/// Parsed permissively: every field is optional and unknown fields are
/// ignored, since cards vary between agent frameworks.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AgentCard {
    /// Display name of the agent.
    pub name: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Capability flags (e.g. `"streaming": true`).
    pub capabilities: serde_json::Map<String, serde_json::Value>,
    /// Skills the agent advertises.
    pub skills: Vec<AgentSkill>,
}

/// One advertised skill on an [`AgentCard`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AgentSkill {
    /// Skill name.
    pub name: Option<String>,
    /// Skill description.
    pub description: Option<String>,
}

/// Reply from the non-streaming `message/send` variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentReply {
    /// The reply text.
    pub text: String,
    /// Conversation context id, when the reply carries one.
    pub context_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_delta_extends_trailing_bot_message() {
        let mut transcript = Transcript::new();
        transcript.push(ChatMessage::user("hi"));
        transcript.append_delta("Hel");
        transcript.append_delta("lo");

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.last().map(|m| m.text.as_str()), Some("Hello"));
        assert_eq!(transcript.last().map(|m| m.sender), Some(Sender::Bot));
    }

    #[test]
    fn append_delta_starts_new_message_after_user_entry() {
        let mut transcript = Transcript::new();
        transcript.append_delta("first");
        transcript.push(ChatMessage::user("question"));
        transcript.append_delta("second");

        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.messages()[0].text, "first");
        assert_eq!(transcript.messages()[2].text, "second");
    }

    #[test]
    fn pushed_bot_message_is_never_merged() {
        let mut transcript = Transcript::new();
        transcript.append_delta("partial out");
        transcript.push(ChatMessage::bot("Error: connection reset"));

        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.messages()[0].text, "partial out");
    }

    #[test]
    fn context_id_is_write_once() {
        let mut session = Session::new();
        session.capture_context_id("A");
        session.capture_context_id("B");
        assert_eq!(session.context_id(), Some("A"));
    }

    #[test]
    fn reset_context_allows_a_new_conversation() {
        let mut session = Session::new();
        session.capture_context_id("A");
        session.reset_context();
        assert_eq!(session.context_id(), None);
        session.capture_context_id("B");
        assert_eq!(session.context_id(), Some("B"));
    }

    #[test]
    fn agent_card_parses_permissively() {
        let card: AgentCard = serde_json::from_str(
            r#"{"name":"Test Agent","capabilities":{"streaming":true},"skills":[{"name":"faq"}],"version":"9"}"#,
        )
        .unwrap();
        assert_eq!(card.name.as_deref(), Some("Test Agent"));
        assert_eq!(card.skills.len(), 1);
        assert!(card.description.is_none());
    }
}
