//! Conversation domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a persisted message.
///
/// Anything other than `user` or `assistant` found on disk decodes to
/// [`Role::Unknown`] so older or foreign files still load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    #[serde(other)]
    Unknown,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single persisted message. Immutable once appended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// A message authored by the user.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// A message authored by the assistant.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// An ordered, chronological sequence of messages plus its metadata.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

impl Conversation {
    /// Create an empty conversation with a fresh random id.
    pub fn new() -> Self {
        Self::with_id(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Create an empty conversation with the given id.
    pub fn with_id(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: String::new(),
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
        }
    }

    /// Builder-style helper used mostly by tests and fixtures.
    pub fn with_message(mut self, message: ChatMessage) -> Self {
        self.push(message);
        self
    }

    /// Append a message and bump `updated_at`.
    pub fn push(&mut self, message: ChatMessage) {
        self.updated_at = message.created_at.max(self.updated_at);
        self.messages.push(message);
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The first user message with non-blank content, if any.
    pub fn first_user_message(&self) -> Option<&ChatMessage> {
        self.messages
            .iter()
            .find(|m| m.role == Role::User && !m.content.trim().is_empty())
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
