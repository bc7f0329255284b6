//! Context builder — turns a stored conversation into the message list for
//! a model call.

use acai_core::conversation::{Conversation, Role};
use acai_core::types::{Message, ToolCall};

/// System instruction for replies.
pub const REPLY_SYSTEM_PROMPT: &str =
    "You are a helpful, concise AI assistant. Provide accurate, safe, and clear responses.";

/// System instruction for title generation.
pub const TITLE_SYSTEM_PROMPT: &str = "You are a titling assistant. Generate a concise, neutral \
conversation TITLE (max 80 characters) summarizing the user's question. Do NOT answer the \
question. No quotes, no emojis, no trailing punctuation. Return ONLY the title.";

/// Builds model message lists behind a fixed system prompt.
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    system_prompt: String,
}

impl ContextBuilder {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
        }
    }

    /// System prompt followed by every user/assistant message in order.
    ///
    /// Messages with any other role are skipped.
    pub fn build_messages(&self, conversation: &Conversation) -> Vec<Message> {
        let mut messages = Vec::with_capacity(conversation.messages.len() + 1);
        messages.push(Message::system(&self.system_prompt));
        for msg in &conversation.messages {
            match msg.role {
                Role::User => messages.push(Message::user(&msg.content)),
                Role::Assistant => messages.push(Message::assistant(&msg.content)),
                Role::Unknown => {}
            }
        }
        messages
    }

    /// System prompt plus a single user message.
    pub fn build_single(&self, user_text: &str) -> Vec<Message> {
        vec![Message::system(&self.system_prompt), Message::user(user_text)]
    }

    /// Append a tool result message.
    pub fn add_tool_result(messages: &mut Vec<Message>, tool_call_id: &str, result: &str) {
        messages.push(Message::tool_result(tool_call_id, result));
    }

    /// Append the assistant turn that requested `tool_calls`.
    pub fn add_assistant_message(
        messages: &mut Vec<Message>,
        content: Option<String>,
        tool_calls: Vec<ToolCall>,
    ) {
        if tool_calls.is_empty() {
            if let Some(text) = content {
                messages.push(Message::assistant(text));
            }
        } else {
            messages.push(Message::assistant_tool_calls(content, tool_calls));
        }
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new(REPLY_SYSTEM_PROMPT)
    }
}
