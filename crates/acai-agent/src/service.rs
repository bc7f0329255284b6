//! Chat service — conversation lifecycle on top of the store and assistant.
//!
//! Transport-independent: the CLI calls it directly, and `ServiceError::code`
//! gives any RPC layer a stable error code to map.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use acai_core::conversation::{ChatMessage, Conversation, ConversationStore, ConversationSummary};
use acai_core::StoreError;

use crate::assistant::Assistant;
use crate::cancel::CallContext;
use crate::error::AssistantError;
use crate::title::UNTITLED;

// ─────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("conversation not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Assistant(#[from] AssistantError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => ServiceError::NotFound(id),
            other => ServiceError::Store(other),
        }
    }
}

impl ServiceError {
    /// Stable, transport-level error code.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::InvalidArgument(_) => "invalid_argument",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Assistant(AssistantError::EmptyConversation) => "invalid_argument",
            ServiceError::Assistant(AssistantError::Cancelled) => "canceled",
            ServiceError::Assistant(AssistantError::DeadlineExceeded) => "deadline_exceeded",
            ServiceError::Assistant(_) | ServiceError::Store(_) => "internal",
        }
    }
}

/// Result of starting a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedConversation {
    pub conversation_id: String,
    pub title: String,
    pub reply: String,
}

// ─────────────────────────────────────────────
// ChatService
// ─────────────────────────────────────────────

pub struct ChatService {
    store: Arc<ConversationStore>,
    assistant: Arc<dyn Assistant>,
}

impl ChatService {
    pub fn new(store: Arc<ConversationStore>, assistant: Arc<dyn Assistant>) -> Self {
        Self { store, assistant }
    }

    /// Create a conversation from `message`, then title it and answer it.
    ///
    /// Title and reply are generated concurrently. A failed title falls
    /// back to the untitled placeholder; a failed reply is returned as an
    /// error with the user message already persisted.
    pub async fn start_conversation(
        &self,
        ctx: &CallContext,
        message: &str,
    ) -> Result<StartedConversation, ServiceError> {
        let text = non_blank(message)?;
        let conversation = self.store.create(ChatMessage::user(text))?;
        info!(conversation_id = %conversation.id, "started conversation");

        let (title, reply) = tokio::join!(
            self.assistant.title(ctx, &conversation),
            self.assistant.reply(ctx, &conversation)
        );

        let title = title.unwrap_or_else(|e| {
            warn!(conversation_id = %conversation.id, error = %e, "title generation failed");
            UNTITLED.to_string()
        });
        self.store.set_title(&conversation.id, &title)?;

        let reply = reply?;
        self.store
            .append(&conversation.id, ChatMessage::assistant(reply.clone()))?;

        Ok(StartedConversation {
            conversation_id: conversation.id,
            title,
            reply,
        })
    }

    /// Append `message` to an existing conversation and return the reply.
    pub async fn continue_conversation(
        &self,
        ctx: &CallContext,
        conversation_id: &str,
        message: &str,
    ) -> Result<String, ServiceError> {
        let text = non_blank(message)?;
        let conversation_id = non_blank_id(conversation_id)?;

        // Check existence before persisting anything.
        self.store.load(conversation_id)?;
        let conversation = self
            .store
            .append(conversation_id, ChatMessage::user(text))?;

        let reply = self.assistant.reply(ctx, &conversation).await?;
        self.store
            .append(conversation_id, ChatMessage::assistant(reply.clone()))?;
        Ok(reply)
    }

    pub fn describe_conversation(&self, conversation_id: &str) -> Result<Conversation, ServiceError> {
        Ok(self.store.load(non_blank_id(conversation_id)?)?)
    }

    /// All conversations, newest first.
    pub fn list_conversations(&self) -> Vec<ConversationSummary> {
        self.store.list()
    }
}

fn non_blank(message: &str) -> Result<&str, ServiceError> {
    let text = message.trim();
    if text.is_empty() {
        return Err(ServiceError::InvalidArgument("message must not be empty".into()));
    }
    Ok(text)
}

fn non_blank_id(id: &str) -> Result<&str, ServiceError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ServiceError::InvalidArgument("conversation id must not be empty".into()));
    }
    Ok(id)
}
