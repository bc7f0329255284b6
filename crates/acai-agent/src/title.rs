//! Title generator — one non-looping model call that names a conversation.

use std::sync::Arc;

use tracing::{debug, info};

use acai_core::conversation::Conversation;
use acai_providers::{LlmProvider, LlmRequestConfig};

use crate::cancel::CallContext;
use crate::context::{ContextBuilder, TITLE_SYSTEM_PROMPT};
use crate::error::AssistantError;

/// Title used when nothing better can be derived.
pub const UNTITLED: &str = "Untitled conversation";

/// Maximum title length, in characters.
pub const MAX_TITLE_CHARS: usize = 80;

/// Generates short, neutral conversation titles.
pub struct TitleGenerator {
    provider: Arc<dyn LlmProvider>,
    model: String,
    request_config: LlmRequestConfig,
    context: ContextBuilder,
}

impl TitleGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        let model = provider.default_model().to_string();
        Self {
            provider,
            model,
            request_config: LlmRequestConfig::default(),
            context: ContextBuilder::new(TITLE_SYSTEM_PROMPT),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_request_config(mut self, config: LlmRequestConfig) -> Self {
        self.request_config = config;
        self
    }

    /// Title for `conversation`.
    ///
    /// Empty or blank conversations get [`UNTITLED`] without a model call.
    /// Model failures and blank model output are errors; a title that
    /// normalizes to nothing falls back to the source message, then to
    /// [`UNTITLED`].
    pub async fn title(
        &self,
        ctx: &CallContext,
        conversation: &Conversation,
    ) -> Result<String, AssistantError> {
        let source = match conversation.first_user_message() {
            Some(msg) => msg.content.as_str(),
            None => match conversation.messages.first() {
                Some(msg) => msg.content.as_str(),
                None => return Ok(UNTITLED.to_string()),
            },
        };
        // Nothing to summarize.
        if source.trim().is_empty() {
            return Ok(UNTITLED.to_string());
        }

        info!(conversation_id = %conversation.id, "generating title");

        let messages = self.context.build_single(source);
        let response = ctx
            .run(
                self.provider
                    .chat(&messages, None, &self.model, &self.request_config),
            )
            .await??;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(AssistantError::NoModelChoices)?;
        let raw = choice.content.unwrap_or_default();
        if raw.trim().is_empty() {
            return Err(AssistantError::EmptyModelResponse);
        }

        let mut title = normalize_title(&raw);
        if title.is_empty() {
            debug!(raw = %raw, "model title normalized to nothing, using source message");
            title = normalize_title(source);
        }
        if title.is_empty() {
            title = UNTITLED.to_string();
        }
        Ok(title)
    }
}

/// Clean up raw model output into a title.
///
/// Trims, folds newlines to spaces, drops surrounding quotes, keeps only
/// letters, digits, whitespace and `-`, strips trailing sentence
/// punctuation, and caps the length at [`MAX_TITLE_CHARS`].
pub fn normalize_title(raw: &str) -> String {
    let folded = raw.trim().replace('\n', " ");
    let unquoted = folded.trim_matches(['"', '\'']);
    let kept: String = unquoted
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();
    let stripped = kept.trim_end_matches(['.', '!', '?', '…', ' ']);
    let capped: String = stripped.chars().take(MAX_TITLE_CHARS).collect();
    capped.trim().to_string()
}
