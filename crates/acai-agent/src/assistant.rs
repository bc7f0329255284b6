//! Assistant — the title + reply pair the chat service depends on.

use std::sync::Arc;

use async_trait::async_trait;

use acai_core::config::Config;
use acai_core::conversation::Conversation;
use acai_providers::{LlmProvider, LlmRequestConfig};

use crate::cancel::CallContext;
use crate::error::AssistantError;
use crate::reply_loop::ReplyLoop;
use crate::title::TitleGenerator;
use crate::tools::ToolRegistry;

/// What a chat front-end needs from the model side.
#[async_trait]
pub trait Assistant: Send + Sync {
    async fn title(
        &self,
        ctx: &CallContext,
        conversation: &Conversation,
    ) -> Result<String, AssistantError>;

    async fn reply(
        &self,
        ctx: &CallContext,
        conversation: &Conversation,
    ) -> Result<String, AssistantError>;
}

/// Model-backed assistant: a [`ReplyLoop`] plus a [`TitleGenerator`] over
/// the same provider.
pub struct LlmAssistant {
    reply_loop: ReplyLoop,
    titles: TitleGenerator,
}

impl LlmAssistant {
    pub fn new(provider: Arc<dyn LlmProvider>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            reply_loop: ReplyLoop::new(Arc::clone(&provider), tools),
            titles: TitleGenerator::new(provider),
        }
    }

    /// Apply model name, token limit, temperature and round bound from config.
    pub fn from_config(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: &Config,
    ) -> Self {
        let request_config = LlmRequestConfig {
            max_tokens: config.model.max_tokens,
            temperature: config.model.temperature,
        };
        let model = config.model.model.clone();
        Self {
            reply_loop: ReplyLoop::new(Arc::clone(&provider), tools)
                .with_model(model.clone())
                .with_request_config(request_config.clone())
                .with_max_rounds(config.model.max_tool_rounds),
            titles: TitleGenerator::new(provider)
                .with_model(model)
                .with_request_config(request_config),
        }
    }

    pub fn reply_loop(&self) -> &ReplyLoop {
        &self.reply_loop
    }
}

#[async_trait]
impl Assistant for LlmAssistant {
    async fn title(
        &self,
        ctx: &CallContext,
        conversation: &Conversation,
    ) -> Result<String, AssistantError> {
        self.titles.title(ctx, conversation).await
    }

    async fn reply(
        &self,
        ctx: &CallContext,
        conversation: &Conversation,
    ) -> Result<String, AssistantError> {
        self.reply_loop.reply(ctx, conversation).await
    }
}
