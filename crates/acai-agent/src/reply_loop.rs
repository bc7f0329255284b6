//! Reply loop — the model ↔ tool round-trip protocol.
//!
//! Each round submits the accumulated message list plus the registry's tool
//! definitions. A choice without tool calls ends the loop with its text; a
//! choice with tool calls is dispatched through the registry, every result
//! (or tool error) is appended as a tool message in request order, and the
//! loop goes round again. Model failures, missing choices, cancellation and
//! running out of rounds are terminal.

use std::sync::Arc;

use tracing::{debug, info, warn};

use acai_core::conversation::Conversation;
use acai_core::types::{LlmChoice, Message, ToolCall};
use acai_providers::{LlmProvider, LlmRequestConfig};

use crate::cancel::CallContext;
use crate::context::{ContextBuilder, REPLY_SYSTEM_PROMPT};
use crate::error::AssistantError;
use crate::tools::{ToolError, ToolRegistry};

/// Default maximum model round-trips per reply.
pub const MAX_TOOL_ROUNDS: u32 = 15;

// ─────────────────────────────────────────────
// ReplyLoop
// ─────────────────────────────────────────────

/// Drives one reply to completion against a provider and a tool registry.
pub struct ReplyLoop {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    model: String,
    request_config: LlmRequestConfig,
    max_rounds: u32,
    context: ContextBuilder,
}

impl ReplyLoop {
    /// Create a loop using the provider's default model.
    pub fn new(provider: Arc<dyn LlmProvider>, tools: Arc<ToolRegistry>) -> Self {
        let model = provider.default_model().to_string();
        Self {
            provider,
            tools,
            model,
            request_config: LlmRequestConfig::default(),
            max_rounds: MAX_TOOL_ROUNDS,
            context: ContextBuilder::new(REPLY_SYSTEM_PROMPT),
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

    /// Override the round bound. Values below 1 are raised to 1.
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    /// Produce the assistant's next reply to `conversation`.
    pub async fn reply(
        &self,
        ctx: &CallContext,
        conversation: &Conversation,
    ) -> Result<String, AssistantError> {
        if conversation.is_empty() {
            return Err(AssistantError::EmptyConversation);
        }

        info!(
            conversation_id = %conversation.id,
            model = %self.model,
            "generating reply"
        );

        let mut messages = self.context.build_messages(conversation);
        let tool_defs = self.tools.get_definitions();

        for round in 1..=self.max_rounds {
            debug!(round, messages = messages.len(), "model call");

            let response = ctx
                .run(self.provider.chat(
                    &messages,
                    Some(tool_defs.as_slice()),
                    &self.model,
                    &self.request_config,
                ))
                .await??;

            let Some(LlmChoice {
                content,
                tool_calls,
                ..
            }) = response.choices.into_iter().next()
            else {
                return Err(AssistantError::NoModelChoices);
            };

            if tool_calls.is_empty() {
                debug!(round, "final answer");
                return Ok(content.unwrap_or_default());
            }

            ContextBuilder::add_assistant_message(&mut messages, content, tool_calls.clone());
            self.dispatch_round(ctx, round, &tool_calls, &mut messages)
                .await?;
        }

        warn!(
            conversation_id = %conversation.id,
            limit = self.max_rounds,
            "tool round limit reached"
        );
        Err(AssistantError::TooManyToolCalls {
            limit: self.max_rounds,
        })
    }

    /// Resolve every call of one round, appending outputs in request order.
    ///
    /// Tool failures become tool messages; only interruption aborts.
    async fn dispatch_round(
        &self,
        ctx: &CallContext,
        round: u32,
        calls: &[ToolCall],
        messages: &mut Vec<Message>,
    ) -> Result<(), AssistantError> {
        for call in calls {
            let name = call.function.name.as_str();
            info!(tool = name, round, args = %call.function.arguments, "tool call received");

            let output = match self
                .tools
                .dispatch(ctx, name, &call.function.arguments)
                .await
            {
                Ok(text) => text,
                Err(ToolError::Cancelled) => return Err(AssistantError::Cancelled),
                Err(ToolError::DeadlineExceeded) => return Err(AssistantError::DeadlineExceeded),
                Err(ToolError::UnknownTool(unknown)) => format!("unknown tool: {unknown}"),
                Err(e) => format!("error: {e}"),
            };

            ContextBuilder::add_tool_result(messages, &call.id, &output);
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{parse_args, require_string, Tool};
    use acai_core::conversation::{ChatMessage, Role};
    use acai_core::types::{LlmResponse, ToolDefinition};
    use acai_providers::ProviderError;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Scripted provider that records every request it receives.
    struct MockProvider {
        responses: Mutex<Vec<Result<LlmResponse, ProviderError>>>,
        /// Repeated forever once the script runs out.
        fallback: Option<LlmResponse>,
        requests: Mutex<Vec<(Vec<Message>, Vec<String>)>>,
    }

    impl MockProvider {
        fn new(responses: Vec<Result<LlmResponse, ProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses),
                fallback: None,
                requests: Mutex::new(Vec::new()),
            })
        }

        fn scripted(responses: Vec<LlmResponse>) -> Arc<Self> {
            Self::new(responses.into_iter().map(Ok).collect())
        }

        fn forever(response: LlmResponse) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(Vec::new()),
                fallback: Some(response),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn request(&self, i: usize) -> Vec<Message> {
            self.requests.lock().unwrap()[i].0.clone()
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        async fn chat(
            &self,
            messages: &[Message],
            tools: Option<&[ToolDefinition]>,
            _model: &str,
            _config: &LlmRequestConfig,
        ) -> Result<LlmResponse, ProviderError> {
            let names = tools
                .unwrap_or_default()
                .iter()
                .map(|d| d.function.name.clone())
                .collect();
            self.requests.lock().unwrap().push((messages.to_vec(), names));

            let mut responses = self.responses.lock().unwrap();
            if !responses.is_empty() {
                return responses.remove(0);
            }
            match &self.fallback {
                Some(r) => Ok(r.clone()),
                None => Err(ProviderError::Transport("script exhausted".into())),
            }
        }

        fn default_model(&self) -> &str {
            "mock-model"
        }

        fn display_name(&self) -> &str {
            "MockProvider"
        }
    }

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes text"
        }
        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {"text": {"type": "string"}}, "required": ["text"]})
        }
        async fn call(&self, _ctx: &CallContext, raw: &str) -> Result<String, ToolError> {
            Ok(format!("echo: {}", require_string(&parse_args(raw)?, "text")?))
        }
    }

    struct FailTool;

    #[async_trait]
    impl Tool for FailTool {
        fn name(&self) -> &str {
            "fail"
        }
        fn description(&self) -> &str {
            "Always fails"
        }
        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
        async fn call(&self, _ctx: &CallContext, _raw: &str) -> Result<String, ToolError> {
            Err(ToolError::Execution("upstream unavailable".into()))
        }
    }

    struct HangingTool;

    #[async_trait]
    impl Tool for HangingTool {
        fn name(&self) -> &str {
            "hang"
        }
        fn description(&self) -> &str {
            "Never finishes on its own"
        }
        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
        async fn call(&self, ctx: &CallContext, _raw: &str) -> Result<String, ToolError> {
            ctx.run(tokio::time::sleep(Duration::from_secs(60))).await?;
            Ok("late".into())
        }
    }

    fn registry() -> Arc<ToolRegistry> {
        Arc::new(
            ToolRegistry::new()
                .with(Arc::new(EchoTool))
                .with(Arc::new(FailTool))
                .with(Arc::new(HangingTool)),
        )
    }

    fn conversation(text: &str) -> Conversation {
        Conversation::new().with_message(ChatMessage::user(text))
    }

    fn tool_messages(messages: &[Message]) -> Vec<(String, String)> {
        messages
            .iter()
            .filter_map(|m| match m {
                Message::Tool {
                    content,
                    tool_call_id,
                } => Some((tool_call_id.clone(), content.clone())),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_empty_conversation_never_calls_model() {
        let provider = MockProvider::scripted(vec![LlmResponse::text("unused")]);
        let reply_loop = ReplyLoop::new(provider.clone(), registry());

        let err = reply_loop
            .reply(&CallContext::new(), &Conversation::new())
            .await
            .unwrap_err();

        assert!(matches!(err, AssistantError::EmptyConversation));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_final_answer_in_one_round() {
        let provider = MockProvider::scripted(vec![LlmResponse::text("Hello from Acai!")]);
        let reply_loop = ReplyLoop::new(provider.clone(), registry());

        let out = reply_loop
            .reply(&CallContext::new(), &conversation("Hi"))
            .await
            .unwrap();

        assert_eq!(out, "Hello from Acai!");
        assert_eq!(provider.calls(), 1);

        let sent = provider.request(0);
        assert_eq!(sent[0], Message::system(REPLY_SYSTEM_PROMPT));
        assert_eq!(sent[1], Message::user("Hi"));
        let (_, tool_names) = provider.requests.lock().unwrap()[0].clone();
        assert_eq!(tool_names, vec!["echo", "fail", "hang"]);
    }

    #[tokio::test]
    async fn test_empty_content_is_not_an_error() {
        let provider = MockProvider::scripted(vec![LlmResponse::text("")]);
        let reply_loop = ReplyLoop::new(provider, registry());
        let out = reply_loop
            .reply(&CallContext::new(), &conversation("Hi"))
            .await
            .unwrap();
        assert_eq!(out, "");
    }

    #[tokio::test]
    async fn test_tool_outputs_appended_in_request_order() {
        let calls = vec![
            ToolCall::new("call_a", "echo", r#"{"text": "first"}"#),
            ToolCall::new("call_b", "fail", "{}"),
            ToolCall::new("call_c", "echo", r#"{"text": "third"}"#),
        ];
        let provider = MockProvider::scripted(vec![
            LlmResponse::tool_calls(calls),
            LlmResponse::text("done"),
        ]);
        let reply_loop = ReplyLoop::new(provider.clone(), registry());

        let out = reply_loop
            .reply(&CallContext::new(), &conversation("go"))
            .await
            .unwrap();
        assert_eq!(out, "done");
        assert_eq!(provider.calls(), 2);

        let second = provider.request(1);
        // system, user, assistant(tool_calls), 3 × tool
        assert_eq!(second.len(), 6);
        assert!(matches!(
            &second[2],
            Message::Assistant { tool_calls: Some(c), .. } if c.len() == 3
        ));
        let outputs = tool_messages(&second);
        assert_eq!(
            outputs,
            vec![
                ("call_a".to_string(), "echo: first".to_string()),
                ("call_b".to_string(), "error: upstream unavailable".to_string()),
                ("call_c".to_string(), "echo: third".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_tool_is_reported_to_model() {
        let provider = MockProvider::scripted(vec![
            LlmResponse::tool_calls(vec![ToolCall::new("call_1", "teleport", "{}")]),
            LlmResponse::text("I can't do that."),
        ]);
        let reply_loop = ReplyLoop::new(provider.clone(), registry());

        let out = reply_loop
            .reply(&CallContext::new(), &conversation("beam me up"))
            .await
            .unwrap();
        assert_eq!(out, "I can't do that.");

        let outputs = tool_messages(&provider.request(1));
        assert_eq!(outputs.len(), 1);
        assert!(outputs[0].1.contains("teleport"));
    }

    #[tokio::test]
    async fn test_invalid_arguments_are_reported_to_model() {
        let provider = MockProvider::scripted(vec![
            LlmResponse::tool_calls(vec![ToolCall::new("call_1", "echo", "{not json")]),
            LlmResponse::text("retrying later"),
        ]);
        let reply_loop = ReplyLoop::new(provider.clone(), registry());

        reply_loop
            .reply(&CallContext::new(), &conversation("echo"))
            .await
            .unwrap();
        let outputs = tool_messages(&provider.request(1));
        assert!(outputs[0].1.starts_with("error: invalid arguments"));
    }

    #[tokio::test]
    async fn test_failing_tool_forever_hits_round_limit() {
        let provider = MockProvider::forever(LlmResponse::tool_calls(vec![ToolCall::new(
            "call_x", "fail", "{}",
        )]));
        let reply_loop = ReplyLoop::new(provider.clone(), registry());

        let err = reply_loop
            .reply(&CallContext::new(), &conversation("loop forever"))
            .await
            .unwrap_err();

        assert!(matches!(err, AssistantError::TooManyToolCalls { limit: 15 }));
        assert_eq!(provider.calls(), MAX_TOOL_ROUNDS as usize);
    }

    #[tokio::test]
    async fn test_custom_round_limit() {
        let provider = MockProvider::forever(LlmResponse::tool_calls(vec![ToolCall::new(
            "call_x", "echo", r#"{"text": "again"}"#,
        )]));
        let reply_loop = ReplyLoop::new(provider.clone(), registry()).with_max_rounds(3);

        let err = reply_loop
            .reply(&CallContext::new(), &conversation("loop"))
            .await
            .unwrap_err();
        assert!(matches!(err, AssistantError::TooManyToolCalls { limit: 3 }));
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_model_error_propagates_unchanged() {
        let provider = MockProvider::new(vec![Err(ProviderError::Status {
            status: 500,
            body: "boom".into(),
        })]);
        let reply_loop = ReplyLoop::new(provider.clone(), registry());

        let err = reply_loop
            .reply(&CallContext::new(), &conversation("Hi"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AssistantError::Model(ProviderError::Status { status: 500, .. })
        ));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_no_choices() {
        let provider = MockProvider::scripted(vec![LlmResponse::default()]);
        let reply_loop = ReplyLoop::new(provider, registry());
        let err = reply_loop
            .reply(&CallContext::new(), &conversation("Hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, AssistantError::NoModelChoices));
    }

    #[tokio::test]
    async fn test_cancelled_before_model_call() {
        let provider = MockProvider::scripted(vec![LlmResponse::text("unused")]);
        let reply_loop = ReplyLoop::new(provider.clone(), registry());
        let ctx = CallContext::new();
        ctx.token().cancel();

        let err = reply_loop.reply(&ctx, &conversation("Hi")).await.unwrap_err();
        assert!(matches!(err, AssistantError::Cancelled));
        assert_eq!(provider.calls(), 0);
    }

    /// Never answers within a test's lifetime.
    struct StalledProvider;

    #[async_trait]
    impl LlmProvider for StalledProvider {
        async fn chat(
            &self,
            _messages: &[Message],
            _tools: Option<&[ToolDefinition]>,
            _model: &str,
            _config: &LlmRequestConfig,
        ) -> Result<LlmResponse, ProviderError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(LlmResponse::text("too late"))
        }

        fn default_model(&self) -> &str {
            "stalled-model"
        }

        fn display_name(&self) -> &str {
            "StalledProvider"
        }
    }

    #[tokio::test]
    async fn test_cancel_during_model_call() {
        let reply_loop = ReplyLoop::new(Arc::new(StalledProvider), registry());
        let ctx = CallContext::new();
        let token = ctx.token().clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            token.cancel();
        });

        let started = std::time::Instant::now();
        let err = tokio::time::timeout(
            Duration::from_secs(5),
            reply_loop.reply(&ctx, &conversation("Hi")),
        )
        .await
        .expect("reply should stop promptly once cancelled")
        .unwrap_err();

        assert!(matches!(err, AssistantError::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_deadline_during_tool_call_is_terminal() {
        let provider = MockProvider::scripted(vec![
            LlmResponse::tool_calls(vec![ToolCall::new("call_1", "hang", "{}")]),
            LlmResponse::text("unreachable"),
        ]);
        let reply_loop = ReplyLoop::new(provider.clone(), registry());
        let ctx = CallContext::new().with_timeout(Duration::from_millis(50));

        let err = reply_loop.reply(&ctx, &conversation("wait")).await.unwrap_err();
        assert!(matches!(err, AssistantError::DeadlineExceeded));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_history_roles_mapped_and_unknown_skipped() {
        let provider = MockProvider::scripted(vec![LlmResponse::text("ok")]);
        let reply_loop = ReplyLoop::new(provider.clone(), registry());
        let conv = Conversation::new()
            .with_message(ChatMessage::user("Hi"))
            .with_message(ChatMessage::assistant("Hello"))
            .with_message(ChatMessage::new(Role::Unknown, "ignored"))
            .with_message(ChatMessage::user("Weather?"));

        reply_loop.reply(&CallContext::new(), &conv).await.unwrap();

        let roles: Vec<&str> = provider.request(0).iter().map(|m| m.role()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
    }

    #[test]
    fn test_model_defaults_to_provider() {
        let provider = MockProvider::scripted(vec![]);
        let reply_loop = ReplyLoop::new(provider, registry());
        assert_eq!(reply_loop.model(), "mock-model");
        assert_eq!(reply_loop.max_rounds(), 15);
        assert_eq!(reply_loop.with_max_rounds(0).max_rounds(), 1);
    }
}
