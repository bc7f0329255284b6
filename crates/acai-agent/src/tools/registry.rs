//! Tool Registry — name → tool lookup and dispatch.
//!
//! Built once and then shared read-only (`Arc<ToolRegistry>`) across
//! concurrent conversations.

use std::collections::HashMap;
use std::sync::Arc;

use acai_core::types::ToolDefinition;
use tracing::{debug, info, warn};

use super::base::{Tool, ToolError};
use crate::cancel::CallContext;

// ─────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────

/// Stores tools keyed by name and dispatches calls.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any previous tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            info!(tool = %name, "replaced tool");
        } else {
            info!(tool = %name, "registered tool");
        }
    }

    /// Builder-style `register`.
    pub fn with(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    /// Look up a tool by name. A miss is not an error.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Check if a tool is registered.
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Names of all registered tools, sorted.
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Model-facing definitions for all registered tools, sorted by name.
    pub fn get_definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self.tools.values().map(|t| t.to_definition()).collect();
        defs.sort_by(|a, b| a.function.name.cmp(&b.function.name));
        defs
    }

    /// Look up `name` and call it with `raw_args`.
    pub async fn dispatch(
        &self,
        ctx: &CallContext,
        name: &str,
        raw_args: &str,
    ) -> Result<String, ToolError> {
        let Some(tool) = self.tools.get(name) else {
            warn!(tool = name, "tool not found");
            return Err(ToolError::UnknownTool(name.to_string()));
        };

        let result = tool.call(ctx, raw_args).await;
        match &result {
            Ok(output) => debug!(tool = name, result_len = output.len(), "tool succeeded"),
            Err(e) => warn!(tool = name, error = %e, "tool call failed"),
        }
        result
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::base::{parse_args, require_string};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    /// Minimal test tool.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        fn parameters(&self) -> Value {
            json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string", "description": "Text to echo" }
                },
                "required": ["text"]
            })
        }
        async fn call(&self, _ctx: &CallContext, raw_args: &str) -> Result<String, ToolError> {
            let params = parse_args(raw_args)?;
            Ok(format!("Echo: {}", require_string(&params, "text")?))
        }
    }

    /// Tool with a fixed name and description, used for ordering tests.
    struct NamedTool(&'static str, &'static str);

    #[async_trait]
    impl Tool for NamedTool {
        fn name(&self) -> &str {
            self.0
        }
        fn description(&self) -> &str {
            self.1
        }
        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }
        async fn call(&self, _ctx: &CallContext, _raw: &str) -> Result<String, ToolError> {
            Ok(self.1.to_string())
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut reg = ToolRegistry::new();
        assert!(reg.is_empty());
        reg.register(Arc::new(EchoTool));
        assert_eq!(reg.len(), 1);
        assert!(reg.has("echo"));
        assert!(reg.get("echo").is_some());
        assert!(reg.get("nope").is_none());
    }

    #[tokio::test]
    async fn test_register_last_write_wins() {
        let reg = ToolRegistry::new()
            .with(Arc::new(NamedTool("clock", "first")))
            .with(Arc::new(NamedTool("clock", "second")));

        assert_eq!(reg.len(), 1);
        let defs = reg.get_definitions();
        assert_eq!(defs[0].function.description, "second");
        let out = reg.dispatch(&CallContext::new(), "clock", "{}").await.unwrap();
        assert_eq!(out, "second");
    }

    #[test]
    fn test_definitions_sorted_and_stable() {
        let reg = ToolRegistry::new()
            .with(Arc::new(NamedTool("time_in", "t")))
            .with(Arc::new(NamedTool("get_weather", "w")))
            .with(Arc::new(NamedTool("get_holidays", "h")))
            .with(Arc::new(NamedTool("get_today_date", "d")));

        let names: Vec<String> = reg
            .get_definitions()
            .iter()
            .map(|d| d.function.name.clone())
            .collect();
        assert_eq!(
            names,
            vec!["get_holidays", "get_today_date", "get_weather", "time_in"]
        );
        for _ in 0..5 {
            let again: Vec<String> = reg
                .get_definitions()
                .iter()
                .map(|d| d.function.name.clone())
                .collect();
            assert_eq!(again, names);
        }
        assert_eq!(reg.tool_names(), names);
    }

    #[tokio::test]
    async fn test_dispatch_success() {
        let reg = ToolRegistry::new().with(Arc::new(EchoTool));
        let out = reg
            .dispatch(&CallContext::new(), "echo", r#"{"text": "hello"}"#)
            .await
            .unwrap();
        assert_eq!(out, "Echo: hello");
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let reg = ToolRegistry::new();
        let err = reg
            .dispatch(&CallContext::new(), "nonexistent", "{}")
            .await
            .unwrap_err();
        assert_eq!(err, ToolError::UnknownTool("nonexistent".into()));
    }

    #[tokio::test]
    async fn test_dispatch_propagates_tool_error() {
        let reg = ToolRegistry::new().with(Arc::new(EchoTool));
        let err = reg
            .dispatch(&CallContext::new(), "echo", "{}")
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn test_shared_across_tasks() {
        let reg = Arc::new(ToolRegistry::new().with(Arc::new(EchoTool)));
        let mut handles = Vec::new();
        for i in 0..8 {
            let reg = Arc::clone(&reg);
            handles.push(tokio::spawn(async move {
                let args = json!({ "text": i.to_string() }).to_string();
                reg.dispatch(&CallContext::new(), "echo", &args).await
            }));
        }
        for (i, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.await.unwrap().unwrap(), format!("Echo: {i}"));
        }
    }
}
