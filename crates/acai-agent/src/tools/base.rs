//! Tool trait — the interface every model-callable tool implements.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use acai_core::types::ToolDefinition;

use crate::cancel::{CallContext, Interrupted};

// ─────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────

/// Failure of a single tool call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// Required keys missing, malformed payload, wrong types, bad values.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// Arguments were fine but the underlying action failed.
    #[error("{0}")]
    Execution(String),

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("tool call cancelled")]
    Cancelled,

    #[error("tool call deadline exceeded")]
    DeadlineExceeded,
}

impl From<Interrupted> for ToolError {
    fn from(value: Interrupted) -> Self {
        match value {
            Interrupted::Cancelled => ToolError::Cancelled,
            Interrupted::DeadlineExceeded => ToolError::DeadlineExceeded,
        }
    }
}

// ─────────────────────────────────────────────
// Tool trait
// ─────────────────────────────────────────────

/// Every tool implements this trait.
///
/// The reply loop advertises tools via `to_definition()` and dispatches the
/// model's requests through the registry by `name()`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique, whitespace-free name the model uses to call this tool.
    fn name(&self) -> &str;

    /// Human-readable description shown to the model.
    fn description(&self) -> &str;

    /// JSON Schema describing the parameters.
    ///
    /// Advisory only; `call` validates the real arguments.
    fn parameters(&self) -> Value;

    /// Run the tool with the model's raw JSON argument string.
    ///
    /// Every failure comes back as a `ToolError` value.
    async fn call(&self, ctx: &CallContext, raw_args: &str) -> Result<String, ToolError>;

    /// Build the `ToolDefinition` sent to the model.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.parameters())
    }
}

// ─────────────────────────────────────────────
// Param helpers
// ─────────────────────────────────────────────

/// Argument object decoded from the model's payload.
pub type Params = Map<String, Value>;

/// Decode a raw argument string into a JSON object.
///
/// An empty or whitespace-only payload is treated as `{}`.
pub fn parse_args(raw: &str) -> Result<Params, ToolError> {
    if raw.trim().is_empty() {
        return Ok(Params::new());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ToolError::InvalidArguments(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(ToolError::InvalidArguments(format!("malformed JSON: {e}"))),
    }
}

/// Extract a required, non-blank `String` param.
pub fn require_string(params: &Params, key: &str) -> Result<String, ToolError> {
    match params.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::String(_)) => Err(ToolError::InvalidArguments(format!("{key} must not be empty"))),
        Some(other) => Err(ToolError::InvalidArguments(format!(
            "{key} must be a string, got {}",
            json_kind(other)
        ))),
        None => Err(ToolError::InvalidArguments(format!("missing required parameter: {key}"))),
    }
}

/// Extract an optional `String` param. Null and blank count as absent.
pub fn optional_string(params: &Params, key: &str) -> Result<Option<String>, ToolError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(other) => Err(ToolError::InvalidArguments(format!(
            "{key} must be a string, got {}",
            json_kind(other)
        ))),
    }
}

/// Extract an optional integer param. Whole floats such as `3.0` are accepted.
pub fn optional_i64(params: &Params, key: &str) -> Result<Option<i64>, ToolError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                return Ok(Some(i));
            }
            match n.as_f64() {
                Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(Some(f as i64)),
                _ => Err(ToolError::InvalidArguments(format!("{key} must be an integer"))),
            }
        }
        Some(other) => Err(ToolError::InvalidArguments(format!(
            "{key} must be an integer, got {}",
            json_kind(other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Params {
        match value {
            Value::Object(map) => map,
            _ => panic!("test params must be an object"),
        }
    }

    #[test]
    fn test_parse_args_empty_is_object() {
        assert!(parse_args("").unwrap().is_empty());
        assert!(parse_args("   ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_args_rejects_non_object() {
        assert!(matches!(parse_args("[1,2]"), Err(ToolError::InvalidArguments(_))));
        assert!(matches!(parse_args("{oops"), Err(ToolError::InvalidArguments(_))));
    }

    #[test]
    fn test_require_string_present() {
        let p = params(json!({"location": "  Barcelona "}));
        assert_eq!(require_string(&p, "location").unwrap(), "Barcelona");
    }

    #[test]
    fn test_require_string_missing_blank_or_wrong_type() {
        let p = params(json!({"blank": "  ", "num": 42}));
        for key in ["missing", "blank", "num"] {
            let err = require_string(&p, key).unwrap_err();
            assert!(matches!(err, ToolError::InvalidArguments(ref m) if m.contains(key)));
        }
    }

    #[test]
    fn test_optional_string() {
        let p = params(json!({"a": "x", "b": null, "c": ""}));
        assert_eq!(optional_string(&p, "a").unwrap(), Some("x".into()));
        assert_eq!(optional_string(&p, "b").unwrap(), None);
        assert_eq!(optional_string(&p, "c").unwrap(), None);
        assert_eq!(optional_string(&p, "d").unwrap(), None);
    }

    #[test]
    fn test_optional_i64() {
        let p = params(json!({"n": 5, "f": 3.0, "frac": 2.5, "s": "4"}));
        assert_eq!(optional_i64(&p, "n").unwrap(), Some(5));
        assert_eq!(optional_i64(&p, "f").unwrap(), Some(3));
        assert_eq!(optional_i64(&p, "missing").unwrap(), None);
        assert!(optional_i64(&p, "frac").is_err());
        assert!(optional_i64(&p, "s").is_err());
    }

    #[test]
    fn test_from_interrupted() {
        assert_eq!(ToolError::from(Interrupted::Cancelled), ToolError::Cancelled);
        assert_eq!(
            ToolError::from(Interrupted::DeadlineExceeded),
            ToolError::DeadlineExceeded
        );
    }

    /// Verify the default `to_definition()` produces the right shape.
    #[tokio::test]
    async fn test_to_definition_default() {
        struct DummyTool;

        #[async_trait]
        impl Tool for DummyTool {
            fn name(&self) -> &str { "dummy" }
            fn description(&self) -> &str { "A test tool" }
            fn parameters(&self) -> Value {
                json!({
                    "type": "object",
                    "properties": { "msg": { "type": "string" } },
                    "required": ["msg"]
                })
            }
            async fn call(&self, _ctx: &CallContext, _raw: &str) -> Result<String, ToolError> {
                Ok("ok".into())
            }
        }

        let def = DummyTool.to_definition();
        assert_eq!(def.function.name, "dummy");
        assert_eq!(def.function.description, "A test tool");
        assert_eq!(def.tool_type, "function");
        assert_eq!(DummyTool.call(&CallContext::new(), "{}").await.unwrap(), "ok");
    }
}
