//! Clock tools: `get_today_date` and `time_in`.

use async_trait::async_trait;
use chrono::{Local, SecondsFormat, Utc};
use chrono_tz::Tz;
use serde_json::{json, Value};

use super::base::{parse_args, require_string, Tool, ToolError};
use crate::cancel::CallContext;

// ─────────────────────────────────────────────
// TodayTool
// ─────────────────────────────────────────────

/// Current local date and time. Takes no arguments.
pub struct TodayTool;

#[async_trait]
impl Tool for TodayTool {
    fn name(&self) -> &str {
        "get_today_date"
    }

    fn description(&self) -> &str {
        "Get today's date and time in RFC3339 format"
    }

    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn call(&self, ctx: &CallContext, _raw_args: &str) -> Result<String, ToolError> {
        ctx.check()?;
        Ok(Local::now().to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

// ─────────────────────────────────────────────
// TimeInTool
// ─────────────────────────────────────────────

/// Current time in an IANA time zone.
pub struct TimeInTool;

#[async_trait]
impl Tool for TimeInTool {
    fn name(&self) -> &str {
        "time_in"
    }

    fn description(&self) -> &str {
        "Get the current date/time for a given IANA time zone (e.g. Europe/Madrid)."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "zone": {
                    "type": "string",
                    "description": "IANA time zone, e.g. Europe/Madrid, America/New_York"
                }
            },
            "required": ["zone"]
        })
    }

    async fn call(&self, ctx: &CallContext, raw_args: &str) -> Result<String, ToolError> {
        ctx.check()?;
        let params = parse_args(raw_args)?;
        let zone = require_string(&params, "zone")?;
        let tz: Tz = zone
            .parse()
            .map_err(|_| ToolError::InvalidArguments(format!("invalid time zone {zone:?}")))?;

        let now = Utc::now().with_timezone(&tz);
        Ok(format!(
            "{} ({})",
            now.to_rfc3339_opts(SecondsFormat::Secs, true),
            tz.name()
        ))
    }
}
