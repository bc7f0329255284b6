//! `get_holidays` — public holidays from an iCalendar feed.
//!
//! Filtering: `after_date < date < before_date` (dates taken as UTC
//! midnight), then the first `max_count` survivors in feed order.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{json, Value};

use super::base::{optional_i64, optional_string, parse_args, Params, Tool, ToolError};
use crate::cancel::CallContext;
use crate::sources::calendar::{HolidayEvent, HolidayFeed};

/// Text returned when nothing matches.
pub const NO_HOLIDAYS: &str = "No holidays found.";

pub struct HolidaysTool {
    feed: Arc<dyn HolidayFeed>,
}

impl HolidaysTool {
    pub fn new(feed: Arc<dyn HolidayFeed>) -> Self {
        Self { feed }
    }
}

/// Parsed `get_holidays` arguments.
#[derive(Debug, Default, Clone, PartialEq)]
struct HolidayQuery {
    before: Option<DateTime<Utc>>,
    after: Option<DateTime<Utc>>,
    /// `None` means unlimited.
    max_count: Option<usize>,
}

impl HolidayQuery {
    fn from_params(params: &Params) -> Result<Self, ToolError> {
        let max_count = optional_i64(params, "max_count")?
            .filter(|n| *n > 0)
            .map(|n| n as usize);
        Ok(Self {
            before: optional_date(params, "before_date")?,
            after: optional_date(params, "after_date")?,
            max_count,
        })
    }

    fn matches(&self, date: NaiveDate) -> bool {
        let instant = date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        let Some(instant) = instant else {
            return false;
        };
        self.after.map_or(true, |after| instant > after)
            && self.before.map_or(true, |before| instant < before)
    }

    fn apply(&self, events: &[HolidayEvent]) -> Vec<String> {
        let limit = self.max_count.unwrap_or(usize::MAX);
        events
            .iter()
            .filter_map(|e| e.date.map(|d| (d, e)))
            .filter(|(date, _)| self.matches(*date))
            .take(limit)
            .map(|(date, e)| format!("{}: {}", date.format("%Y-%m-%d"), e.summary))
            .collect()
    }
}

fn optional_date(params: &Params, key: &str) -> Result<Option<DateTime<Utc>>, ToolError> {
    let Some(raw) = optional_string(params, key)? else {
        return Ok(None);
    };
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| Some(dt.with_timezone(&Utc)))
        .map_err(|e| ToolError::InvalidArguments(format!("{key} must be an RFC3339 date: {e}")))
}

#[async_trait]
impl Tool for HolidaysTool {
    fn name(&self) -> &str {
        "get_holidays"
    }

    fn description(&self) -> &str {
        "Gets local bank and public holidays. Each line is 'YYYY-MM-DD: Holiday Name'."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "before_date": {
                    "type": "string",
                    "description": "Optional RFC3339 date, return holidays before this date."
                },
                "after_date": {
                    "type": "string",
                    "description": "Optional RFC3339 date, return holidays after this date."
                },
                "max_count": {
                    "type": "integer",
                    "description": "Optional limit of holidays to return."
                }
            }
        })
    }

    async fn call(&self, ctx: &CallContext, raw_args: &str) -> Result<String, ToolError> {
        // Validate before touching the network.
        let query = HolidayQuery::from_params(&parse_args(raw_args)?)?;

        let events = ctx
            .run(self.feed.events())
            .await?
            .map_err(|e| ToolError::Execution(format!("failed to load holiday events: {e}")))?;

        let lines = query.apply(&events);
        if lines.is_empty() {
            return Ok(NO_HOLIDAYS.to_string());
        }
        Ok(lines.join("\n"))
    }
}
