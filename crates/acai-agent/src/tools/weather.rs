//! `get_weather` — current conditions and optional forecast.

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::base::{optional_i64, parse_args, require_string, Tool, ToolError};
use crate::cancel::CallContext;
use crate::sources::weather::{WeatherReport, WeatherSource, MAX_FORECAST_DAYS};

/// Looks up weather through an injected [`WeatherSource`].
pub struct WeatherTool {
    source: Arc<dyn WeatherSource>,
}

impl WeatherTool {
    pub fn new(source: Arc<dyn WeatherSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Get weather at the given location (and optional forecast)"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "City or place name, e.g. Barcelona"
                },
                "days": {
                    "type": "integer",
                    "description": "Optional: number of forecast days (1-10)",
                    "minimum": 0,
                    "maximum": MAX_FORECAST_DAYS
                }
            },
            "required": ["location"]
        })
    }

    async fn call(&self, ctx: &CallContext, raw_args: &str) -> Result<String, ToolError> {
        let params = parse_args(raw_args)?;
        let location = require_string(&params, "location")?;
        let days = optional_i64(&params, "days")?
            .unwrap_or(0)
            .clamp(0, i64::from(MAX_FORECAST_DAYS)) as u32;

        let report = ctx
            .run(self.source.fetch(&location, days))
            .await?
            .map_err(|e| ToolError::Execution(format!("weather lookup failed: {e}")))?;

        Ok(format_report(&report))
    }
}

/// Render a report as the plain-text block the model reads.
pub fn format_report(report: &WeatherReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Location: {}, {}",
        report.location.name, report.location.country
    );
    let _ = writeln!(
        out,
        "Current: {:.1}°C, {}, wind {:.0} km/h (dir {:.0}°)",
        report.current.temp_c,
        report.current.condition,
        report.current.wind_kph,
        report.current.wind_degree
    );

    if !report.forecast.is_empty() {
        let _ = writeln!(out, "Forecast ({} days):", report.forecast.len());
        for day in &report.forecast {
            let _ = writeln!(
                out,
                "- {}: {}, min {:.1}°C / max {:.1}°C, wind max {:.0} km/h",
                day.date, day.condition, day.min_temp_c, day.max_temp_c, day.max_wind_kph
            );
        }
    }
    out
}
