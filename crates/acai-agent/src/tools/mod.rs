//! Model-callable tools.

pub mod base;
pub mod holidays;
pub mod registry;
pub mod time;
pub mod weather;

use std::sync::Arc;

use tracing::{info, warn};

use acai_core::config::schema::ToolsConfig;

use crate::sources::{IcsHolidayFeed, WeatherApiClient};

pub use base::{optional_i64, optional_string, parse_args, require_string, Tool, ToolError};
pub use holidays::HolidaysTool;
pub use registry::ToolRegistry;
pub use time::{TimeInTool, TodayTool};
pub use weather::WeatherTool;

/// Build the registry of enabled built-in tools.
///
/// A tool whose source cannot be constructed (e.g. no weather API key) is
/// left out with a warning rather than failing the whole registry.
pub fn build_registry(config: &ToolsConfig) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    if config.weather.enabled {
        match WeatherApiClient::new(&config.weather) {
            Ok(client) => registry.register(Arc::new(WeatherTool::new(Arc::new(client)))),
            Err(e) => warn!(error = %e, "get_weather disabled"),
        }
    }

    if config.holidays.enabled {
        match IcsHolidayFeed::new(&config.holidays) {
            Ok(feed) => registry.register(Arc::new(HolidaysTool::new(Arc::new(feed)))),
            Err(e) => warn!(error = %e, "get_holidays disabled"),
        }
    }

    if config.today.enabled {
        registry.register(Arc::new(TodayTool));
    }
    if config.time_in.enabled {
        registry.register(Arc::new(TimeInTool));
    }

    info!(tools = ?registry.tool_names(), "tool registry ready");
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_registry_without_weather_key() {
        let registry = build_registry(&ToolsConfig::default());
        assert_eq!(
            registry.tool_names(),
            vec!["get_holidays", "get_today_date", "time_in"]
        );
    }

    #[test]
    fn test_build_registry_all_tools() {
        let mut config = ToolsConfig::default();
        config.weather.api_key = "wk".into();
        let registry = build_registry(&config);
        assert_eq!(
            registry.tool_names(),
            vec!["get_holidays", "get_today_date", "get_weather", "time_in"]
        );
    }

    #[test]
    fn test_build_registry_respects_toggles() {
        let mut config = ToolsConfig::default();
        config.holidays.enabled = false;
        config.time_in.enabled = false;
        let registry = build_registry(&config);
        assert_eq!(registry.tool_names(), vec!["get_today_date"]);
    }
}
