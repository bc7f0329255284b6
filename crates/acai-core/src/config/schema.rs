//! Configuration schema.
//!
//! Hierarchy: `Config` → `ModelSettings`, `ProviderConfig`, `ToolsConfig`,
//! `StorageConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default number of model round-trips the reply loop may make per reply.
pub const DEFAULT_MAX_TOOL_ROUNDS: u32 = 15;

/// Default OpenAI-compatible API base.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Default weatherapi.com base.
pub const DEFAULT_WEATHER_API_BASE: &str = "https://api.weatherapi.com/v1";

/// Default public-holiday feed.
pub const DEFAULT_HOLIDAY_CALENDAR_URL: &str = "https://www.officeholidays.com/ics/spain/catalonia";

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.acai/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub model: ModelSettings,
    pub provider: ProviderConfig,
    pub tools: ToolsConfig,
    pub storage: StorageConfig,
}

// ─────────────────────────────────────────────
// Model
// ─────────────────────────────────────────────

/// Settings for every chat-completion request.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelSettings {
    /// Model identifier sent to the provider.
    pub model: String,
    /// Maximum tokens to generate per response.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0). `None` leaves the provider default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Maximum model round-trips per reply before giving up.
    pub max_tool_rounds: u32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4.1".to_string(),
            max_tokens: 4096,
            temperature: None,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }
}

// ─────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────

/// Connection settings for the OpenAI-compatible provider.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key for Bearer authentication.
    pub api_key: String,
    /// API base URL.
    pub api_base: String,
    /// Extra HTTP headers to send with each request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_headers: Option<HashMap<String, String>>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            extra_headers: None,
            timeout_secs: 120,
        }
    }
}

impl ProviderConfig {
    /// Whether this provider has a configured API key.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

// ─────────────────────────────────────────────
// Tools
// ─────────────────────────────────────────────

/// Tool configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolsConfig {
    pub weather: WeatherToolConfig,
    pub holidays: HolidaysToolConfig,
    pub time_in: ToggleConfig,
    pub today: ToggleConfig,
}

/// weatherapi.com settings for the `get_weather` tool.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeatherToolConfig {
    pub enabled: bool,
    pub api_key: String,
    pub api_base: String,
    pub timeout_secs: u64,
}

impl Default for WeatherToolConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: String::new(),
            api_base: DEFAULT_WEATHER_API_BASE.to_string(),
            timeout_secs: 8,
        }
    }
}

/// ICS feed settings for the `get_holidays` tool.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HolidaysToolConfig {
    pub enabled: bool,
    pub calendar_url: String,
    pub timeout_secs: u64,
}

impl Default for HolidaysToolConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            calendar_url: DEFAULT_HOLIDAY_CALENDAR_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

/// On/off switch for tools with no other settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToggleConfig {
    pub enabled: bool,
}

impl Default for ToggleConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

// ─────────────────────────────────────────────
// Storage
// ─────────────────────────────────────────────

/// Where conversations are persisted.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageConfig {
    pub conversations_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            conversations_dir: "~/.acai/conversations".to_string(),
        }
    }
}
