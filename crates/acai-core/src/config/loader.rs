//! Config loader — reads `~/.acai/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.acai/config.json`
//! 3. Conventional vendor variables (`OPENAI_API_KEY`, `WEATHER_API_KEY`, ...)
//!    fill fields that are still empty
//! 4. `ACAI_<SECTION>__<FIELD>` variables override everything

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::{Config, DEFAULT_API_BASE, DEFAULT_HOLIDAY_CALENDAR_URL};

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    apply_env_overrides(read_config_file(&config_path), |key| std::env::var(key).ok())
}

/// Read a config file without applying environment overrides.
fn read_config_file(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment overrides on top of a loaded config.
///
/// `lookup` resolves a variable name to its value; production passes
/// `std::env::var`, tests pass a map.
///
/// Supported overrides:
/// - `ACAI_MODEL__MODEL`, `ACAI_MODEL__MAX_TOKENS`, `ACAI_MODEL__TEMPERATURE`,
///   `ACAI_MODEL__MAX_TOOL_ROUNDS`
/// - `ACAI_PROVIDER__API_KEY` (fallback `OPENAI_API_KEY`),
///   `ACAI_PROVIDER__API_BASE` (fallback `OPENAI_BASE_URL`)
/// - `ACAI_TOOLS__WEATHER__API_KEY` (fallback `WEATHER_API_KEY`),
///   `ACAI_TOOLS__WEATHER__API_BASE`
/// - `ACAI_TOOLS__HOLIDAYS__CALENDAR_URL` (fallback `HOLIDAY_CALENDAR_LINK`)
/// - `ACAI_STORAGE__CONVERSATIONS_DIR`
pub fn apply_env_overrides<F>(mut config: Config, lookup: F) -> Config
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

    // Conventional variables only fill gaps left by the file.
    if config.provider.api_key.is_empty() {
        if let Some(val) = get("OPENAI_API_KEY") {
            config.provider.api_key = val;
        }
    }
    if config.provider.api_base == DEFAULT_API_BASE {
        if let Some(val) = get("OPENAI_BASE_URL") {
            config.provider.api_base = val;
        }
    }
    if config.tools.weather.api_key.is_empty() {
        if let Some(val) = get("WEATHER_API_KEY") {
            config.tools.weather.api_key = val;
        }
    }
    if config.tools.holidays.calendar_url == DEFAULT_HOLIDAY_CALENDAR_URL {
        if let Some(val) = get("HOLIDAY_CALENDAR_LINK") {
            config.tools.holidays.calendar_url = val;
        }
    }

    // Model
    if let Some(val) = get("ACAI_MODEL__MODEL") {
        config.model.model = val;
    }
    if let Some(n) = get("ACAI_MODEL__MAX_TOKENS").and_then(|v| v.parse::<u32>().ok()) {
        config.model.max_tokens = n;
    }
    if let Some(t) = get("ACAI_MODEL__TEMPERATURE").and_then(|v| v.parse::<f64>().ok()) {
        config.model.temperature = Some(t);
    }
    if let Some(n) = get("ACAI_MODEL__MAX_TOOL_ROUNDS").and_then(|v| v.parse::<u32>().ok()) {
        config.model.max_tool_rounds = n;
    }

    // Provider
    if let Some(val) = get("ACAI_PROVIDER__API_KEY") {
        config.provider.api_key = val;
    }
    if let Some(val) = get("ACAI_PROVIDER__API_BASE") {
        config.provider.api_base = val;
    }

    // Tools
    if let Some(val) = get("ACAI_TOOLS__WEATHER__API_KEY") {
        config.tools.weather.api_key = val;
    }
    if let Some(val) = get("ACAI_TOOLS__WEATHER__API_BASE") {
        config.tools.weather.api_base = val;
    }
    if let Some(val) = get("ACAI_TOOLS__HOLIDAYS__CALENDAR_URL") {
        config.tools.holidays.calendar_url = val;
    }

    // Storage
    if let Some(val) = get("ACAI_STORAGE__CONVERSATIONS_DIR") {
        config.storage.conversations_dir = val;
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_load_missing_file() {
        let config = read_config_file(Path::new("/nonexistent/path/config.json"));
        assert_eq!(config.model.max_tokens, 4096);
        assert_eq!(config.model.max_tool_rounds, 15);
    }

    #[test]
    fn test_load_valid_json() {
        let file = write_temp_json(
            r#"{
            "model": { "model": "gpt-4o-mini", "maxTokens": 2048 },
            "provider": { "apiKey": "sk-file" }
        }"#,
        );

        let config = read_config_file(file.path());
        assert_eq!(config.model.model, "gpt-4o-mini");
        assert_eq!(config.model.max_tokens, 2048);
        assert_eq!(config.provider.api_key, "sk-file");
        assert_eq!(config.model.max_tool_rounds, 15);
    }

    #[test]
    fn test_load_invalid_json_returns_defaults() {
        let file = write_temp_json("not valid json {{{");
        let config = read_config_file(file.path());
        assert_eq!(config.model.model, "gpt-4.1");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.model.model = "gpt-4o".to_string();
        config.tools.weather.api_key = "weather-key".to_string();

        save_config(&config, Some(&path)).unwrap();

        let reloaded = read_config_file(&path);
        assert_eq!(reloaded.model.model, "gpt-4o");
        assert_eq!(reloaded.tools.weather.api_key, "weather-key");
    }

    #[test]
    fn test_saved_json_uses_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        save_config(&Config::default(), Some(&path)).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw["model"].get("maxTokens").is_some());
        assert!(raw["model"].get("max_tokens").is_none());
        assert!(raw["tools"]["holidays"].get("calendarUrl").is_some());
    }

    #[test]
    fn test_env_override_model() {
        let config = apply_env_overrides(
            Config::default(),
            env(&[("ACAI_MODEL__MODEL", "test-model"), ("ACAI_MODEL__MAX_TOOL_ROUNDS", "3")]),
        );
        assert_eq!(config.model.model, "test-model");
        assert_eq!(config.model.max_tool_rounds, 3);
    }

    #[test]
    fn test_conventional_vars_fill_gaps() {
        let config = apply_env_overrides(
            Config::default(),
            env(&[
                ("OPENAI_API_KEY", "sk-env"),
                ("WEATHER_API_KEY", "wk-env"),
                ("HOLIDAY_CALENDAR_LINK", "http://localhost/cal.ics"),
            ]),
        );
        assert_eq!(config.provider.api_key, "sk-env");
        assert_eq!(config.tools.weather.api_key, "wk-env");
        assert_eq!(config.tools.holidays.calendar_url, "http://localhost/cal.ics");
    }

    #[test]
    fn test_conventional_vars_do_not_override_file() {
        let mut config = Config::default();
        config.provider.api_key = "sk-file".into();

        let config = apply_env_overrides(config, env(&[("OPENAI_API_KEY", "sk-env")]));
        assert_eq!(config.provider.api_key, "sk-file");
    }

    #[test]
    fn test_prefixed_vars_override_file() {
        let mut config = Config::default();
        config.provider.api_key = "sk-file".into();

        let config = apply_env_overrides(config, env(&[("ACAI_PROVIDER__API_KEY", "sk-acai")]));
        assert_eq!(config.provider.api_key, "sk-acai");
    }

    #[test]
    fn test_unparseable_numbers_are_ignored() {
        let config = apply_env_overrides(
            Config::default(),
            env(&[("ACAI_MODEL__MAX_TOKENS", "lots"), ("ACAI_MODEL__TEMPERATURE", "0.2")]),
        );
        assert_eq!(config.model.max_tokens, 4096);
        assert_eq!(config.model.temperature, Some(0.2));
    }
}
