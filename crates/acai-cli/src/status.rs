//! `acai status` — show configuration, provider and tool status.

use anyhow::Result;
use colored::Colorize;

use acai_core::config::schema::ToolsConfig;
use acai_core::config::{get_config_path, load_config};

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "🫐 Acai Status".magenta().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        found_marker(config_path.exists())
    );

    let conversations = crate::helpers::expand_tilde(&config.storage.conversations_dir);
    println!(
        "  {:<18} {} {}",
        "Conversations:".bold(),
        conversations.display(),
        found_marker(conversations.exists())
    );

    println!("  {:<18} {}", "Model:".bold(), config.model.model);
    let temperature = config
        .model
        .temperature
        .map(|t| t.to_string())
        .unwrap_or_else(|| "default".to_string());
    println!(
        "  {:<18} {} | max_tokens: {} | max_tool_rounds: {}",
        "Parameters:".bold(),
        format!("temp: {temperature}").dimmed(),
        config.model.max_tokens.to_string().dimmed(),
        config.model.max_tool_rounds.to_string().dimmed(),
    );

    println!();
    println!(
        "  {:<18} {}",
        "Provider:".bold(),
        config.provider.api_base
    );
    println!(
        "  {:<18} {}",
        "API key:".bold(),
        key_status(config.provider.is_configured())
    );

    println!();
    println!("  {}", "Tools:".bold());
    for (name, status) in tool_statuses(&config.tools) {
        println!("    {:<20} {}", name, status);
    }
    println!();

    Ok(())
}

fn found_marker(exists: bool) -> String {
    if exists {
        "✓".green().to_string()
    } else {
        "(not found)".red().to_string()
    }
}

fn key_status(set: bool) -> String {
    if set {
        format!("{} (key set)", "✓".green())
    } else {
        format!("{}", "· not configured".dimmed())
    }
}

/// One `(tool name, status)` row per built-in tool.
fn tool_statuses(tools: &ToolsConfig) -> Vec<(&'static str, String)> {
    let disabled = || format!("{}", "· disabled".dimmed());
    let enabled = || format!("{}", "✓".green());

    let weather = if !tools.weather.enabled {
        disabled()
    } else if tools.weather.api_key.trim().is_empty() {
        format!("{}", "· no API key (not registered)".yellow())
    } else {
        format!("{} (key set)", "✓".green())
    };
    let holidays = if tools.holidays.enabled {
        format!("{} {}", "✓".green(), tools.holidays.calendar_url.dimmed())
    } else {
        disabled()
    };

    vec![
        ("get_weather", weather),
        ("get_holidays", holidays),
        (
            "get_today_date",
            if tools.today.enabled { enabled() } else { disabled() },
        ),
        (
            "time_in",
            if tools.time_in.enabled { enabled() } else { disabled() },
        ),
    ]
}
