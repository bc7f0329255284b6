//! `acai onboard` — initialize configuration and data directories.
//!
//! - Creates `~/.acai/config.json` with defaults
//! - Creates the conversations and REPL history directories

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use acai_core::config::{get_config_path, load_config, save_config};

/// Run the onboard command.
pub fn run() -> Result<()> {
    println!();
    println!("{}", "🫐 Acai — Setup".magenta().bold());
    println!();

    let config_path = get_config_path();
    let config = load_config(None);

    if write_default_config(&config_path)? {
        println!("  {} created config at {}", "✓".green(), config_path.display());
    } else {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    }

    let conversations = crate::helpers::expand_tilde(&config.storage.conversations_dir);
    std::fs::create_dir_all(&conversations)
        .with_context(|| format!("failed to create {}", conversations.display()))?;
    println!("  {} conversations at {}", "✓".green(), conversations.display());

    if let Some(history_dir) = crate::repl::history_path().parent() {
        std::fs::create_dir_all(history_dir)?;
    }

    println!();
    if !config.provider.is_configured() {
        println!(
            "  {}",
            format!(
                "Add your API key to {} (or set OPENAI_API_KEY).",
                config_path.display()
            )
            .yellow()
        );
    }
    println!(
        "{}",
        "  Setup complete! Run `acai chat` to start chatting.".green()
    );
    println!();

    Ok(())
}

/// Write a default config file unless one exists. Returns whether it wrote.
///
/// Defaults are written as-is; environment overrides are not baked in.
fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save_config(&Default::default(), Some(path))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}
