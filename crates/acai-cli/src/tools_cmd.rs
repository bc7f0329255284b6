//! `acai tools` — list the tool descriptors advertised to the model.

use anyhow::Result;
use colored::Colorize;

use acai_agent::build_registry;
use acai_core::config::load_config;
use acai_core::types::ToolDefinition;

pub fn run() -> Result<()> {
    let config = load_config(None);
    let registry = build_registry(&config.tools);
    let definitions = registry.get_definitions();

    println!();
    if definitions.is_empty() {
        println!("{}", "No tools enabled.".dimmed());
    }
    for def in &definitions {
        print_definition(def)?;
    }
    Ok(())
}

fn print_definition(def: &ToolDefinition) -> Result<()> {
    println!("  {}", def.function.name.cyan().bold());
    println!("    {}", def.function.description);
    let params = serde_json::to_string(&def.function.parameters)?;
    println!("    {}", params.dimmed());
    println!();
    Ok(())
}
