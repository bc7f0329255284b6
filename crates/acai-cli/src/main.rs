//! Acai CLI — entry point.
//!
//! # Commands
//!
//! - `acai chat [-m MESSAGE] [-c CONVERSATION]` — chat (single-shot or REPL)
//! - `acai conversations list|show <id>` — inspect stored conversations
//! - `acai tools` — list the tools advertised to the model
//! - `acai status` — show configuration and tool status
//! - `acai onboard` — initialize config and data directories

mod conversations;
mod helpers;
mod onboard;
mod repl;
mod status;
mod tools_cmd;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use acai_agent::{build_registry, ChatService, LlmAssistant};
use acai_core::config::schema::DEFAULT_API_BASE;
use acai_core::config::{get_config_path, load_config, Config};
use acai_core::ConversationStore;
use acai_providers::HttpProvider;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// 🫐 Acai — a small tool-using chat assistant
#[derive(Parser)]
#[command(name = "acai", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant (single-shot or interactive REPL)
    Chat {
        /// Single message (non-interactive). Omit for REPL mode.
        #[arg(short, long)]
        message: Option<String>,

        /// Continue an existing conversation instead of starting a new one
        #[arg(short, long)]
        conversation: Option<String>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Inspect stored conversations
    Conversations {
        #[command(subcommand)]
        action: conversations::ConversationsCommands,
    },

    /// List the tools advertised to the model
    Tools,

    /// Show configuration and tool status
    Status,

    /// Initialize configuration and data directories
    Onboard,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Chat {
            message,
            conversation,
            logs,
        } => {
            init_logging(logs);
            run_chat(message, conversation).await
        }
        Commands::Conversations { action } => {
            init_logging(false);
            conversations::dispatch(action)
        }
        Commands::Tools => {
            init_logging(false);
            tools_cmd::run()
        }
        Commands::Status => status::run(),
        Commands::Onboard => onboard::run(),
    }
}

// ─────────────────────────────────────────────
// Chat command
// ─────────────────────────────────────────────

async fn run_chat(message: Option<String>, conversation: Option<String>) -> Result<()> {
    let config = load_config(None);
    let service = build_service(&config)?;

    match message {
        Some(msg) => {
            let (ctx, listener) = helpers::ctrl_c_context();
            let result = match conversation {
                Some(id) => {
                    info!(conversation_id = %id, "continuing conversation");
                    service
                        .continue_conversation(&ctx, &id, &msg)
                        .await
                        .map(|reply| (None, reply))
                }
                None => service
                    .start_conversation(&ctx, &msg)
                    .await
                    .map(|started| {
                        (
                            Some((started.title, started.conversation_id)),
                            started.reply,
                        )
                    }),
            };
            listener.abort();

            let (started, reply) = result.context("chat request failed")?;
            if let Some((title, id)) = started {
                helpers::print_title(&title, &id);
            }
            helpers::print_response(&reply);
        }
        None => {
            repl::run(service, conversation).await?;
        }
    }

    Ok(())
}

/// Build a `ChatService` from the loaded configuration.
pub fn build_service(config: &Config) -> Result<ChatService> {
    // A custom base may point at a local server that needs no key.
    if !config.provider.is_configured() && config.provider.api_base == DEFAULT_API_BASE {
        bail!(
            "no API key configured: set OPENAI_API_KEY or edit {}",
            get_config_path().display()
        );
    }

    let provider = HttpProvider::new(&config.provider, &config.model.model)
        .context("failed to create model provider")?;
    let tools = Arc::new(build_registry(&config.tools));
    let assistant = LlmAssistant::from_config(Arc::new(provider), tools, config);
    let store = open_store(config)?;

    Ok(ChatService::new(Arc::new(store), Arc::new(assistant)))
}

/// Open the conversation store at the configured directory.
pub fn open_store(config: &Config) -> Result<ConversationStore> {
    let dir = helpers::expand_tilde(&config.storage.conversations_dir);
    ConversationStore::new(Some(dir.clone()))
        .with_context(|| format!("failed to open conversation store at {}", dir.display()))
}

/// Initialize tracing/logging. `RUST_LOG` wins when set.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("acai=debug,info")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_service_requires_key_for_default_base() {
        let config = Config::default();
        let err = build_service(&config).err().map(|e| e.to_string());
        assert!(err.unwrap_or_default().contains("no API key configured"));
    }

    #[test]
    fn build_service_allows_keyless_local_base() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.provider.api_base = "http://localhost:11434/v1".into();
        config.storage.conversations_dir = dir.path().to_string_lossy().into_owned();

        let service = build_service(&config).unwrap();
        assert!(service.list_conversations().is_empty());
    }

    #[test]
    fn cli_parses_chat_flags() {
        let cli = Cli::try_parse_from(["acai", "chat", "-m", "hello", "-c", "abc", "--logs"])
            .unwrap();
        match cli.command {
            Commands::Chat {
                message,
                conversation,
                logs,
            } => {
                assert_eq!(message.as_deref(), Some("hello"));
                assert_eq!(conversation.as_deref(), Some("abc"));
                assert!(logs);
            }
            _ => panic!("expected chat command"),
        }
    }
}
