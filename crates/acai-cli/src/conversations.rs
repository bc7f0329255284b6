//! `acai conversations` — list and inspect stored conversations.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use acai_core::config::load_config;
use acai_core::conversation::{Conversation, ConversationStore, ConversationSummary, Role};
use acai_core::utils::truncate_string;

/// Longest title shown in the listing.
const LIST_TITLE_CHARS: usize = 50;

#[derive(Subcommand)]
pub enum ConversationsCommands {
    /// List conversations, newest first
    List,
    /// Show every message of one conversation
    Show {
        /// Conversation id
        id: String,
    },
}

pub fn dispatch(action: ConversationsCommands) -> Result<()> {
    let config = load_config(None);
    let store = crate::open_store(&config)?;

    match action {
        ConversationsCommands::List => list(&store),
        ConversationsCommands::Show { id } => show(&store, &id),
    }
}

fn list(store: &ConversationStore) -> Result<()> {
    let conversations = store.list();
    if conversations.is_empty() {
        println!("{}", "No conversations yet.".dimmed());
        return Ok(());
    }

    println!();
    for summary in &conversations {
        println!("{}", list_line(summary));
    }
    println!();
    Ok(())
}

fn list_line(summary: &ConversationSummary) -> String {
    let updated = summary
        .updated_at
        .with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M");
    let title = if summary.title.is_empty() {
        "(untitled)".to_string()
    } else {
        truncate_string(&summary.title, LIST_TITLE_CHARS)
    };
    format!(
        "  {}  {}  {}",
        summary.id.dimmed(),
        updated.to_string().dimmed(),
        title
    )
}

fn show(store: &ConversationStore, id: &str) -> Result<()> {
    let conversation = store
        .load(id.trim())
        .with_context(|| format!("cannot show conversation {id}"))?;
    print_conversation(&conversation);
    Ok(())
}

fn print_conversation(conversation: &Conversation) {
    println!();
    println!("{}", conversation.title.bold());
    println!(
        "  {}",
        format!(
            "{} · created {}",
            conversation.id,
            conversation
                .created_at
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
        )
        .dimmed()
    );
    println!();

    for message in &conversation.messages {
        let label = match message.role {
            Role::User => "You".cyan().bold(),
            Role::Assistant => "Acai".magenta().bold(),
            Role::Unknown => "?".dimmed(),
        };
        println!("{label}: {}", message.content);
        println!();
    }
}
