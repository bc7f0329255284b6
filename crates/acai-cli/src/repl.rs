//! Interactive REPL.
//!
//! Uses `rustyline` for readline-style editing with persistent history.
//! The first message of a session starts a conversation; later messages
//! continue it until `/new`.

use anyhow::Result;
use colored::Colorize;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use acai_agent::ChatService;

use crate::helpers;

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// What a line of input asks the REPL to do.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Skip,
    Exit,
    NewConversation,
    ShowTitle,
    Message(&'a str),
}

fn classify(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Input::Skip;
    }
    if is_exit_command(trimmed) {
        return Input::Exit;
    }
    match trimmed.to_lowercase().as_str() {
        "/new" => Input::NewConversation,
        "/title" => Input::ShowTitle,
        _ => Input::Message(trimmed),
    }
}

/// Run the interactive REPL loop.
pub async fn run(service: ChatService, conversation: Option<String>) -> Result<()> {
    helpers::print_banner();

    let mut editor = create_editor()?;
    let mut current = conversation;

    loop {
        let line = match editor.readline("You: ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => break,
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let message = match classify(&line) {
            Input::Skip => continue,
            Input::Exit => {
                println!("\nGoodbye! 👋");
                break;
            }
            Input::NewConversation => {
                current = None;
                println!("{}", "Started a new conversation.".dimmed());
                continue;
            }
            Input::ShowTitle => {
                show_title(&service, current.as_deref());
                continue;
            }
            Input::Message(text) => text,
        };

        let _ = editor.add_history_entry(line.as_str());

        debug!(conversation_id = ?current, "processing input");
        helpers::print_thinking();

        let (ctx, listener) = helpers::ctrl_c_context();
        let result = match current.as_deref() {
            Some(id) => service
                .continue_conversation(&ctx, id, message)
                .await
                .map(|reply| (None, reply)),
            None => service.start_conversation(&ctx, message).await.map(|s| {
                (Some((s.title, s.conversation_id)), s.reply)
            }),
        };
        listener.abort();
        helpers::clear_thinking();

        match result {
            Ok((started, reply)) => {
                if let Some((title, id)) = started {
                    println!();
                    helpers::print_title(&title, &id);
                    current = Some(id);
                }
                helpers::print_response(&reply);
            }
            Err(e) => {
                eprintln!("\n❌ Error ({}): {e}\n", e.code());
            }
        }
    }

    save_history(&mut editor);

    Ok(())
}

fn show_title(service: &ChatService, current: Option<&str>) {
    let Some(id) = current else {
        println!("{}", "No conversation yet.".dimmed());
        return;
    };
    match service.describe_conversation(id) {
        Ok(conv) => helpers::print_title(&conv.title, &conv.id),
        Err(e) => eprintln!("❌ Error ({}): {e}", e.code()),
    }
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

/// Path to the history file.
pub fn history_path() -> std::path::PathBuf {
    acai_core::utils::get_data_path()
        .join("history")
        .join("cli_history")
}

/// Check if input is an exit command.
fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
