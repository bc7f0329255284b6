//! Shared CLI helpers — path expansion, response printing, Ctrl-C wiring.

use std::path::PathBuf;

use colored::Colorize;
use tokio::task::JoinHandle;

use acai_agent::CallContext;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Print an assistant reply to stdout.
pub fn print_response(response: &str) {
    println!();
    println!("{}", "🫐 Acai".magenta().bold());
    if response.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{response}");
    }
    println!();
}

/// Print the title line of a freshly started conversation.
pub fn print_title(title: &str, conversation_id: &str) {
    println!("{} {}", "▸".magenta(), title.bold());
    println!("  {}", format!("conversation {conversation_id}").dimmed());
}

/// Print the banner shown at REPL start.
pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "🫐 Acai".magenta().bold(), version.dimmed());
    println!(
        "{}",
        "Type a message, /new for a fresh conversation, /title to show the current one, or \"exit\" to quit."
            .dimmed()
    );
    println!();
}

/// Print a "thinking" placeholder (for non-log mode).
pub fn print_thinking() {
    eprint!("{}", "⠿ thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

/// A call context that is cancelled when the user presses Ctrl-C.
///
/// Abort the returned handle once the call is done so the signal
/// listener does not outlive it.
pub fn ctrl_c_context() -> (CallContext, JoinHandle<()>) {
    let ctx = CallContext::new();
    let token = ctx.token().clone();
    let listener = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });
    (ctx, listener)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
