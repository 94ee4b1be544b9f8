//! `scholar ask`: one chat exchange from the terminal.

use std::io::Write;

use anyhow::Result;
use console::style;
use futures_util::StreamExt;
use uuid::Uuid;

use scholar_core::service::tutor::{ChatFragment, ReplyStatus};

use crate::state::AppState;

/// Send a message and print the verified, formatted reply's markdown.
pub async fn ask(
    state: &AppState,
    user_id: &Uuid,
    conversation_id: &Uuid,
    message: &str,
    json: bool,
) -> Result<()> {
    let reply = state.tutor.chat(user_id, conversation_id, message).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
        return Ok(());
    }

    println!();
    println!("{}", reply.raw_text);
    println!();

    let status = match reply.status {
        ReplyStatus::Completed => style("completed").green(),
        ReplyStatus::Failed => style("failed").red(),
    };
    let verified = if reply.verified { " · verified" } else { "" };
    println!(
        "  {}",
        style(format!("{} · {status}{verified}", reply.agent)).dim()
    );
    println!();

    Ok(())
}

/// Stream a reply to stdout as fragments arrive.
///
/// With `json`, each fragment is printed as one JSON line.
pub async fn ask_stream(
    state: &AppState,
    user_id: &Uuid,
    conversation_id: &Uuid,
    message: &str,
    json: bool,
) -> Result<()> {
    let mut fragments = state
        .tutor
        .clone()
        .chat_stream(user_id, conversation_id, message)
        .await?;

    let mut stdout = std::io::stdout();
    if !json {
        println!();
    }

    while let Some(fragment) = fragments.next().await {
        if json {
            println!("{}", serde_json::to_string(&fragment)?);
            continue;
        }

        match fragment {
            ChatFragment::Text { text } => {
                print!("{text}");
                stdout.flush()?;
            }
            ChatFragment::Done => {
                println!();
                println!();
            }
            ChatFragment::Error { message } => {
                println!();
                eprintln!("  {} {}", style("✗").red().bold(), message);
            }
        }
    }

    Ok(())
}
