//! Conversation management CLI commands.

use anyhow::Result;
use chrono::{DateTime, Utc};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use uuid::Uuid;

use scholar_types::llm::MessageRole;

use crate::state::AppState;

pub async fn create_conversation(
    state: &AppState,
    user_id: Uuid,
    mode: &str,
    sub_mode: Option<&str>,
    json: bool,
) -> Result<()> {
    let conversation = state
        .tutor
        .create_conversation(user_id, mode, sub_mode)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&conversation)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Started {}",
        style("✓").green().bold(),
        style(&conversation.title).cyan().bold()
    );
    println!(
        "  {}  {}",
        style("ID:").bold(),
        style(conversation.id.to_string()).dim()
    );
    println!();
    println!(
        "  Ask a question: {}",
        style(format!("scholar ask {} \"...\"", conversation.id)).yellow()
    );
    println!();

    Ok(())
}

/// List the user's conversations, most recently active first.
pub async fn list_conversations(state: &AppState, user_id: &Uuid, json: bool) -> Result<()> {
    let summaries = state.tutor.list_conversations(user_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if summaries.is_empty() {
        println!();
        println!(
            "  {} No conversations yet. Start one with: {}",
            style("i").blue().bold(),
            style("scholar conversation create --mode tutor --sub-mode math").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Title").fg(Color::White),
        Cell::new("Mode").fg(Color::White),
        Cell::new("Subject").fg(Color::White),
        Cell::new("Messages").fg(Color::White),
        Cell::new("Last Active").fg(Color::White),
        Cell::new("ID").fg(Color::White),
    ]);

    for summary in &summaries {
        let conversation = &summary.conversation;
        let subject = conversation
            .sub_mode
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "-".to_string());

        table.add_row(vec![
            Cell::new(&conversation.title).fg(Color::Cyan),
            Cell::new(conversation.mode.to_string()),
            Cell::new(subject),
            Cell::new(summary.message_count),
            Cell::new(format_relative_time(&summary.last_activity)).fg(Color::DarkGrey),
            Cell::new(conversation.id.to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} conversation{}",
        style(summaries.len()).bold(),
        if summaries.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

/// Print a conversation transcript.
pub async fn show_conversation(
    state: &AppState,
    user_id: &Uuid,
    id: &Uuid,
    json: bool,
) -> Result<()> {
    let detail = state.tutor.get_conversation(user_id, id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    let conversation = &detail.conversation;
    println!();
    println!("  {}", style(&conversation.title).cyan().bold());
    println!(
        "  {}",
        style(format!(
            "{} · started {} · {} turns",
            conversation.mode,
            format_relative_time(&conversation.created_at),
            detail.turns.len()
        ))
        .dim()
    );
    println!();

    for turn in &detail.turns {
        let speaker = match turn.role {
            MessageRole::User => style("you").yellow().bold(),
            MessageRole::Assistant => style("tutor").green().bold(),
            MessageRole::System => style("system").dim(),
        };
        println!("  {speaker}");
        for line in turn.content.lines() {
            println!("    {line}");
        }
        println!();
    }

    Ok(())
}

pub async fn delete_conversation(
    state: &AppState,
    user_id: &Uuid,
    id: &Uuid,
    json: bool,
) -> Result<()> {
    state.tutor.delete_conversation(user_id, id).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({"deleted": true, "id": id}))?
        );
    } else {
        println!();
        println!(
            "  {} Deleted conversation {}",
            style("✓").green().bold(),
            style(id.to_string()).dim()
        );
        println!();
    }

    Ok(())
}

fn format_relative_time(dt: &DateTime<Utc>) -> String {
    let diff = Utc::now() - *dt;

    if diff.num_minutes() < 1 {
        "just now".to_string()
    } else if diff.num_hours() < 1 {
        format!("{}m ago", diff.num_minutes())
    } else if diff.num_days() < 1 {
        format!("{}h ago", diff.num_hours())
    } else if diff.num_days() < 30 {
        format!("{}d ago", diff.num_days())
    } else {
        dt.format("%Y-%m-%d").to_string()
    }
}
