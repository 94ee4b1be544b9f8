//! `scholar agents`: show the agent roster.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
struct AgentRow<'a> {
    name: &'a str,
    model: &'a str,
    role: &'static str,
}

pub fn list_agents(state: &AppState, json: bool) -> Result<()> {
    let registry = state.tutor.registry();
    let rows: Vec<AgentRow<'_>> = registry
        .routable()
        .map(|agent| AgentRow {
            name: &agent.name,
            model: &agent.model,
            role: "tutor",
        })
        .chain(registry.internal().map(|agent| AgentRow {
            name: &agent.name,
            model: &agent.model,
            role: "pipeline",
        }))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Agent").fg(Color::White),
        Cell::new("Model").fg(Color::White),
        Cell::new("Role").fg(Color::White),
    ]);

    for row in &rows {
        let role = match row.role {
            "tutor" => Cell::new(row.role).fg(Color::Green),
            _ => Cell::new(row.role).fg(Color::DarkGrey),
        };
        table.add_row(vec![
            Cell::new(row.name).fg(Color::Cyan),
            Cell::new(row.model),
            role,
        ]);
    }

    println!();
    println!("{table}");
    println!();

    Ok(())
}
