//! Conversation store inspection commands: history and sessions.
//!
//! Both read the store directly and never touch the model provider, so they
//! work without an API key.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use simplechat_core::history::store::HistoryStore;
use simplechat_types::chat::{MessageRole, SessionId, SessionSummary, Turn};
use simplechat_types::config::AppConfig;

use crate::state::open_history_store;

/// Print every stored turn of `session_id` in insertion order.
///
/// # Examples
///
/// ```bash
/// simplechat history 6f1c2a8e-0d7b-4f4e-9a53-2f1d8f7d3c11
/// simplechat history 6f1c2a8e-0d7b-4f4e-9a53-2f1d8f7d3c11 --json
/// ```
pub async fn show_history(config: &AppConfig, session_id: &SessionId, json: bool) -> Result<()> {
    let store = open_history_store(config).await?;
    let turns = store.load(session_id).await?;
    store.pool().close().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&turns)?);
        return Ok(());
    }

    if turns.is_empty() {
        println!();
        println!(
            "  {} No turns recorded for session {}",
            style("i").blue().bold(),
            style(session_id).cyan()
        );
        println!();
        return Ok(());
    }

    println!();
    println!("  Session {}", style(session_id).cyan().bold());
    println!();
    println!("{}", history_table(&turns));
    println!();

    Ok(())
}

/// List every session in the store, most recently active first.
pub async fn list_sessions(config: &AppConfig, json: bool) -> Result<()> {
    let store = open_history_store(config).await?;
    let sessions = store.list_sessions().await?;
    store.pool().close().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!();
        println!(
            "  {} No sessions in {}. Open the chat page to start one.",
            style("i").blue().bold(),
            style(&config.store_location).yellow()
        );
        println!();
        return Ok(());
    }

    println!();
    println!("{}", sessions_table(&sessions));
    println!();
    println!(
        "  {} session{}",
        style(sessions.len()).bold(),
        if sessions.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

fn history_table(turns: &[Turn]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("#").fg(Color::White),
        Cell::new("Time").fg(Color::White),
        Cell::new("Role").fg(Color::White),
        Cell::new("Content").fg(Color::White),
    ]);

    for turn in turns {
        let role_cell = match turn.role {
            MessageRole::User => Cell::new("user").fg(Color::Cyan),
            MessageRole::Assistant => Cell::new("assistant").fg(Color::Green),
            MessageRole::System => Cell::new("system").fg(Color::DarkGrey),
        };
        table.add_row(vec![
            Cell::new(turn.sequence.to_string()).fg(Color::DarkGrey),
            Cell::new(turn.created_at.format("%Y-%m-%d %H:%M:%S").to_string()),
            role_cell,
            Cell::new(&turn.content),
        ]);
    }

    table
}

fn sessions_table(sessions: &[SessionSummary]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Session").fg(Color::White),
        Cell::new("Started").fg(Color::White),
        Cell::new("Last active").fg(Color::White),
        Cell::new("Turns").fg(Color::White),
    ]);

    for session in sessions {
        table.add_row(vec![
            Cell::new(session.session_id.to_string()).fg(Color::Cyan),
            Cell::new(session.first_turn_at.format("%Y-%m-%d %H:%M").to_string()),
            Cell::new(session.last_turn_at.format("%Y-%m-%d %H:%M").to_string())
                .fg(Color::DarkGrey),
            Cell::new(session.turn_count.to_string()),
        ]);
    }

    table
}
