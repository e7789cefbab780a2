//! Flaws command - show or toggle the vulnerability switches in settings.json

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Subcommand, ValueEnum};
use colored::Colorize;

use cyberblog_core::config::Config;
use cyberblog_core::FlawSwitches;

use crate::output;

#[derive(Subcommand)]
pub enum FlawCommands {
    /// Show which flaws are active
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Turn a flaw back on
    Enable { flaw: FlawName },
    /// Switch a flaw to its corrected code path
    Patch { flaw: FlawName },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FlawName {
    BrokenAccessControl,
    SqlInjection,
    All,
}

pub fn run(data_dir: &Path, command: Option<FlawCommands>) -> Result<()> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;
    let mut config = Config::load_file(data_dir)?;

    match command.unwrap_or(FlawCommands::Show { json: false }) {
        FlawCommands::Show { json } => show(&config.flaws, json),
        FlawCommands::Enable { flaw } => {
            set(&mut config.flaws, flaw, true);
            config.save()?;
            output::success("Saved. Restart the server to apply.");
            show(&config.flaws, false)
        }
        FlawCommands::Patch { flaw } => {
            set(&mut config.flaws, flaw, false);
            config.save()?;
            output::success("Saved. Restart the server to apply.");
            show(&config.flaws, false)
        }
    }
}

fn set(flaws: &mut FlawSwitches, flaw: FlawName, enabled: bool) {
    match flaw {
        FlawName::BrokenAccessControl => flaws.broken_access_control = enabled,
        FlawName::SqlInjection => flaws.sql_injection = enabled,
        FlawName::All => {
            flaws.broken_access_control = enabled;
            flaws.sql_injection = enabled;
        }
    }
}

fn show(flaws: &FlawSwitches, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(flaws)?);
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Flaw", "State", "Where"]);
    table.add_row(vec![
        "broken-access-control".to_string(),
        output::flaw_state(flaws.broken_access_control),
        "/user_page/?user_id=".to_string(),
    ]);
    table.add_row(vec![
        "sql-injection".to_string(),
        output::flaw_state(flaws.sql_injection),
        "/flaw_sql_injection/?id=".to_string(),
    ]);
    println!("{}", table);
    println!("{}", "Environment variables override these values at startup.".dimmed());

    Ok(())
}
