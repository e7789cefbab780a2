//! Status command - row counts and active flaws

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use super::get_context;
use crate::output;

pub fn run(data_dir: &Path, json: bool) -> Result<()> {
    let ctx = get_context(data_dir)?;
    let status = ctx.status_service.get_status()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "Cyberblog Status".bold());
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec!["Users", &status.total_users.to_string()]);
    table.add_row(vec!["Profiles", &status.total_profiles.to_string()]);
    table.add_row(vec!["Thoughts", &status.total_thoughts.to_string()]);
    table.add_row(vec!["Live sessions", &status.live_sessions.to_string()]);

    println!("{}", table);
    println!();

    println!("{}", "Flaws".bold());
    println!(
        "  broken-access-control  {}",
        output::flaw_state(status.flaws.broken_access_control)
    );
    println!(
        "  sql-injection          {}",
        output::flaw_state(status.flaws.sql_injection)
    );

    Ok(())
}
