//! Users command - list registered accounts

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use super::get_context;
use crate::output::create_table;

pub fn run(data_dir: &Path, json: bool) -> Result<()> {
    let ctx = get_context(data_dir)?;
    let users = ctx.account_service.list_users()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&users)?);
        return Ok(());
    }

    if users.is_empty() {
        println!("{}", "No users registered".dimmed());
        return Ok(());
    }

    let mut table = create_table();
    table.set_header(vec!["ID", "Username", "Email", "Joined"]);
    for user in &users {
        table.add_row(vec![
            user.id.to_string(),
            user.username.clone(),
            user.email.clone(),
            user.date_joined.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }
    println!("{}", table);

    Ok(())
}
